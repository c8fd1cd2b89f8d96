// Profanity analyzer — blocklist membership with leetspeak de-obfuscation.
//
// Tokenizes on whitespace, strips non-alphanumerics per token, and checks
// exact blocklist membership. Each token is additionally expanded into
// the words it could be obfuscating (4→a, 3→e, 0→o, ...) and every
// variant is checked too, so "b4dw0rd" hits a blocklist entry "badword".
//
// Expansion is combinatorial per leet character, which blows up on long
// tokens; tokens over `config.max_leet_token_chars` skip expansion (the
// plain stripped form is still checked) and expansion is capped at a
// fixed variant budget.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use super::{tokens_with_spans, Analyzer, AnalyzerOutput};
use crate::config::ModerationConfig;
use crate::models::{ModerationFlag, Severity, SubmissionContext};

/// Hard cap on generated variants per token, regardless of token length.
const MAX_VARIANTS: usize = 512;

/// Confidence for a plain blocklist hit vs. one found through expansion.
const EXACT_CONFIDENCE: f64 = 0.9;
const LEET_CONFIDENCE: f64 = 0.75;

/// Default blocklist with per-word severities. Words absent from the
/// severity table default to low; this table carries both.
const DEFAULT_BLOCKLIST: &[(&str, Severity)] = &[
    ("damn", Severity::Low),
    ("hell", Severity::Low),
    ("crap", Severity::Low),
    ("piss", Severity::Low),
    ("ass", Severity::Medium),
    ("bastard", Severity::Medium),
    ("shit", Severity::Medium),
    ("bitch", Severity::High),
    ("fuck", Severity::High),
];

pub struct ProfanityAnalyzer {
    blocklist: HashMap<String, Severity>,
}

impl ProfanityAnalyzer {
    pub fn new() -> Self {
        Self::with_blocklist(
            DEFAULT_BLOCKLIST
                .iter()
                .map(|(w, s)| (w.to_string(), *s)),
        )
    }

    /// Build with a caller-supplied blocklist (word → severity).
    pub fn with_blocklist(entries: impl IntoIterator<Item = (String, Severity)>) -> Self {
        Self {
            blocklist: entries
                .into_iter()
                .map(|(w, s)| (w.to_lowercase(), s))
                .collect(),
        }
    }

    /// Check one token, trying the stripped form first and leet variants
    /// second. Returns the matched severity and whether expansion was
    /// needed to find it.
    fn check_token(&self, token: &str, max_expand_chars: usize) -> Option<(Severity, bool)> {
        let stripped: String = token
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if stripped.is_empty() {
            return None;
        }
        if let Some(sev) = self.blocklist.get(&stripped) {
            return Some((*sev, false));
        }

        if token.chars().count() > max_expand_chars {
            return None;
        }
        for variant in leet_variants(token) {
            if let Some(sev) = self.blocklist.get(&variant) {
                return Some((*sev, true));
            }
        }
        None
    }
}

impl Default for ProfanityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyzer for ProfanityAnalyzer {
    fn name(&self) -> &'static str {
        "profanity"
    }

    async fn analyze(
        &self,
        text: &str,
        _context: &SubmissionContext,
        config: &ModerationConfig,
    ) -> AnalyzerOutput {
        let mut out = AnalyzerOutput::empty();

        for (token, span) in tokens_with_spans(text) {
            let Some((severity, via_leet)) =
                self.check_token(token, config.max_leet_token_chars)
            else {
                continue;
            };

            out.flags.push(ModerationFlag {
                rule: "profanity".to_string(),
                severity,
                category: "profanity".to_string(),
                message: "profane language detected".to_string(),
                confidence: if via_leet { LEET_CONFIDENCE } else { EXACT_CONFIDENCE },
                position: Some(span),
                suggested_replacement: Some("*".repeat(span.len())),
            });
            out.risk_score += config.weights.severity_score(severity);
        }

        out
    }
}

/// The letters a character could be standing in for, identity included.
/// Reverse of the classic substitutions a→{@,4}, e→{3}, i→{1,!}, o→{0},
/// s→{5,$}, t→{7}, l→{1}, g→{9}. `1` fans out to both i and l.
fn leet_candidates(ch: char) -> Vec<char> {
    match ch {
        '@' => vec!['a'],
        '4' => vec!['4', 'a'],
        '3' => vec!['3', 'e'],
        '1' => vec!['1', 'i', 'l'],
        '!' => vec!['i'],
        '0' => vec!['0', 'o'],
        '5' => vec!['5', 's'],
        '$' => vec!['s'],
        '7' => vec!['7', 't'],
        '9' => vec!['9', 'g'],
        c if c.is_alphanumeric() => vec![c.to_ascii_lowercase()],
        // other punctuation is stripped, same as the exact-match path
        _ => Vec::new(),
    }
}

/// All deduplicated de-obfuscations of `token`, bounded by MAX_VARIANTS.
fn leet_variants(token: &str) -> HashSet<String> {
    let mut variants: Vec<String> = vec![String::new()];

    for ch in token.chars() {
        let candidates = leet_candidates(ch);
        if candidates.is_empty() {
            continue;
        }
        let mut next = Vec::with_capacity(variants.len() * candidates.len());
        'expand: for prefix in &variants {
            for c in &candidates {
                if next.len() >= MAX_VARIANTS {
                    break 'expand;
                }
                let mut v = prefix.clone();
                v.push(*c);
                next.push(v);
            }
        }
        variants = next;
    }

    variants.into_iter().collect()
}
