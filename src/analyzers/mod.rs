// Analyzer set — independent detectors over submitted text.
//
// Each analyzer is a pure function from (text, context) to flags plus a
// partial risk contribution. Analyzers never error and have no ordering
// dependency among themselves; the engine runs them concurrently and
// panic-isolates each one, so a misbehaving analyzer degrades to an
// empty contribution instead of failing the call.

pub mod phishing;
pub mod pii;
pub mod profanity;
pub mod spam;
pub mod toxicity;

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex_lite::Regex;

use crate::config::ModerationConfig;
use crate::models::{ModerationFlag, Span, SubmissionContext};
use crate::scorer::ToxicityScorer;

/// One analyzer's contribution to an evaluation.
#[derive(Debug, Default)]
pub struct AnalyzerOutput {
    pub flags: Vec<ModerationFlag>,
    pub risk_score: f64,
}

impl AnalyzerOutput {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The analyzer contract. Implementations must be side-effect-free with
/// respect to shared state (read-only access to their own dictionaries)
/// and must return an empty output rather than erroring.
#[async_trait]
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn analyze(
        &self,
        text: &str,
        context: &SubmissionContext,
        config: &ModerationConfig,
    ) -> AnalyzerOutput;
}

/// Build the analyzer list for a config snapshot, in the fixed execution
/// order that flag ordering is defined by: profanity, toxicity, spam,
/// pii, phishing.
pub fn build(
    config: &ModerationConfig,
    scorer: Arc<dyn ToxicityScorer>,
) -> Vec<Arc<dyn Analyzer>> {
    let mut analyzers: Vec<Arc<dyn Analyzer>> = Vec::new();
    if config.enable_profanity {
        analyzers.push(Arc::new(profanity::ProfanityAnalyzer::new()));
    }
    if config.enable_toxicity {
        analyzers.push(Arc::new(toxicity::ToxicityAnalyzer::new(scorer)));
    }
    if config.enable_spam {
        analyzers.push(Arc::new(spam::SpamAnalyzer));
    }
    if config.enable_pii {
        analyzers.push(Arc::new(pii::PiiAnalyzer));
    }
    if config.enable_phishing {
        analyzers.push(Arc::new(phishing::PhishingAnalyzer::new()));
    }
    analyzers
}

/// Whitespace tokens of `text` with their half-open char spans.
///
/// Spans index characters, not bytes, and cover the token exactly as it
/// appears in the original text (punctuation included) so replacements
/// mask the verbatim span.
pub(crate) fn tokens_with_spans(text: &str) -> Vec<(&str, Span)> {
    let mut tokens = Vec::new();
    let mut start_byte = 0usize;
    let mut start_char = 0usize;
    let mut in_token = false;
    let mut char_idx = 0usize;

    for (byte_idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if in_token {
                tokens.push((&text[start_byte..byte_idx], Span::new(start_char, char_idx)));
                in_token = false;
            }
        } else if !in_token {
            in_token = true;
            start_byte = byte_idx;
            start_char = char_idx;
        }
        char_idx += 1;
    }
    if in_token {
        tokens.push((&text[start_byte..], Span::new(start_char, char_idx)));
    }

    tokens
}

static URL_RE: OnceLock<Regex> = OnceLock::new();

/// All http(s) URLs in the text with their byte offsets, in order of
/// appearance.
pub(crate) fn extract_urls(text: &str) -> Vec<(usize, &str)> {
    let re = URL_RE.get_or_init(|| Regex::new(r"https?://[^\s]+").expect("static regex"));
    re.find_iter(text).map(|m| (m.start(), m.as_str())).collect()
}
