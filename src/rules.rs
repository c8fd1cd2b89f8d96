// Custom rule engine — operator-supplied pattern rules, evaluated the
// same way as the built-in analyzers.
//
// Rules are immutable once registered. The engine mutates the *set* by
// swapping whole config snapshots, so an evaluation always sees either
// the old set or the new one, never a half-added rule.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ScoreWeights;
use crate::models::{ModerationFlag, RuleAction, Severity, Span};

/// A named pattern-based policy unit.
///
/// `pattern` is a regular expression; a plain literal is a valid pattern.
/// An invalid pattern never aborts an evaluation — the rule is skipped
/// with a warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationRule {
    pub id: String,
    pub pattern: String,
    pub severity: Severity,
    pub action: RuleAction,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

/// Confidence assigned to custom-rule findings. Pattern rules are written
/// by operators, not tuned models, so they sit below a direct blocklist hit.
const RULE_CONFIDENCE: f64 = 0.8;

/// Evaluate every rule in the snapshot against the raw text.
///
/// Each matching rule emits exactly one flag carrying the rule's severity
/// and category, positioned at the first match. Returns the flags plus
/// the severity-weighted risk contribution.
pub fn evaluate(
    rules: &[ModerationRule],
    text: &str,
    weights: &ScoreWeights,
) -> (Vec<ModerationFlag>, f64) {
    let mut flags = Vec::new();
    let mut risk = 0.0;

    for rule in rules {
        let re = match Regex::new(&rule.pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!(rule = %rule.id, error = %e, "Skipping custom rule with invalid pattern");
                continue;
            }
        };

        if let Some(m) = re.find(text) {
            let start = text[..m.start()].chars().count();
            let end = start + text[m.start()..m.end()].chars().count();
            let message = if rule.description.is_empty() {
                format!("content matched rule '{}'", rule.id)
            } else {
                rule.description.clone()
            };
            flags.push(ModerationFlag {
                rule: rule.id.clone(),
                severity: rule.severity,
                category: rule.category.clone(),
                message,
                confidence: RULE_CONFIDENCE,
                position: Some(Span::new(start, end)),
                suggested_replacement: None,
            });
            risk += weights.severity_score(rule.severity);
        }
    }

    (flags, risk)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, pattern: &str, severity: Severity) -> ModerationRule {
        ModerationRule {
            id: id.to_string(),
            pattern: pattern.to_string(),
            severity,
            action: RuleAction::Flag,
            category: "custom".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn matching_rule_emits_one_flag() {
        let rules = vec![rule("no-promo", r"(?i)buy now", Severity::Medium)];
        let (flags, risk) = evaluate(&rules, "BUY NOW and save", &ScoreWeights::default());
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].rule, "no-promo");
        assert_eq!(flags[0].confidence, 0.8);
        assert_eq!(risk, 20.0);
    }

    #[test]
    fn non_matching_rule_is_silent() {
        let rules = vec![rule("no-promo", "buy now", Severity::Medium)];
        let (flags, risk) = evaluate(&rules, "perfectly fine text", &ScoreWeights::default());
        assert!(flags.is_empty());
        assert_eq!(risk, 0.0);
    }

    #[test]
    fn invalid_pattern_is_skipped_not_fatal() {
        let rules = vec![
            rule("broken", "[unclosed", Severity::Critical),
            rule("works", "spam", Severity::Low),
        ];
        let (flags, risk) = evaluate(&rules, "this is spam", &ScoreWeights::default());
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].rule, "works");
        assert_eq!(risk, 10.0);
    }

    #[test]
    fn severity_weighted_scores() {
        let w = ScoreWeights::default();
        for (sev, expected) in [
            (Severity::Low, 10.0),
            (Severity::Medium, 20.0),
            (Severity::High, 30.0),
            (Severity::Critical, 50.0),
        ] {
            let (_, risk) = evaluate(&[rule("r", "x", sev)], "x marks the spot", &w);
            assert_eq!(risk, expected, "severity {sev}");
        }
    }

    #[test]
    fn match_position_is_char_indexed() {
        let rules = vec![rule("r", "spam", Severity::Low)];
        // Multi-byte char before the match shifts bytes, not chars
        let (flags, _) = evaluate(&rules, "café spam", &ScoreWeights::default());
        let pos = flags[0].position.unwrap();
        assert_eq!((pos.start, pos.end), (5, 9));
    }
}
