// PII analyzer — pattern scans for identifiers that should never sit in
// user-visible content.
//
// Four categories: SSN, credit card, email, phone. Every match is
// enumerated (not just the first per category) and each carries a
// placeholder replacement so the sanitizer can redact it in place.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex_lite::Regex;

use super::{Analyzer, AnalyzerOutput};
use crate::config::ModerationConfig;
use crate::models::{ModerationFlag, Severity, SubmissionContext};

struct PiiPattern {
    name: &'static str,
    regex: Regex,
    severity: Severity,
    message: &'static str,
    replacement: &'static str,
}

fn patterns() -> &'static [PiiPattern] {
    static PATTERNS: OnceLock<Vec<PiiPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            PiiPattern {
                name: "pii:ssn",
                regex: Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("static regex"),
                severity: Severity::High,
                message: "social security number detected",
                replacement: "[REDACTED:SSN]",
            },
            PiiPattern {
                name: "pii:credit_card",
                regex: Regex::new(r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b")
                    .expect("static regex"),
                severity: Severity::High,
                message: "credit card number detected",
                replacement: "[REDACTED:CARD]",
            },
            PiiPattern {
                name: "pii:email",
                regex: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
                    .expect("static regex"),
                severity: Severity::Medium,
                message: "email address detected",
                replacement: "[REDACTED:EMAIL]",
            },
            PiiPattern {
                name: "pii:phone",
                regex: Regex::new(r"\b(?:\+?1[-. ])?(?:\(\d{3}\)|\d{3})[-. ]\d{3}[-. ]\d{4}\b")
                    .expect("static regex"),
                severity: Severity::Medium,
                message: "phone number detected",
                replacement: "[REDACTED:PHONE]",
            },
        ]
    })
}

pub struct PiiAnalyzer;

#[async_trait]
impl Analyzer for PiiAnalyzer {
    fn name(&self) -> &'static str {
        "pii"
    }

    async fn analyze(
        &self,
        text: &str,
        _context: &SubmissionContext,
        config: &ModerationConfig,
    ) -> AnalyzerOutput {
        let mut out = AnalyzerOutput::empty();

        for pattern in patterns() {
            for m in pattern.regex.find_iter(text) {
                let start = text[..m.start()].chars().count();
                let end = start + text[m.start()..m.end()].chars().count();
                out.flags.push(ModerationFlag {
                    rule: pattern.name.to_string(),
                    severity: pattern.severity,
                    category: "pii".to_string(),
                    message: pattern.message.to_string(),
                    confidence: 0.9,
                    position: Some(crate::models::Span::new(start, end)),
                    suggested_replacement: Some(pattern.replacement.to_string()),
                });
                out.risk_score += match pattern.severity {
                    Severity::High => config.weights.pii_high,
                    _ => config.weights.pii_medium,
                };
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(text: &str) -> AnalyzerOutput {
        PiiAnalyzer
            .analyze(text, &Default::default(), &Default::default())
            .await
    }

    #[tokio::test]
    async fn ssn_is_high_severity() {
        let out = run("My SSN is 123-45-6789").await;
        assert_eq!(out.flags.len(), 1);
        assert_eq!(out.flags[0].rule, "pii:ssn");
        assert_eq!(out.flags[0].severity, Severity::High);
        assert_eq!(out.risk_score, 30.0);
    }

    #[tokio::test]
    async fn credit_card_variants_match() {
        for text in [
            "card 4111111111111111",
            "card 4111-1111-1111-1111",
            "card 4111 1111 1111 1111",
        ] {
            let out = run(text).await;
            assert!(
                out.flags.iter().any(|f| f.rule == "pii:credit_card"),
                "no card flag for {text:?}"
            );
        }
    }

    #[tokio::test]
    async fn email_and_phone_are_medium() {
        let out = run("reach me at bob@example.com or 555-123-4567").await;
        let rules: Vec<&str> = out.flags.iter().map(|f| f.rule.as_str()).collect();
        assert!(rules.contains(&"pii:email"));
        assert!(rules.contains(&"pii:phone"));
        assert!(out.flags.iter().all(|f| f.severity == Severity::Medium));
        assert_eq!(out.risk_score, 40.0);
    }

    #[tokio::test]
    async fn every_match_is_enumerated() {
        let out = run("a@example.com b@example.com c@example.com").await;
        assert_eq!(out.flags.len(), 3);
        assert_eq!(out.risk_score, 60.0);
    }

    #[tokio::test]
    async fn replacements_carry_placeholders() {
        let out = run("ssn 123-45-6789").await;
        assert_eq!(
            out.flags[0].suggested_replacement.as_deref(),
            Some("[REDACTED:SSN]")
        );
        let pos = out.flags[0].position.unwrap();
        assert_eq!((pos.start, pos.end), (4, 15));
    }

    #[tokio::test]
    async fn clean_text_is_silent() {
        let out = run("nothing sensitive in here").await;
        assert!(out.flags.is_empty());
        assert_eq!(out.risk_score, 0.0);
    }
}
