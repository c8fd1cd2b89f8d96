// Spam analyzer — composite score over lexical and contextual signals.
//
// Four additive signals, clamped to [0, 1]:
//   - low lexical diversity on longer inputs (+0.3)
//   - URL density beyond a threshold (+0.2 per URL over it)
//   - excessive capitalization (+0.3)
//   - the submission layer's rapid-submission flag (+0.4)

use std::collections::HashSet;

use async_trait::async_trait;

use super::{extract_urls, Analyzer, AnalyzerOutput};
use crate::config::ModerationConfig;
use crate::models::{ModerationFlag, Severity, SubmissionContext};

/// Unique/total token ratio below this counts as repetitive.
const DIVERSITY_RATIO_MIN: f64 = 0.3;
/// Diversity is only meaningful past this many tokens.
const DIVERSITY_MIN_TOKENS: usize = 10;
/// URLs beyond this count each add to the score.
const URL_THRESHOLD: usize = 2;
/// Uppercase/alphabetic ratio above this counts as shouting.
const CAPS_RATIO_MAX: f64 = 0.5;

const DIVERSITY_WEIGHT: f64 = 0.3;
const URL_WEIGHT: f64 = 0.2;
const CAPS_WEIGHT: f64 = 0.3;
const RAPID_WEIGHT: f64 = 0.4;

const HIGH_THRESHOLD: f64 = 0.8;
const MEDIUM_THRESHOLD: f64 = 0.6;

pub struct SpamAnalyzer;

/// Composite spam score in [0, 1] for text plus context.
pub fn spam_score(text: &str, rapid_submission: bool) -> f64 {
    let mut score = 0.0;

    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() > DIVERSITY_MIN_TOKENS {
        let unique: HashSet<&str> = tokens.iter().copied().collect();
        let diversity = unique.len() as f64 / tokens.len() as f64;
        if diversity < DIVERSITY_RATIO_MIN {
            score += DIVERSITY_WEIGHT;
        }
    }

    let url_count = extract_urls(text).len();
    if url_count > URL_THRESHOLD {
        score += URL_WEIGHT * (url_count - URL_THRESHOLD) as f64;
    }

    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if !letters.is_empty() {
        let caps = letters.iter().filter(|c| c.is_uppercase()).count();
        if caps as f64 / letters.len() as f64 > CAPS_RATIO_MAX {
            score += CAPS_WEIGHT;
        }
    }

    if rapid_submission {
        score += RAPID_WEIGHT;
    }

    score.clamp(0.0, 1.0)
}

#[async_trait]
impl Analyzer for SpamAnalyzer {
    fn name(&self) -> &'static str {
        "spam"
    }

    async fn analyze(
        &self,
        text: &str,
        context: &SubmissionContext,
        config: &ModerationConfig,
    ) -> AnalyzerOutput {
        let score = spam_score(text, context.rapid_submission);

        let mut out = AnalyzerOutput::empty();
        let (severity, risk) = if score > HIGH_THRESHOLD {
            (Severity::High, config.weights.spam_high)
        } else if score > MEDIUM_THRESHOLD {
            (Severity::Medium, config.weights.spam_medium)
        } else {
            return out;
        };

        out.flags.push(ModerationFlag {
            rule: "spam".to_string(),
            severity,
            category: "spam".to_string(),
            message: format!("spam indicators detected (score {score:.2})"),
            confidence: score,
            position: None,
            suggested_replacement: None,
        });
        out.risk_score = risk;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_scores_zero() {
        assert_eq!(spam_score("a perfectly ordinary sentence", false), 0.0);
    }

    #[test]
    fn repetition_on_long_input_scores() {
        let repetitive = "buy buy buy buy buy buy buy buy buy buy buy buy";
        assert!((spam_score(repetitive, false) - 0.3).abs() < 1e-9);
        // same repetition under the token minimum is ignored
        assert_eq!(spam_score("buy buy buy", false), 0.0);
    }

    #[test]
    fn url_density_scores_per_url_over_threshold() {
        let two = "see https://a.test https://b.test";
        assert_eq!(spam_score(two, false), 0.0);
        let four = "https://a.test https://b.test https://c.test https://d.test";
        assert!((spam_score(four, false) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn shouting_scores() {
        assert!((spam_score("BUY GOLD RIGHT NOW", false) - 0.3).abs() < 1e-9);
        assert_eq!(spam_score("Buy gold right now", false), 0.0);
    }

    #[test]
    fn rapid_submission_scores() {
        assert!((spam_score("hello there friend", true) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn signals_accumulate_and_clamp() {
        // rapid (0.4) + 3 URLs over threshold (0.6) reaches the cap
        let text = "BUY BUY BUY BUY BUY BUY BUY BUY BUY BUY BUY \
                    https://a.test https://b.test https://c.test https://d.test https://e.test";
        assert_eq!(spam_score(text, true), 1.0);
    }

    #[tokio::test]
    async fn analyzer_thresholds() {
        let config = ModerationConfig::default();
        let ctx_rapid = SubmissionContext {
            rapid_submission: true,
            ..Default::default()
        };

        // caps (0.3) + rapid (0.4) = 0.7 -> medium
        let out = SpamAnalyzer
            .analyze("HELLO EVERYONE OUT THERE", &ctx_rapid, &config)
            .await;
        assert_eq!(out.flags.len(), 1);
        assert_eq!(out.flags[0].severity, Severity::Medium);
        assert_eq!(out.risk_score, 20.0);

        // repetition (0.3) + caps (0.3) + rapid (0.4) = 1.0 -> high
        let out = SpamAnalyzer
            .analyze(
                "WIN WIN WIN WIN WIN WIN WIN WIN WIN WIN WIN WIN",
                &ctx_rapid,
                &config,
            )
            .await;
        assert_eq!(out.flags[0].severity, Severity::High);
        assert_eq!(out.risk_score, 35.0);

        // nothing spammy -> no flag
        let out = SpamAnalyzer
            .analyze("just a normal message", &Default::default(), &config)
            .await;
        assert!(out.flags.is_empty());
    }
}
