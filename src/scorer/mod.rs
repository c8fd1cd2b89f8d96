// Toxicity scoring — trait-based abstraction for swappable providers.
//
// The ToxicityScorer trait defines the contract a real classifier would
// fulfill. KeywordScorer is the deterministic built-in: the toxicity
// analyzer falls back to it whenever the configured provider errors or
// runs past its timeout, so an unhealthy provider can never fail an
// evaluation.

pub mod remote;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

/// Trait for scoring text toxicity. Async because real providers are
/// HTTP calls; the engine bounds every call with a timeout.
#[async_trait]
pub trait ToxicityScorer: Send + Sync {
    /// Score a single text, returning a toxicity probability in [0, 1].
    async fn score(&self, text: &str) -> Result<f64>;

    /// Score multiple texts, returning results in the same order.
    /// Default implementation calls score sequentially — providers can
    /// override for batching if they support it.
    async fn score_batch(&self, texts: &[String]) -> Result<Vec<f64>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.score(text).await?);
        }
        Ok(results)
    }
}

/// Deterministic fallback scorer: the ratio of toxic-keyword hits to
/// total tokens, scaled by 10 and clamped to [0, 1].
///
/// Crude by design. Its job is to keep the toxicity analyzer producing
/// a sane signal when the real provider is unreachable, not to compete
/// with one.
pub struct KeywordScorer {
    keywords: HashSet<String>,
}

/// Default toxic keyword list. Deployments with a real provider only see
/// these during provider outages.
const DEFAULT_KEYWORDS: &[&str] = &[
    "hate", "kill", "die", "stupid", "idiot", "loser", "moron", "dumb", "trash", "garbage",
    "worthless", "pathetic", "disgusting", "ugly",
];

impl KeywordScorer {
    pub fn new() -> Self {
        Self::with_keywords(DEFAULT_KEYWORDS.iter().map(|s| s.to_string()))
    }

    pub fn with_keywords(keywords: impl IntoIterator<Item = String>) -> Self {
        Self {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Synchronous scoring core, also used directly by the toxicity
    /// analyzer's fallback path.
    pub fn score_sync(&self, text: &str) -> f64 {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|t| {
                t.chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<String>()
                    .to_lowercase()
            })
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.is_empty() {
            return 0.0;
        }

        let hits = tokens.iter().filter(|t| self.keywords.contains(*t)).count();
        (hits as f64 / tokens.len() as f64 * 10.0).clamp(0.0, 1.0)
    }
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToxicityScorer for KeywordScorer {
    async fn score(&self, text: &str) -> Result<f64> {
        Ok(self.score_sync(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_scores_zero() {
        let scorer = KeywordScorer::new();
        assert_eq!(scorer.score_sync("what a lovely afternoon"), 0.0);
    }

    #[test]
    fn keyword_density_drives_score() {
        let scorer = KeywordScorer::new();
        // 1 hit in 10 tokens: 0.1 * 10 = 1.0 (clamped ceiling)
        let one_in_ten = "hate a b c d e f g h i";
        assert_eq!(scorer.score_sync(one_in_ten), 1.0);
        // 1 hit in 20 tokens: 0.05 * 10 = 0.5
        let one_in_twenty = "hate a b c d e f g h i j k l m n o p q r s";
        assert!((scorer.score_sync(one_in_twenty) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn punctuation_and_case_are_normalized() {
        let scorer = KeywordScorer::new();
        assert!(scorer.score_sync("HATE! hate. Hate?") > 0.9);
    }

    #[test]
    fn empty_input_scores_zero() {
        let scorer = KeywordScorer::new();
        assert_eq!(scorer.score_sync(""), 0.0);
        assert_eq!(scorer.score_sync("   \t  "), 0.0);
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let scorer = KeywordScorer::new();
        let texts = vec!["nice day".to_string(), "hate hate hate".to_string()];
        let scores = scorer.score_batch(&texts).await.unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores[0] < scores[1]);
    }
}
