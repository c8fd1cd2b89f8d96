// Toxicity analyzer — thresholds over the pluggable scorer.
//
// The provider call is bounded by config.scorer_timeout_ms; on timeout
// or error we fall back to the deterministic keyword scorer instead of
// failing the evaluation. A slow provider costs latency, never a result.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::{Analyzer, AnalyzerOutput};
use crate::config::ModerationConfig;
use crate::models::{ModerationFlag, Severity, SubmissionContext};
use crate::scorer::{KeywordScorer, ToxicityScorer};

/// Score above which the finding is high severity.
const HIGH_THRESHOLD: f64 = 0.7;
/// Score above which the finding is medium severity.
const MEDIUM_THRESHOLD: f64 = 0.5;

pub struct ToxicityAnalyzer {
    scorer: Arc<dyn ToxicityScorer>,
    fallback: KeywordScorer,
}

impl ToxicityAnalyzer {
    pub fn new(scorer: Arc<dyn ToxicityScorer>) -> Self {
        Self {
            scorer,
            fallback: KeywordScorer::new(),
        }
    }
}

#[async_trait]
impl Analyzer for ToxicityAnalyzer {
    fn name(&self) -> &'static str {
        "toxicity"
    }

    async fn analyze(
        &self,
        text: &str,
        _context: &SubmissionContext,
        config: &ModerationConfig,
    ) -> AnalyzerOutput {
        let budget = Duration::from_millis(config.scorer_timeout_ms);
        let score = match tokio::time::timeout(budget, self.scorer.score(text)).await {
            Ok(Ok(score)) => score.clamp(0.0, 1.0),
            Ok(Err(e)) => {
                warn!(error = %e, "Toxicity provider failed, using keyword fallback");
                self.fallback.score_sync(text)
            }
            Err(_) => {
                warn!(
                    timeout_ms = config.scorer_timeout_ms,
                    "Toxicity provider timed out, using keyword fallback"
                );
                self.fallback.score_sync(text)
            }
        };

        let mut out = AnalyzerOutput::empty();
        let (severity, risk) = if score > HIGH_THRESHOLD {
            (Severity::High, config.weights.toxicity_high)
        } else if score > MEDIUM_THRESHOLD {
            (Severity::Medium, config.weights.toxicity_medium)
        } else {
            return out;
        };

        out.flags.push(ModerationFlag {
            rule: "toxicity".to_string(),
            severity,
            category: "toxicity".to_string(),
            message: format!("toxic content detected (score {score:.2})"),
            confidence: score,
            position: None,
            suggested_replacement: None,
        });
        out.risk_score = risk;
        out
    }
}
