// The moderation engine — orchestrates analyzers, fuser, sanitizer, and
// sinks behind one total entry point.
//
// moderate_content never errors and never panics outward: analyzers are
// spawn-isolated individually, and the whole evaluation runs in its own
// task whose failure converts to a fail-open default. The deployment
// prefers availability over over-blocking when the moderation subsystem
// itself is unhealthy; that trade-off is deliberate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::analyzers;
use crate::config::{ConfigPatch, ModerationConfig};
use crate::decision;
use crate::models::{
    content_hash, Action, ModerationFlag, ModerationResult, ReviewPriority, ReviewQueueItem,
    ReviewStatus, Severity, SubmissionContext,
};
use crate::output::truncate_chars;
use crate::rules::{self, ModerationRule};
use crate::sanitize;
use crate::scorer::{KeywordScorer, ToxicityScorer};
use crate::sink::{
    log::LogAuditSink, memory::MemoryReviewQueue, webhook::WebhookAuditSink, AuditRecord,
    AuditSink, ReviewQueue, AUDIT_SCHEMA_VERSION,
};
use crate::stats::EngineStats;

/// Review queue items carry at most this much content.
const REVIEW_CONTENT_CHARS: usize = 1000;

pub struct ModerationEngine {
    /// Current config snapshot. Mutation swaps the Arc; in-flight
    /// evaluations keep the snapshot they cloned at call start.
    config: RwLock<Arc<ModerationConfig>>,
    scorer: Arc<dyn ToxicityScorer>,
    audit: Arc<dyn AuditSink>,
    review: Arc<dyn ReviewQueue>,
    stats: Arc<EngineStats>,
}

impl ModerationEngine {
    /// Build an engine with default collaborators: the keyword scorer,
    /// a webhook audit sink when the config names one (the log sink
    /// otherwise), and an in-memory review queue.
    pub fn new(config: ModerationConfig) -> Self {
        let audit: Arc<dyn AuditSink> = match &config.webhook_url {
            Some(url) => Arc::new(WebhookAuditSink::new(url.clone())),
            None => Arc::new(LogAuditSink),
        };
        Self {
            config: RwLock::new(Arc::new(config)),
            scorer: Arc::new(KeywordScorer::new()),
            audit,
            review: Arc::new(MemoryReviewQueue::new()),
            stats: Arc::new(EngineStats::new()),
        }
    }

    /// Swap in a real toxicity provider.
    pub fn with_scorer(mut self, scorer: Arc<dyn ToxicityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_review_queue(mut self, review: Arc<dyn ReviewQueue>) -> Self {
        self.review = review;
        self
    }

    /// Current config snapshot.
    pub async fn config(&self) -> Arc<ModerationConfig> {
        self.config.read().await.clone()
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Merge a partial update onto the current config. In-flight
    /// evaluations are unaffected; subsequent calls see the new snapshot.
    pub async fn update_config(&self, patch: ConfigPatch) {
        let mut guard = self.config.write().await;
        let next = patch.apply(&guard);
        *guard = Arc::new(next);
    }

    /// Register a custom rule. Readers observe either the old or the new
    /// rule set atomically.
    pub async fn add_custom_rule(&self, rule: ModerationRule) {
        let mut guard = self.config.write().await;
        let mut next = (**guard).clone();
        next.custom_rules.push(rule);
        *guard = Arc::new(next);
    }

    /// Remove a rule by id. Returns whether anything was removed.
    pub async fn remove_custom_rule(&self, id: &str) -> bool {
        let mut guard = self.config.write().await;
        let mut next = (**guard).clone();
        let before = next.custom_rules.len();
        next.custom_rules.retain(|r| r.id != id);
        let removed = next.custom_rules.len() != before;
        if removed {
            *guard = Arc::new(next);
        }
        removed
    }

    /// Moderate one piece of content. Total: always returns a result,
    /// never an error. Cancellation is the caller's future drop (wrap
    /// the call in tokio::time::timeout to impose a deadline).
    pub async fn moderate_content(
        &self,
        content: &str,
        context: Option<SubmissionContext>,
    ) -> ModerationResult {
        let start = Instant::now();
        let config = self.config.read().await.clone();

        // Bound the text local analyzers will scan. The audit record
        // still describes the original content.
        let analyzed: Arc<String> = Arc::new(bound_chars(content, config.max_content_chars));
        let ctx = Arc::new(context.clone().unwrap_or_default());

        let eval = evaluate(
            config.clone(),
            self.scorer.clone(),
            analyzed,
            ctx,
            start,
        );
        let result = match tokio::spawn(eval).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Moderation evaluation failed, failing open");
                self.stats.record_failure();
                fail_open(start)
            }
        };

        self.stats.record(result.recommended_action);
        self.emit(&config, content, context, &result);

        debug!(
            action = %result.recommended_action,
            risk_score = result.risk_score,
            flag_count = result.flags.len(),
            elapsed_ms = result.processing_time_ms,
            "Moderated content"
        );

        result
    }

    /// Fire-and-forget sink emission. Failures are logged, never
    /// propagated, and cannot alter the already-computed result.
    fn emit(
        &self,
        config: &ModerationConfig,
        content: &str,
        context: Option<SubmissionContext>,
        result: &ModerationResult,
    ) {
        let hash = content_hash(content);
        let timeout = Duration::from_millis(config.sink_timeout_ms);

        let record = AuditRecord {
            timestamp: Utc::now(),
            content_hash: hash.clone(),
            content_length: content.chars().count(),
            result: result.clone(),
            context: context.clone(),
            version: AUDIT_SCHEMA_VERSION,
        };
        let audit = self.audit.clone();
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, audit.record(record)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Audit delivery failed"),
                Err(_) => warn!("Audit delivery timed out"),
            }
        });

        if result.recommended_action == Action::Review && config.review_queue {
            let item = ReviewQueueItem {
                id: format!("rev-{}-{}", hash, Utc::now().timestamp_millis()),
                content: truncate_chars(content, REVIEW_CONTENT_CHARS),
                content_hash: hash,
                result: result.clone(),
                context,
                status: ReviewStatus::Pending,
                priority: review_priority(result, config),
            };
            let review = self.review.clone();
            tokio::spawn(async move {
                match tokio::time::timeout(timeout, review.enqueue(item)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "Review enqueue failed"),
                    Err(_) => warn!("Review enqueue timed out"),
                }
            });
        }
    }
}

/// The evaluation core, run in its own task so an unexpected panic
/// anywhere inside converts to the fail-open default.
async fn evaluate(
    config: Arc<ModerationConfig>,
    scorer: Arc<dyn ToxicityScorer>,
    text: Arc<String>,
    ctx: Arc<SubmissionContext>,
    start: Instant,
) -> ModerationResult {
    // Spawn analyzers concurrently, then join in registration order so
    // flag ordering stays deterministic. A panicking analyzer
    // contributes nothing; the rest proceed.
    let mut handles = Vec::new();
    for analyzer in analyzers::build(&config, scorer) {
        let text = text.clone();
        let ctx = ctx.clone();
        let config = config.clone();
        let name = analyzer.name();
        handles.push((
            name,
            tokio::spawn(async move { analyzer.analyze(&text, &ctx, &config).await }),
        ));
    }

    let mut flags: Vec<ModerationFlag> = Vec::new();
    let mut risk_score = 0.0;
    for (name, handle) in handles {
        match handle.await {
            Ok(out) => {
                flags.extend(out.flags);
                risk_score += out.risk_score;
            }
            Err(e) => {
                // The analyzer contributes no findings and no risk, but
                // the result carries a marker that coverage was partial.
                warn!(analyzer = name, error = %e, "Analyzer failed, contributing nothing");
                flags.push(system_flag(format!(
                    "analyzer '{name}' failed; results may be partial"
                )));
            }
        }
    }

    let (rule_flags, rule_risk) = rules::evaluate(&config.custom_rules, &text, &config.weights);
    flags.extend(rule_flags);
    risk_score += rule_risk;

    let verdict = decision::decide(&flags, risk_score, &config);
    let sanitized_content = sanitize::apply(&text, &flags);

    ModerationResult {
        allowed: verdict.allowed,
        confidence: verdict.confidence,
        flags,
        recommended_action: verdict.action,
        risk_score,
        processing_time_ms: start.elapsed().as_millis() as u64,
        sanitized_content,
    }
}

/// Default result when the evaluation itself is broken: allow, with a
/// single low-confidence system flag so downstream consumers can see
/// the engine was unhealthy.
fn fail_open(start: Instant) -> ModerationResult {
    ModerationResult {
        allowed: true,
        confidence: 0.1,
        flags: vec![system_flag(
            "moderation engine error; failing open".to_string(),
        )],
        recommended_action: Action::Allow,
        risk_score: 0.0,
        processing_time_ms: start.elapsed().as_millis() as u64,
        sanitized_content: None,
    }
}

/// Low-confidence marker flag for engine-side faults. Contributes no
/// risk and cannot change the decision on its own.
fn system_flag(message: String) -> ModerationFlag {
    ModerationFlag {
        rule: "system".to_string(),
        severity: Severity::Low,
        category: "system".to_string(),
        message,
        confidence: 0.1,
        position: None,
        suggested_replacement: None,
    }
}

/// Triage priority for a review-routed result.
fn review_priority(result: &ModerationResult, config: &ModerationConfig) -> ReviewPriority {
    let critical = result
        .flags
        .iter()
        .any(|f| f.severity == Severity::Critical);
    let high_count = result
        .flags
        .iter()
        .filter(|f| f.severity == Severity::High)
        .count();

    if critical {
        ReviewPriority::Urgent
    } else if high_count >= 2 {
        ReviewPriority::High
    } else if high_count >= 1
        || result.risk_score > config.weights.review_priority_risk_threshold
    {
        ReviewPriority::Medium
    } else {
        ReviewPriority::Low
    }
}

/// First `max_chars` characters of `text`, UTF-8 safe, no ellipsis.
fn bound_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModerationConfig;

    fn result_with(flags: Vec<ModerationFlag>, risk_score: f64) -> ModerationResult {
        ModerationResult {
            allowed: true,
            confidence: 0.5,
            flags,
            recommended_action: Action::Review,
            risk_score,
            processing_time_ms: 0,
            sanitized_content: None,
        }
    }

    fn flag(severity: Severity) -> ModerationFlag {
        ModerationFlag {
            rule: "t".to_string(),
            severity,
            category: "t".to_string(),
            message: "t".to_string(),
            confidence: 0.9,
            position: None,
            suggested_replacement: None,
        }
    }

    #[test]
    fn priority_ladder() {
        let config = ModerationConfig::default();
        let p = |flags, risk| review_priority(&result_with(flags, risk), &config);

        assert_eq!(p(vec![flag(Severity::Critical)], 0.0), ReviewPriority::Urgent);
        assert_eq!(
            p(vec![flag(Severity::High), flag(Severity::High)], 0.0),
            ReviewPriority::High
        );
        assert_eq!(p(vec![flag(Severity::High)], 0.0), ReviewPriority::Medium);
        assert_eq!(p(vec![], 41.0), ReviewPriority::Medium);
        assert_eq!(p(vec![flag(Severity::Medium)], 10.0), ReviewPriority::Low);
    }

    #[test]
    fn bound_chars_is_utf8_safe() {
        assert_eq!(bound_chars("héllo", 3), "hél");
        assert_eq!(bound_chars("short", 100), "short");
    }

    #[test]
    fn fail_open_shape() {
        let r = fail_open(Instant::now());
        assert!(r.allowed);
        assert_eq!(r.recommended_action, Action::Allow);
        assert_eq!(r.flags.len(), 1);
        assert_eq!(r.flags[0].category, "system");
        assert!(r.confidence >= 0.1);
    }
}
