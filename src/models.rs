// Core value types — the shapes that flow through the engine.
//
// These are separate from the engine and analyzers so sinks, the CLI,
// and external callers can use them without pulling in evaluation logic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Ordinal severity rank, used both per-flag and in rule definitions.
///
/// The derived ordering (Low < Medium < High < Critical) is load-bearing:
/// the decision fuser compares severities directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The engine's rendered decision for a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allow,
    Warn,
    Review,
    Block,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Allow => "allow",
            Action::Warn => "warn",
            Action::Review => "review",
            Action::Block => "block",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a custom rule declares should happen on match. Advisory metadata —
/// the fuser decides from severity, not from this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Block,
    Flag,
    Warn,
    Review,
}

/// Ceiling applied when an automated decision would otherwise block.
///
/// With `Flag` or `Warn`, a high-severity finding still routes to review
/// but the content stays visible (`allowed = true`) pending a human look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoAction {
    Block,
    Flag,
    Warn,
}

/// Half-open character range into the original text.
///
/// Character offsets, not byte offsets — positions survive serialization
/// to callers that index text by code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// One analyzer's finding about the input text.
///
/// Flags are pure values. They accumulate in analyzer execution order and
/// are never deduplicated — duplicates raise the aggregate risk score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationFlag {
    /// Source identifier (analyzer name or custom rule id)
    pub rule: String,
    pub severity: Severity,
    pub category: String,
    pub message: String,
    /// How sure the analyzer is about this finding (0.0 - 1.0)
    pub confidence: f64,
    /// Where in the original text the finding sits, when span-level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Span>,
    /// Replacement text the sanitizer should substitute at `position`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_replacement: Option<String>,
}

/// The engine's output for a single `moderate_content` call. Immutable
/// once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationResult {
    pub allowed: bool,
    /// Decision confidence, clamped to [0.1, 1.0]
    pub confidence: f64,
    pub flags: Vec<ModerationFlag>,
    pub recommended_action: Action,
    /// Unbounded additive accumulator — a secondary signal, not normalized
    pub risk_score: f64,
    pub processing_time_ms: u64,
    /// Redacted copy of the input. Present only if it differs from the
    /// original — callers test presence, never empty-string equality.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitized_content: Option<String>,
}

/// Caller-supplied context about the submission being moderated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Set by the submission layer when this user is posting unusually
    /// fast; feeds the spam analyzer.
    #[serde(default)]
    pub rapid_submission: bool,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Triage priority for the human review queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl ReviewPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewPriority::Low => "low",
            ReviewPriority::Medium => "medium",
            ReviewPriority::High => "high",
            ReviewPriority::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for ReviewPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a review queue item. The engine only ever emits
/// `Pending`; the rest belong to the external triage tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

/// What gets handed to the human review collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewQueueItem {
    pub id: String,
    /// Truncated copy of the content (bounded length, UTF-8 safe)
    pub content: String,
    /// Correlation key back to the audit record
    pub content_hash: String,
    pub result: ModerationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<SubmissionContext>,
    pub status: ReviewStatus,
    pub priority: ReviewPriority,
}

/// Rolling hash of content for correlation between audit records and
/// review items.
///
/// Non-cryptographic on purpose: this is a correlation key, never an
/// integrity or dedup guarantee.
pub fn content_hash(text: &str) -> String {
    let mut hash: u64 = 5381;
    for byte in text.bytes() {
        hash = hash.wrapping_mul(33) ^ u64::from(byte);
    }
    format!("{hash:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_serde_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        let back: Severity = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(back, Severity::Medium);
    }

    #[test]
    fn span_len_and_empty() {
        assert_eq!(Span::new(2, 7).len(), 5);
        assert!(Span::new(3, 3).is_empty());
        assert!(!Span::new(0, 1).is_empty());
    }

    #[test]
    fn content_hash_is_stable_and_distinct() {
        assert_eq!(content_hash("hello"), content_hash("hello"));
        assert_ne!(content_hash("hello"), content_hash("hellp"));
        assert_eq!(content_hash("").len(), 16);
    }
}
