// Outbound sinks — audit trail and human review queue.
//
// Both are ports: the engine only knows the trait. Deliveries are
// fire-and-forget with a bounded timeout; a sink failure is logged and
// swallowed, never surfaced to the moderation caller.

pub mod log;
pub mod memory;
pub mod webhook;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ModerationResult, ReviewQueueItem, SubmissionContext};

/// Bumped when the audit record shape changes.
pub const AUDIT_SCHEMA_VERSION: u32 = 1;

/// One audit record per moderation call.
///
/// `content_hash` is a correlation key between this record and any
/// review item for the same call — not an integrity check.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub content_hash: String,
    pub content_length: usize,
    pub result: ModerationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<SubmissionContext>,
    pub version: u32,
}

/// Destination for audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: AuditRecord) -> Result<()>;
}

/// Enqueue boundary to the external human-review store.
#[async_trait]
pub trait ReviewQueue: Send + Sync {
    async fn enqueue(&self, item: ReviewQueueItem) -> Result<()>;
}
