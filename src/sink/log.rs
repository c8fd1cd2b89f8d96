// Log-backed audit sink — the default when no webhook is configured.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::{AuditRecord, AuditSink};

/// Writes each audit record as one structured log line.
pub struct LogAuditSink;

#[async_trait]
impl AuditSink for LogAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<()> {
        let payload = serde_json::to_string(&record)?;
        info!(
            target: "palisade::audit",
            content_hash = %record.content_hash,
            action = %record.result.recommended_action,
            allowed = record.result.allowed,
            record = %payload,
            "moderation decision"
        );
        Ok(())
    }
}
