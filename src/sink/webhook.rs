// Webhook audit sink — POSTs each record to a configured HTTP endpoint.
//
// Body shape is `{"type": "moderation", "data": {...}}` so one endpoint
// can multiplex event kinds. Failures bubble up as errors for the
// engine's fire-and-forget wrapper to log; there is no retry here.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{AuditRecord, AuditSink};

pub struct WebhookAuditSink {
    client: Client,
    url: String,
}

impl WebhookAuditSink {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl AuditSink for WebhookAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<()> {
        let payload = json!({
            "type": "moderation",
            "data": record,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .context("Failed to deliver audit webhook")?;

        if !response.status().is_success() {
            anyhow::bail!("Audit webhook returned {}", response.status());
        }

        Ok(())
    }
}
