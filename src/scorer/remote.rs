// Remote toxicity provider — HTTP implementation of ToxicityScorer.
//
// Speaks a minimal JSON contract: POST {"content": "..."} and read back
// {"score": 0.0-1.0}. Any classifier service can sit behind it; the
// engine treats errors and timeouts as a signal to use the keyword
// fallback, so this provider never has to be careful about failing.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ToxicityScorer;

/// HTTP-backed toxicity scorer.
pub struct RemoteScorer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteScorer {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl ToxicityScorer for RemoteScorer {
    async fn score(&self, text: &str) -> Result<f64> {
        let request = ScoreRequest { content: text };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .context("Failed to call toxicity provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Toxicity provider returned {}: {}", status, body);
        }

        let result: ScoreResponse = response
            .json()
            .await
            .context("Failed to parse toxicity provider response")?;

        let score = result.score.clamp(0.0, 1.0);
        let preview: String = text.chars().take(50).collect();
        debug!(score = score, text_preview = %preview, "Scored text via remote provider");

        Ok(score)
    }
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct ScoreResponse {
    score: f64,
}
