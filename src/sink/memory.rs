// In-memory review queue — used by the CLI and tests. A real deployment
// points the trait at its queue/store instead.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::ReviewQueue;
use crate::models::ReviewQueueItem;

#[derive(Default)]
pub struct MemoryReviewQueue {
    items: Mutex<Vec<ReviewQueueItem>>,
}

impl MemoryReviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything enqueued so far.
    pub async fn items(&self) -> Vec<ReviewQueueItem> {
        self.items.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

#[async_trait]
impl ReviewQueue for MemoryReviewQueue {
    async fn enqueue(&self, item: ReviewQueueItem) -> Result<()> {
        self.items.lock().await.push(item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Action, ModerationResult, ReviewPriority, ReviewStatus,
    };

    fn item(id: &str) -> ReviewQueueItem {
        ReviewQueueItem {
            id: id.to_string(),
            content: "text".to_string(),
            content_hash: "abc".to_string(),
            result: ModerationResult {
                allowed: true,
                confidence: 1.0,
                flags: Vec::new(),
                recommended_action: Action::Review,
                risk_score: 0.0,
                processing_time_ms: 0,
                sanitized_content: None,
            },
            context: None,
            status: ReviewStatus::Pending,
            priority: ReviewPriority::Low,
        }
    }

    #[tokio::test]
    async fn enqueue_accumulates_in_order() {
        let queue = MemoryReviewQueue::new();
        queue.enqueue(item("a")).await.unwrap();
        queue.enqueue(item("b")).await.unwrap();
        let items = queue.items().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[1].id, "b");
    }
}
