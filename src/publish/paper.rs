use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use super::traits::{PublishError, Publisher};

/// Dry-run publisher: writes the digest to the log instead of the channel.
pub struct LogPublisher {
    channel_id: String,
    next_message_id: AtomicU64,
}

impl LogPublisher {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            next_message_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl Publisher for LogPublisher {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn publish(&self, text: &str) -> Result<(), PublishError> {
        let message_id = self.next_message_id.fetch_add(1, Ordering::Relaxed);

        info!(
            message_id,
            channel_id = %self.channel_id,
            chars = text.chars().count(),
            "DRY RUN digest\n{text}"
        );
        Ok(())
    }
}
