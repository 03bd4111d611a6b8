use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("channel rejected message (status {status}): {description}")]
    Rejected { status: u16, description: String },
}

/// Destination for a finished digest.
#[async_trait]
pub trait Publisher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Sends one message. A returned error means the message was not delivered.
    async fn publish(&self, text: &str) -> Result<(), PublishError>;
}
