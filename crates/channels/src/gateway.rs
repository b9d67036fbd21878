use async_trait::async_trait;

use crate::Result;

/// Why the platform refused to delete a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeleteError {
    /// The message (or its channel) no longer exists.
    #[error("message not found")]
    NotFound,

    /// The bot lacks permission to manage messages in the channel.
    #[error("permission denied")]
    PermissionDenied,

    /// Network failure, rate limit, or any other retryable condition.
    #[error("transient failure: {0}")]
    Transient(String),
}

impl DeleteError {
    /// Stable short label, used for metrics and structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::Transient(_) => "transient",
        }
    }
}

/// Outbound operations against a chat channel.
#[async_trait]
pub trait ChannelGateway: Send + Sync {
    /// Remove one message. Callers treat every error as final.
    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> std::result::Result<(), DeleteError>;

    /// Post a plain-text notice to a channel.
    async fn send_notice(&self, channel_id: &str, text: &str) -> Result<()>;
}
