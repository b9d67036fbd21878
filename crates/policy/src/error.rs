use thiserror::Error;

/// Policy store failures. Any of these aborts the single operation that hit it.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("delay must be at least one minute (channel {channel_id})")]
    InvalidDelay { channel_id: String },

    #[error("stored policy for channel {channel_id} is corrupt: {message}")]
    Corrupt { channel_id: String, message: String },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_delay(channel_id: impl Into<String>) -> Self {
        Self::InvalidDelay {
            channel_id: channel_id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
