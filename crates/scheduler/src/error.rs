use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The policy store could not be read; the triggering event is dropped.
    #[error(transparent)]
    Policy(#[from] autodelete_policy::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

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
}

pub type Result<T> = std::result::Result<T, Error>;
