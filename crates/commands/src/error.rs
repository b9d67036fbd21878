use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing the policy failed; the command had no effect.
    #[error(transparent)]
    Policy(#[from] autodelete_policy::Error),

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
