use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Commands(#[from] autodelete_commands::Error),

    #[error(transparent)]
    Scheduler(#[from] autodelete_scheduler::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
