//! Delayed message deletion.
//!
//! One dispatcher task owns a time-ordered queue of pending deletions and
//! sleeps until the earliest is due. Each due deletion runs as its own
//! fire-and-forget task; failures are logged and never retried.

pub mod error;
pub mod queue;
pub mod service;
pub mod store;
pub mod store_memory;
pub mod store_sqlite;
pub mod types;

pub use {
    error::{Error, Result},
    service::DeletionScheduler,
    store::PendingDeletionStore,
    store_memory::InMemoryPendingStore,
    store_sqlite::SqlitePendingStore,
    types::{PendingDeletion, ScheduleOutcome, ScheduledDeletion, SchedulerOptions, SchedulerStatus},
};

/// Run database migrations for the scheduler crate.
///
/// This creates the `pending_deletions` table. Should be called at startup
/// when using [`SqlitePendingStore::with_pool`].
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .set_ignore_missing(true)
        .run(pool)
        .await?;
    Ok(())
}
