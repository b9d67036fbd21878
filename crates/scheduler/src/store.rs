//! Persistence trait for scheduled-but-unexecuted deletions.

use async_trait::async_trait;

use crate::{Result, types::PendingDeletion};

/// Persistence backend for pending deletions.
///
/// Records are written when a deletion is scheduled and removed once it has
/// been attempted, so whatever remains after a crash is the set of messages
/// whose deletion never ran.
#[async_trait]
pub trait PendingDeletionStore: Send + Sync {
    /// Insert a record. Inserting an existing message id replaces it.
    async fn insert(&self, pending: &PendingDeletion) -> Result<()>;
    /// Remove a record. Removing a missing record is not an error.
    async fn remove(&self, message_id: &str) -> Result<()>;
    /// Remove every record for a channel and return how many were removed.
    async fn remove_channel(&self, channel_id: &str) -> Result<u64>;
    /// All records, earliest `fire_at_ms` first.
    async fn list(&self) -> Result<Vec<PendingDeletion>>;
}
