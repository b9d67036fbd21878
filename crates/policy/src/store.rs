//! Persistence trait for channel policies.

use async_trait::async_trait;

use crate::{Result, types::ChannelPolicy};

/// Durable `channel_id → ChannelPolicy` mapping.
///
/// Implementations must allow concurrent calls for different channels.
/// Concurrent `save`s for the same channel are last-write-wins.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Read-only lookup. `None` means auto-delete was never configured.
    async fn get(&self, channel_id: &str) -> Result<Option<ChannelPolicy>>;

    /// Return the existing policy or atomically insert a disabled default.
    async fn get_or_create(&self, channel_id: &str, server_id: &str) -> Result<ChannelPolicy>;

    /// Upsert the full record. Rejects a zero delay.
    async fn save(&self, policy: &ChannelPolicy) -> Result<()>;

    /// All stored policies, ordered by channel id.
    async fn list(&self) -> Result<Vec<ChannelPolicy>>;
}
