//! Per-channel retention policy storage.
//!
//! A [`types::ChannelPolicy`] is created lazily the first time a channel is
//! configured and then only ever updated. Stores are injected as
//! `Arc<dyn PolicyStore>`.

pub mod error;
pub mod store;
pub mod store_memory;
pub mod store_sqlite;
pub mod types;

pub use {
    error::{Error, Result},
    store::PolicyStore,
    store_memory::InMemoryPolicyStore,
    store_sqlite::SqlitePolicyStore,
    types::{ChannelPolicy, DEFAULT_DELAY_MINUTES},
};

/// Run database migrations for the policy crate.
///
/// This creates the `channel_policies` table. Should be called at application
/// startup when using [`SqlitePolicyStore::with_pool`].
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .set_ignore_missing(true)
        .run(pool)
        .await?;
    Ok(())
}
