//! SQLite-backed policy store using sqlx.

use {
    async_trait::async_trait,
    autodelete_common::now_ms,
    sqlx::{
        Row, SqlitePool,
        sqlite::{SqlitePoolOptions, SqliteRow},
    },
    tracing::debug,
};

use crate::{
    Error, Result,
    store::PolicyStore,
    types::{ChannelPolicy, DEFAULT_DELAY_MINUTES},
};

const SELECT_COLUMNS: &str =
    "SELECT channel_id, server_id, enabled, delay_minutes, created_at, updated_at FROM channel_policies";

/// SQLite-backed persistence for channel policies.
pub struct SqlitePolicyStore {
    pool: SqlitePool,
    default_delay_minutes: u32,
}

impl SqlitePolicyStore {
    /// Create a new store with its own connection pool and run migrations.
    ///
    /// Use this for standalone databases. For a shared pool, use
    /// [`SqlitePolicyStore::with_pool`] after calling [`crate::run_migrations`].
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        crate::run_migrations(&pool).await?;

        Ok(Self::with_pool(pool))
    }

    /// Create a store using an existing pool (migrations must already be run).
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            default_delay_minutes: DEFAULT_DELAY_MINUTES,
        }
    }

    /// Delay given to policies created by [`PolicyStore::get_or_create`].
    #[must_use]
    pub fn default_delay_minutes(mut self, minutes: u32) -> Self {
        self.default_delay_minutes = minutes;
        self
    }
}

fn policy_from_row(row: &SqliteRow) -> Result<ChannelPolicy> {
    let channel_id: String = row.try_get("channel_id")?;
    let delay: i64 = row.try_get("delay_minutes")?;
    let delay_minutes = u32::try_from(delay)
        .ok()
        .filter(|m| *m > 0)
        .ok_or_else(|| Error::Corrupt {
            channel_id: channel_id.clone(),
            message: format!("delay_minutes = {delay}"),
        })?;

    Ok(ChannelPolicy {
        server_id: row.try_get("server_id")?,
        enabled: row.try_get::<i64, _>("enabled")? != 0,
        delay_minutes,
        created_at_ms: row.try_get::<i64, _>("created_at")? as u64,
        updated_at_ms: row.try_get::<i64, _>("updated_at")? as u64,
        channel_id,
    })
}

#[async_trait]
impl PolicyStore for SqlitePolicyStore {
    async fn get(&self, channel_id: &str) -> Result<Option<ChannelPolicy>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE channel_id = ?"))
            .bind(channel_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(policy_from_row).transpose()
    }

    async fn get_or_create(&self, channel_id: &str, server_id: &str) -> Result<ChannelPolicy> {
        let now = now_ms() as i64;
        // DO NOTHING keeps the insert atomic against a racing creator.
        let inserted = sqlx::query(
            "INSERT INTO channel_policies (channel_id, server_id, enabled, delay_minutes, created_at, updated_at)
             VALUES (?, ?, 0, ?, ?, ?)
             ON CONFLICT(channel_id) DO NOTHING",
        )
        .bind(channel_id)
        .bind(server_id)
        .bind(i64::from(self.default_delay_minutes))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() > 0 {
            debug!(channel_id, server_id, "created default channel policy");
        }

        self.get(channel_id)
            .await?
            .ok_or_else(|| Error::message(format!("policy for {channel_id} vanished after insert")))
    }

    async fn save(&self, policy: &ChannelPolicy) -> Result<()> {
        if policy.delay_minutes == 0 {
            return Err(Error::invalid_delay(&policy.channel_id));
        }
        sqlx::query(
            "INSERT INTO channel_policies (channel_id, server_id, enabled, delay_minutes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(channel_id) DO UPDATE SET
                server_id = excluded.server_id,
                enabled = excluded.enabled,
                delay_minutes = excluded.delay_minutes,
                updated_at = excluded.updated_at",
        )
        .bind(&policy.channel_id)
        .bind(&policy.server_id)
        .bind(i64::from(policy.enabled))
        .bind(i64::from(policy.delay_minutes))
        .bind(policy.created_at_ms as i64)
        .bind(policy.updated_at_ms as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ChannelPolicy>> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY channel_id"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(policy_from_row).collect()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::{num::NonZeroU32, sync::Arc};

    use super::*;

    async fn make_store() -> SqlitePolicyStore {
        SqlitePolicyStore::new("sqlite::memory:").await.unwrap()
    }

    fn minutes(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_sqlite_missing_is_none() {
        let store = make_store().await;
        assert!(store.get("c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_get_or_create_defaults() {
        let store = make_store().await.default_delay_minutes(3);
        let p = store.get_or_create("c1", "g1").await.unwrap();
        assert_eq!(p.channel_id, "c1");
        assert_eq!(p.server_id, "g1");
        assert!(!p.enabled);
        assert_eq!(p.delay_minutes, 3);

        let fetched = store.get("c1").await.unwrap().unwrap();
        assert_eq!(fetched, p);
    }

    #[tokio::test]
    async fn test_sqlite_get_or_create_keeps_existing() {
        let store = make_store().await;
        let mut p = store.get_or_create("c1", "g1").await.unwrap();
        p.enable(Some(minutes(10)));
        store.save(&p).await.unwrap();

        let again = store.get_or_create("c1", "g1").await.unwrap();
        assert!(again.enabled);
        assert_eq!(again.delay_minutes, 10);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sqlite_set_then_get() {
        let store = make_store().await;
        let mut p = store.get_or_create("c1", "g1").await.unwrap();
        p.set_delay(minutes(5));
        store.save(&p).await.unwrap();
        assert_eq!(store.get("c1").await.unwrap().unwrap().delay_minutes, 5);
    }

    #[tokio::test]
    async fn test_sqlite_toggle_keeps_delay() {
        let store = make_store().await;
        let mut p = store.get_or_create("c1", "g1").await.unwrap();
        p.set_delay(minutes(8));
        p.enable(None);
        store.save(&p).await.unwrap();
        p.disable();
        store.save(&p).await.unwrap();

        let stored = store.get("c1").await.unwrap().unwrap();
        assert!(!stored.enabled);
        assert_eq!(stored.delay_minutes, 8);
    }

    #[tokio::test]
    async fn test_sqlite_rejects_zero_delay() {
        let store = make_store().await;
        let mut p = store.get_or_create("c1", "g1").await.unwrap();
        p.delay_minutes = 0;
        assert!(matches!(
            store.save(&p).await,
            Err(Error::InvalidDelay { .. })
        ));
    }

    #[tokio::test]
    async fn test_sqlite_concurrent_creates_yield_one_row() {
        let store = Arc::new(make_store().await);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.get_or_create("c1", "g1").await })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sqlite_concurrent_sets_last_write_wins() {
        let store = Arc::new(make_store().await);
        store.get_or_create("c1", "g1").await.unwrap();

        let handles: Vec<_> = [4u32, 6]
            .into_iter()
            .map(|m| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let mut p = store.get_or_create("c1", "g1").await?;
                    p.set_delay(minutes(m));
                    store.save(&p).await
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let delay = store.get("c1").await.unwrap().unwrap().delay_minutes;
        assert!(delay == 4 || delay == 6);
    }
}
