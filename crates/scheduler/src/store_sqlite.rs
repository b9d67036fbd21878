//! SQLite-backed pending deletion store using sqlx.

use {
    async_trait::async_trait,
    sqlx::{
        Row, SqlitePool,
        sqlite::{SqlitePoolOptions, SqliteRow},
    },
};

use crate::{Result, store::PendingDeletionStore, types::PendingDeletion};

/// SQLite-backed persistence for pending deletions.
pub struct SqlitePendingStore {
    pool: SqlitePool,
}

impl SqlitePendingStore {
    /// Create a new store with its own connection pool and run migrations.
    ///
    /// For a shared pool, use [`SqlitePendingStore::with_pool`] after calling
    /// [`crate::run_migrations`].
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        crate::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a store using an existing pool (migrations must already be run).
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn pending_from_row(row: &SqliteRow) -> Result<PendingDeletion> {
    Ok(PendingDeletion {
        message_id: row.try_get("message_id")?,
        channel_id: row.try_get("channel_id")?,
        author_id: row.try_get("author_id")?,
        content: row.try_get("content")?,
        fire_at_ms: row.try_get::<i64, _>("fire_at_ms")?.max(0) as u64,
        created_at_ms: row.try_get::<i64, _>("created_at_ms")?.max(0) as u64,
    })
}

#[async_trait]
impl PendingDeletionStore for SqlitePendingStore {
    async fn insert(&self, pending: &PendingDeletion) -> Result<()> {
        sqlx::query(
            "INSERT INTO pending_deletions (message_id, channel_id, author_id, content, fire_at_ms, created_at_ms)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(message_id) DO UPDATE SET
                channel_id = excluded.channel_id,
                author_id = excluded.author_id,
                content = excluded.content,
                fire_at_ms = excluded.fire_at_ms,
                created_at_ms = excluded.created_at_ms",
        )
        .bind(&pending.message_id)
        .bind(&pending.channel_id)
        .bind(&pending.author_id)
        .bind(&pending.content)
        .bind(pending.fire_at_ms as i64)
        .bind(pending.created_at_ms as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, message_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM pending_deletions WHERE message_id = ?")
            .bind(message_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_channel(&self, channel_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM pending_deletions WHERE channel_id = ?")
            .bind(channel_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list(&self) -> Result<Vec<PendingDeletion>> {
        let rows = sqlx::query(
            "SELECT message_id, channel_id, author_id, content, fire_at_ms, created_at_ms
             FROM pending_deletions ORDER BY fire_at_ms, message_id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(pending_from_row).collect()
    }
}
