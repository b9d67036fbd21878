//! In-memory pending deletion store for testing.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::{Result, store::PendingDeletionStore, types::PendingDeletion};

/// In-memory store backed by `HashMap`. No persistence.
#[derive(Default)]
pub struct InMemoryPendingStore {
    records: Mutex<HashMap<String, PendingDeletion>>,
}

impl InMemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(message_id)
    }
}

#[async_trait]
impl PendingDeletionStore for InMemoryPendingStore {
    async fn insert(&self, pending: &PendingDeletion) -> Result<()> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(pending.message_id.clone(), pending.clone());
        Ok(())
    }

    async fn remove(&self, message_id: &str) -> Result<()> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.remove(message_id);
        Ok(())
    }

    async fn remove_channel(&self, channel_id: &str) -> Result<u64> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let before = records.len();
        records.retain(|_, p| p.channel_id != channel_id);
        Ok((before - records.len()) as u64)
    }

    async fn list(&self) -> Result<Vec<PendingDeletion>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<_> = records.values().cloned().collect();
        all.sort_by(|a, b| {
            a.fire_at_ms
                .cmp(&b.fire_at_ms)
                .then_with(|| a.message_id.cmp(&b.message_id))
        });
        Ok(all)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn pending(msg: &str, channel: &str, fire_at_ms: u64) -> PendingDeletion {
        PendingDeletion {
            message_id: msg.into(),
            channel_id: channel.into(),
            author_id: "u1".into(),
            content: "hi".into(),
            fire_at_ms,
            created_at_ms: 0,
        }
    }

    #[tokio::test]
    async fn insert_list_remove() {
        let store = InMemoryPendingStore::new();
        store.insert(&pending("m2", "c1", 200)).await.unwrap();
        store.insert(&pending("m1", "c1", 100)).await.unwrap();

        let ids: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.message_id)
            .collect();
        assert_eq!(ids, vec!["m1", "m2"]);

        store.remove("m1").await.unwrap();
        store.remove("missing").await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains("m2"));
    }

    #[tokio::test]
    async fn remove_channel_counts() {
        let store = InMemoryPendingStore::new();
        store.insert(&pending("a", "c1", 1)).await.unwrap();
        store.insert(&pending("b", "c2", 2)).await.unwrap();
        store.insert(&pending("c", "c1", 3)).await.unwrap();

        assert_eq!(store.remove_channel("c1").await.unwrap(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.remove_channel("c1").await.unwrap(), 0);
    }
}
