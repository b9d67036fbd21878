//! In-memory policy store for testing.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::{
    Error, Result,
    store::PolicyStore,
    types::{ChannelPolicy, DEFAULT_DELAY_MINUTES},
};

/// In-memory store backed by `HashMap`. No persistence; used in tests.
pub struct InMemoryPolicyStore {
    policies: Mutex<HashMap<String, ChannelPolicy>>,
    default_delay_minutes: u32,
}

impl InMemoryPolicyStore {
    pub fn new() -> Self {
        Self::with_default_delay(DEFAULT_DELAY_MINUTES)
    }

    pub fn with_default_delay(default_delay_minutes: u32) -> Self {
        Self {
            policies: Mutex::new(HashMap::new()),
            default_delay_minutes,
        }
    }
}

impl Default for InMemoryPolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn get(&self, channel_id: &str) -> Result<Option<ChannelPolicy>> {
        let policies = self.policies.lock().unwrap_or_else(|e| e.into_inner());
        Ok(policies.get(channel_id).cloned())
    }

    async fn get_or_create(&self, channel_id: &str, server_id: &str) -> Result<ChannelPolicy> {
        let mut policies = self.policies.lock().unwrap_or_else(|e| e.into_inner());
        let policy = policies
            .entry(channel_id.to_string())
            .or_insert_with(|| {
                ChannelPolicy::new(channel_id, server_id, self.default_delay_minutes)
            });
        Ok(policy.clone())
    }

    async fn save(&self, policy: &ChannelPolicy) -> Result<()> {
        if policy.delay_minutes == 0 {
            return Err(Error::invalid_delay(&policy.channel_id));
        }
        let mut policies = self.policies.lock().unwrap_or_else(|e| e.into_inner());
        policies.insert(policy.channel_id.clone(), policy.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ChannelPolicy>> {
        let policies = self.policies.lock().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<_> = policies.values().cloned().collect();
        all.sort_by(|a, b| a.channel_id.cmp(&b.channel_id));
        Ok(all)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::{num::NonZeroU32, sync::Arc};

    use super::*;

    #[tokio::test]
    async fn missing_channel_is_none() {
        let store = InMemoryPolicyStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_or_create_uses_defaults_once() {
        let store = InMemoryPolicyStore::with_default_delay(4);
        let first = store.get_or_create("c1", "g1").await.unwrap();
        assert!(!first.enabled);
        assert_eq!(first.delay_minutes, 4);

        let mut changed = first.clone();
        changed.enable(None);
        store.save(&changed).await.unwrap();

        let again = store.get_or_create("c1", "g1").await.unwrap();
        assert!(again.enabled);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn save_rejects_zero_delay() {
        let store = InMemoryPolicyStore::new();
        let mut policy = store.get_or_create("c1", "g1").await.unwrap();
        policy.delay_minutes = 0;
        assert!(matches!(
            store.save(&policy).await,
            Err(Error::InvalidDelay { .. })
        ));
        assert_eq!(store.get("c1").await.unwrap().unwrap().delay_minutes, 2);
    }

    #[tokio::test]
    async fn concurrent_saves_are_last_write_wins() {
        let store = Arc::new(InMemoryPolicyStore::new());
        store.get_or_create("c1", "g1").await.unwrap();

        let handles: Vec<_> = [5u32, 9]
            .into_iter()
            .map(|m| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let mut p = store.get_or_create("c1", "g1").await.unwrap();
                    p.set_delay(NonZeroU32::new(m).unwrap());
                    store.save(&p).await
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let final_delay = store.get("c1").await.unwrap().unwrap().delay_minutes;
        assert!(final_delay == 5 || final_delay == 9);
    }

    #[tokio::test]
    async fn list_is_sorted() {
        let store = InMemoryPolicyStore::new();
        store.get_or_create("b", "g").await.unwrap();
        store.get_or_create("a", "g").await.unwrap();
        let ids: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.channel_id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
