//! Platform-neutral inbound message model.

use std::{
    sync::{Arc, OnceLock},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

/// A newly created chat message, as delivered by the event source.
///
/// Edits and deletions are never delivered as `MessageEvent`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub id: String,
    pub channel_id: String,
    /// Owning server (guild). `None` for direct messages.
    pub server_id: Option<String>,
    pub author_id: String,
    pub text: String,
    pub is_bot: bool,
}

/// The bot's own user id, learned once the platform connection is ready.
///
/// Cloned into every component that must ignore the bot's own output.
#[derive(Debug, Clone, Default)]
pub struct SelfIdentity {
    user_id: Arc<OnceLock<String>>,
}

impl SelfIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the bot user id. Later calls are ignored.
    pub fn set(&self, user_id: impl Into<String>) {
        let _ = self.user_id.set(user_id.into());
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.get().map(String::as_str)
    }

    /// True when `author_id` is the bot itself.
    pub fn is_self(&self, author_id: &str) -> bool {
        self.user_id().is_some_and(|id| id == author_id)
    }
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_identity_unknown_until_set() {
        let me = SelfIdentity::new();
        assert!(!me.is_self("42"));
        me.set("42");
        assert!(me.is_self("42"));
        assert!(!me.is_self("43"));
    }

    #[test]
    fn self_identity_is_shared_between_clones() {
        let me = SelfIdentity::new();
        let other = me.clone();
        me.set("7");
        other.set("8");
        assert_eq!(other.user_id(), Some("7"));
    }
}
