//! Channel policy record and its state transitions.

use std::{num::NonZeroU32, time::Duration};

use {
    autodelete_common::now_ms,
    serde::{Deserialize, Serialize},
};

/// Delay applied to a channel that has never been given one.
pub const DEFAULT_DELAY_MINUTES: u32 = 2;

/// Auto-delete configuration for one channel.
///
/// `enabled` and `delay_minutes` are independent: toggling keeps the delay,
/// changing the delay keeps the toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPolicy {
    pub channel_id: String,
    pub server_id: String,
    #[serde(default)]
    pub enabled: bool,
    pub delay_minutes: u32,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl ChannelPolicy {
    /// A fresh, disabled policy.
    pub fn new(
        channel_id: impl Into<String>,
        server_id: impl Into<String>,
        delay_minutes: u32,
    ) -> Self {
        let now = now_ms();
        Self {
            channel_id: channel_id.into(),
            server_id: server_id.into(),
            enabled: false,
            delay_minutes,
            created_at_ms: now,
            updated_at_ms: now,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.delay_minutes) * 60)
    }

    /// Turn auto-delete on, optionally replacing the delay.
    pub fn enable(&mut self, delay_minutes: Option<NonZeroU32>) {
        self.enabled = true;
        if let Some(minutes) = delay_minutes {
            self.delay_minutes = minutes.get();
        }
        self.touch();
    }

    /// Turn auto-delete off. The delay is kept for the next `enable`.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.touch();
    }

    /// Replace the delay without changing enablement.
    pub fn set_delay(&mut self, delay_minutes: NonZeroU32) {
        self.delay_minutes = delay_minutes.get();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at_ms = now_ms().max(self.updated_at_ms);
    }
}
