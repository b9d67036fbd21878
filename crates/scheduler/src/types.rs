//! Core data types for deletion scheduling.

use std::time::Duration;

use {
    autodelete_common::{MessageEvent, now_ms},
    serde::{Deserialize, Serialize},
};

/// A pending, time-triggered request to remove one message.
///
/// Holds the delay by value: editing the channel policy afterwards does not
/// move an already scheduled deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledDeletion {
    pub message_id: String,
    pub channel_id: String,
    /// Epoch millis at which the delete may first be attempted.
    pub fire_at_ms: u64,
}

impl ScheduledDeletion {
    /// Schedule `event` for deletion `delay` from now.
    pub fn for_event(event: &MessageEvent, delay: Duration) -> Self {
        Self {
            message_id: event.id.clone(),
            channel_id: event.channel_id.clone(),
            fire_at_ms: now_ms().saturating_add(delay.as_millis() as u64),
        }
    }
}

/// Persisted form of a scheduled deletion, including the message context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDeletion {
    pub message_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub content: String,
    pub fire_at_ms: u64,
    pub created_at_ms: u64,
}

impl PendingDeletion {
    pub fn new(deletion: &ScheduledDeletion, event: &MessageEvent) -> Self {
        Self {
            message_id: deletion.message_id.clone(),
            channel_id: deletion.channel_id.clone(),
            author_id: event.author_id.clone(),
            content: event.text.clone(),
            fire_at_ms: deletion.fire_at_ms,
            created_at_ms: now_ms(),
        }
    }

    pub fn to_scheduled(&self) -> ScheduledDeletion {
        ScheduledDeletion {
            message_id: self.message_id.clone(),
            channel_id: self.channel_id.clone(),
            fire_at_ms: self.fire_at_ms,
        }
    }
}

/// What `on_message_created` did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// The bot's own message.
    FromSelf,
    /// A control command; handled elsewhere.
    ControlCommand,
    /// The channel has no policy record.
    NoPolicy,
    /// The channel's policy is disabled.
    Disabled,
    /// The message is already queued.
    AlreadyPending,
    Scheduled(ScheduledDeletion),
}

/// Runtime options for [`crate::DeletionScheduler`].
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Sleep used by the dispatcher while the queue is empty.
    pub idle_poll: Duration,
    /// Upper bound on concurrently running delete requests.
    pub max_concurrent_deletes: usize,
    /// Messages whose first word equals this prefix are never scheduled.
    pub control_prefix: Option<String>,
    /// Re-queue persisted pending deletions on `start`.
    pub replay_pending: bool,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            idle_poll: Duration::from_secs(60),
            max_concurrent_deletes: 8,
            control_prefix: Some("!autodelete".into()),
            replay_pending: false,
        }
    }
}

/// Summary status of the scheduler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub running: bool,
    pub pending: usize,
    pub next_fire_at_ms: Option<u64>,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> MessageEvent {
        MessageEvent {
            id: "m1".into(),
            channel_id: "c1".into(),
            server_id: Some("g1".into()),
            author_id: "u1".into(),
            text: "hello".into(),
            is_bot: false,
        }
    }

    #[test]
    fn fire_at_is_now_plus_delay() {
        let before = now_ms();
        let d = ScheduledDeletion::for_event(&event(), Duration::from_secs(120));
        let after = now_ms();
        assert!(d.fire_at_ms >= before + 120_000);
        assert!(d.fire_at_ms <= after + 120_000);
        assert_eq!(d.message_id, "m1");
        assert_eq!(d.channel_id, "c1");
    }

    #[test]
    fn pending_deletion_keeps_context() {
        let d = ScheduledDeletion::for_event(&event(), Duration::from_secs(60));
        let pending = PendingDeletion::new(&d, &event());
        assert_eq!(pending.author_id, "u1");
        assert_eq!(pending.content, "hello");
        assert_eq!(pending.to_scheduled(), d);
    }

    #[test]
    fn status_serializes_camel_case() {
        let s = SchedulerStatus {
            running: true,
            pending: 3,
            next_fire_at_ms: Some(10),
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["nextFireAtMs"], 10);
    }
}
