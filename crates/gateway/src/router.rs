//! Single entry point for inbound messages.

use std::sync::Arc;

use {
    async_trait::async_trait,
    tracing::{info, warn},
};

use {
    autodelete_channels::MessageSink,
    autodelete_commands::{CommandOutcome, PolicyCommand, PolicyCommandProcessor},
    autodelete_common::MessageEvent,
    autodelete_scheduler::{DeletionScheduler, ScheduleOutcome},
};

use crate::Result;

/// Where an inbound message ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    /// Handled as a control command.
    Command(CommandOutcome),
    /// Offered to the deletion scheduler.
    Message(ScheduleOutcome),
}

/// Sends control commands to the processor and everything else to the
/// scheduler.
pub struct InboundRouter {
    commands: PolicyCommandProcessor,
    scheduler: Arc<DeletionScheduler>,
    cancel_pending_on_disable: bool,
}

impl InboundRouter {
    pub fn new(commands: PolicyCommandProcessor, scheduler: Arc<DeletionScheduler>) -> Self {
        Self {
            commands,
            scheduler,
            cancel_pending_on_disable: false,
        }
    }

    /// Drop a channel's queued deletions when an admin disables it.
    #[must_use]
    pub fn cancel_pending_on_disable(mut self, enabled: bool) -> Self {
        self.cancel_pending_on_disable = enabled;
        self
    }

    pub fn scheduler(&self) -> &Arc<DeletionScheduler> {
        &self.scheduler
    }

    /// Route one message. Errors mean a policy lookup or write failed; the
    /// message is dropped.
    pub async fn route(&self, event: &MessageEvent) -> Result<Routed> {
        let outcome = self.commands.handle(event).await?;
        if outcome == CommandOutcome::NotACommand {
            let scheduled = self.scheduler.on_message_created(event).await?;
            return Ok(Routed::Message(scheduled));
        }

        if self.cancel_pending_on_disable
            && let CommandOutcome::Applied {
                command: PolicyCommand::Disable,
                policy,
            } = &outcome
        {
            let cancelled = self.scheduler.cancel_channel(&policy.channel_id).await;
            info!(
                channel_id = %policy.channel_id,
                cancelled,
                "auto-delete disabled, queued deletions dropped"
            );
        }
        Ok(Routed::Command(outcome))
    }
}

#[async_trait]
impl MessageSink for InboundRouter {
    async fn dispatch(&self, event: MessageEvent) {
        if let Err(e) = self.route(&event).await {
            warn!(
                message_id = %event.id,
                channel_id = %event.channel_id,
                error = %e,
                "failed to handle message"
            );
        }
    }
}
