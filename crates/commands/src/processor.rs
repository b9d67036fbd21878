//! Applies admin control commands to channel policies.

use std::sync::Arc;

use {
    autodelete_channels::{AdminAuthorizer, ChannelGateway},
    autodelete_common::{MessageEvent, SelfIdentity},
    autodelete_policy::{ChannelPolicy, DEFAULT_DELAY_MINUTES, PolicyStore},
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use autodelete_metrics::{commands as command_metrics, counter, labels};

use crate::{
    DEFAULT_PREFIX, Result,
    parse::{ParseError, PolicyCommand, parse_command},
};

/// Why a control command was dropped without a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    FromSelf,
    /// Sent outside a server, where there is no admin to check.
    DirectMessage,
    NotAdmin,
    /// The permission lookup itself failed.
    AuthUnavailable,
}

/// What [`PolicyCommandProcessor::handle`] did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Ordinary chat; the scheduler should look at it.
    NotACommand,
    Ignored(IgnoreReason),
    /// Malformed command; a usage or validation reply was sent.
    Rejected(ParseError),
    /// Command applied (or, for `status`, reported).
    Applied {
        command: PolicyCommand,
        policy: ChannelPolicy,
    },
}

impl CommandOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::NotACommand => "not_a_command",
            Self::Ignored(_) => "ignored",
            Self::Rejected(_) => "rejected",
            Self::Applied { .. } => "applied",
        }
    }
}

/// Handles `!autodelete` control messages.
pub struct PolicyCommandProcessor {
    policies: Arc<dyn PolicyStore>,
    gateway: Arc<dyn ChannelGateway>,
    authorizer: Arc<dyn AdminAuthorizer>,
    identity: SelfIdentity,
    prefix: String,
    default_delay_minutes: u32,
}

impl PolicyCommandProcessor {
    pub fn new(
        policies: Arc<dyn PolicyStore>,
        gateway: Arc<dyn ChannelGateway>,
        authorizer: Arc<dyn AdminAuthorizer>,
        identity: SelfIdentity,
    ) -> Self {
        Self {
            policies,
            gateway,
            authorizer,
            identity,
            prefix: DEFAULT_PREFIX.to_string(),
            default_delay_minutes: DEFAULT_DELAY_MINUTES,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Delay reported by `status` for channels without a stored policy.
    #[must_use]
    pub fn with_default_delay(mut self, minutes: u32) -> Self {
        self.default_delay_minutes = minutes;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// True when `text` would be treated as a control command.
    pub fn is_command(&self, text: &str) -> bool {
        text.split_whitespace().next() == Some(self.prefix.as_str())
    }

    /// Process one message.
    ///
    /// Fails only when the policy store could not be read or written; in that
    /// case nothing was changed and no reply was sent.
    pub async fn handle(&self, event: &MessageEvent) -> Result<CommandOutcome> {
        let outcome = self.handle_inner(event).await;

        #[cfg(feature = "metrics")]
        {
            let label = match &outcome {
                Ok(o) => o.label(),
                Err(_) => "failed",
            };
            if label != "not_a_command" {
                counter!(command_metrics::COMMANDS_TOTAL, labels::OUTCOME => label).increment(1);
            }
        }

        if let Ok(o) = &outcome {
            debug!(
                channel_id = %event.channel_id,
                author_id = %event.author_id,
                outcome = o.label(),
                "control message handled"
            );
        }
        outcome
    }

    async fn handle_inner(&self, event: &MessageEvent) -> Result<CommandOutcome> {
        if self.identity.is_self(&event.author_id) {
            return Ok(CommandOutcome::Ignored(IgnoreReason::FromSelf));
        }
        if !self.is_command(&event.text) {
            return Ok(CommandOutcome::NotACommand);
        }
        let Some(server_id) = event.server_id.as_deref() else {
            return Ok(CommandOutcome::Ignored(IgnoreReason::DirectMessage));
        };

        match self.authorizer.is_admin(server_id, &event.author_id).await {
            Ok(true) => {},
            Ok(false) => return Ok(CommandOutcome::Ignored(IgnoreReason::NotAdmin)),
            Err(e) => {
                warn!(
                    server_id,
                    author_id = %event.author_id,
                    error = %e,
                    "admin lookup failed, ignoring command"
                );
                return Ok(CommandOutcome::Ignored(IgnoreReason::AuthUnavailable));
            },
        }

        let command = match parse_command(&self.prefix, &event.text) {
            Some(Ok(command)) => command,
            Some(Err(e)) => {
                self.reply(&event.channel_id, &e.reply(&self.prefix)).await;
                return Ok(CommandOutcome::Rejected(e));
            },
            None => return Ok(CommandOutcome::NotACommand),
        };

        let policy = match command {
            PolicyCommand::Status => self
                .policies
                .get(&event.channel_id)
                .await?
                .unwrap_or_else(|| {
                    ChannelPolicy::new(&event.channel_id, server_id, self.default_delay_minutes)
                }),
            _ => {
                let mut policy = self
                    .policies
                    .get_or_create(&event.channel_id, server_id)
                    .await?;
                apply(&mut policy, command);
                self.policies.save(&policy).await?;
                info!(
                    channel_id = %policy.channel_id,
                    server_id = %policy.server_id,
                    command = command.name(),
                    enabled = policy.enabled,
                    delay_minutes = policy.delay_minutes,
                    "channel policy updated"
                );
                policy
            },
        };

        self.reply(&event.channel_id, &confirmation(command, &policy))
            .await;
        Ok(CommandOutcome::Applied { command, policy })
    }

    async fn reply(&self, channel_id: &str, text: &str) {
        if let Err(e) = self.gateway.send_notice(channel_id, text).await {
            warn!(channel_id, error = %e, "failed to send command reply");
        }
    }
}

fn apply(policy: &mut ChannelPolicy, command: PolicyCommand) {
    match command {
        PolicyCommand::Enable { minutes } => policy.enable(minutes),
        PolicyCommand::Disable => policy.disable(),
        PolicyCommand::Set { minutes } => policy.set_delay(minutes),
        PolicyCommand::Status => {},
    }
}

fn confirmation(command: PolicyCommand, policy: &ChannelPolicy) -> String {
    match command {
        PolicyCommand::Enable { .. } => format!(
            "Auto-delete enabled for this channel (deleting after {} minutes)",
            policy.delay_minutes
        ),
        PolicyCommand::Disable => "Auto-delete disabled for this channel".to_string(),
        PolicyCommand::Set { .. } => {
            format!("Auto-delete time updated to {} minutes", policy.delay_minutes)
        },
        PolicyCommand::Status => format!(
            "Auto-delete is {} for this channel (delay: {} minutes)",
            if policy.enabled {
                "enabled"
            } else {
                "disabled"
            },
            policy.delay_minutes
        ),
    }
}
