//! Discord event handler for serenity.
//!
//! Implements the EventHandler trait to receive and forward Discord events.

use std::sync::Arc;

use {
    serenity::{
        all::{Context, EventHandler, GatewayIntents, GuildId, Message, Ready},
        async_trait,
    },
    tracing::{debug, info},
};

use {
    autodelete_channels::MessageSink,
    autodelete_common::{MessageEvent, SelfIdentity},
};

/// Handler for Discord gateway events.
pub struct DiscordHandler {
    identity: SelfIdentity,
    sink: Arc<dyn MessageSink>,
}

impl DiscordHandler {
    pub fn new(identity: SelfIdentity, sink: Arc<dyn MessageSink>) -> Self {
        Self { identity, sink }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
    }
}

/// Convert a serenity message into the platform-neutral event.
pub fn message_event(msg: &Message) -> MessageEvent {
    MessageEvent {
        id: msg.id.to_string(),
        channel_id: msg.channel_id.to_string(),
        server_id: msg.guild_id.map(|g| g.to_string()),
        author_id: msg.author.id.to_string(),
        text: msg.content.clone(),
        is_bot: msg.author.bot,
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            bot_id = %ready.user.id,
            guilds = ready.guilds.len(),
            "discord bot ready"
        );
        self.identity.set(ready.user.id.to_string());
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        self.sink.dispatch(message_event(&msg)).await;
    }

    async fn cache_ready(&self, _ctx: Context, guilds: Vec<GuildId>) {
        debug!(guild_count = guilds.len(), "discord cache ready");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_include_message_content() {
        let intents = DiscordHandler::intents();
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(intents.contains(GatewayIntents::GUILD_MESSAGES));
        assert!(!intents.contains(GatewayIntents::DIRECT_MESSAGES));
    }
}
