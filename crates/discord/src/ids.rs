//! Snowflake id conversion.

use serenity::all::{ChannelId, GuildId, MessageId, UserId};

use autodelete_channels::{Error, Result};

/// Parse a decimal snowflake. Zero is rejected; serenity ids must be non-zero.
pub fn parse_snowflake(kind: &str, raw: &str) -> Result<u64> {
    let id: u64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::invalid_input(format!("{kind} id {raw:?} is not a snowflake")))?;
    if id == 0 {
        return Err(Error::invalid_input(format!("{kind} id must be non-zero")));
    }
    Ok(id)
}

pub fn channel_id(raw: &str) -> Result<ChannelId> {
    parse_snowflake("channel", raw).map(ChannelId::new)
}

pub fn message_id(raw: &str) -> Result<MessageId> {
    parse_snowflake("message", raw).map(MessageId::new)
}

pub fn guild_id(raw: &str) -> Result<GuildId> {
    parse_snowflake("guild", raw).map(GuildId::new)
}

pub fn user_id(raw: &str) -> Result<UserId> {
    parse_snowflake("user", raw).map(UserId::new)
}
