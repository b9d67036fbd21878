//! Control command grammar.
//!
//! `<prefix> enable [minutes] | disable | set <minutes> | status`. Words after
//! the last expected argument are ignored. Sub-commands are case-sensitive.

use std::num::NonZeroU32;

/// A parsed, valid control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyCommand {
    /// Turn auto-delete on, optionally replacing the delay.
    Enable { minutes: Option<NonZeroU32> },
    Disable,
    /// Replace the delay without toggling.
    Set { minutes: NonZeroU32 },
    /// Report the current policy.
    Status,
}

impl PolicyCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enable { .. } => "enable",
            Self::Disable => "disable",
            Self::Set { .. } => "set",
            Self::Status => "status",
        }
    }

    /// True for commands that change stored state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Status)
    }
}

/// A control command that could not be parsed. Each variant maps to a
/// user-visible reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("missing or unknown sub-command")]
    Usage,
    #[error("set requires a minutes argument")]
    SetUsage,
    #[error("minutes must be a positive integer")]
    InvalidMinutes,
}

impl ParseError {
    /// Reply text posted back to the channel.
    pub fn reply(&self, prefix: &str) -> String {
        match self {
            Self::Usage => format!("Usage: {prefix} [enable|disable|set|status] [minutes]"),
            Self::SetUsage => format!("Usage: {prefix} set [minutes]"),
            Self::InvalidMinutes => {
                "Invalid minutes value. Please provide a positive number.".to_string()
            },
        }
    }
}

/// Parse `text` as a control command.
///
/// Returns `None` when the first word is not exactly `prefix`, i.e. the
/// message is ordinary chat.
pub fn parse_command(prefix: &str, text: &str) -> Option<Result<PolicyCommand, ParseError>> {
    let mut words = text.split_whitespace();
    if words.next() != Some(prefix) {
        return None;
    }

    let command = match words.next() {
        Some("enable") => words
            .next()
            .map(parse_minutes)
            .transpose()
            .map(|minutes| PolicyCommand::Enable { minutes }),
        Some("disable") => Ok(PolicyCommand::Disable),
        Some("set") => match words.next() {
            Some(arg) => parse_minutes(arg).map(|minutes| PolicyCommand::Set { minutes }),
            None => Err(ParseError::SetUsage),
        },
        Some("status") => Ok(PolicyCommand::Status),
        _ => Err(ParseError::Usage),
    };
    Some(command)
}

fn parse_minutes(arg: &str) -> Result<NonZeroU32, ParseError> {
    arg.parse::<u32>()
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or(ParseError::InvalidMinutes)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const PREFIX: &str = "!autodelete";

    fn minutes(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[rstest]
    #[case("!autodelete enable", PolicyCommand::Enable { minutes: None })]
    #[case("!autodelete enable 10", PolicyCommand::Enable { minutes: Some(minutes(10)) })]
    #[case("!autodelete disable", PolicyCommand::Disable)]
    #[case("!autodelete disable please", PolicyCommand::Disable)]
    #[case("!autodelete set 5", PolicyCommand::Set { minutes: minutes(5) })]
    #[case("  !autodelete   set   7  ", PolicyCommand::Set { minutes: minutes(7) })]
    #[case("!autodelete status", PolicyCommand::Status)]
    fn parses_valid_commands(#[case] input: &str, #[case] expected: PolicyCommand) {
        assert_eq!(parse_command(PREFIX, input), Some(Ok(expected)));
    }

    #[rstest]
    #[case("!autodelete", ParseError::Usage)]
    #[case("!autodelete frobnicate", ParseError::Usage)]
    #[case("!autodelete ENABLE", ParseError::Usage)]
    #[case("!autodelete set", ParseError::SetUsage)]
    #[case("!autodelete set 0", ParseError::InvalidMinutes)]
    #[case("!autodelete set -1", ParseError::InvalidMinutes)]
    #[case("!autodelete set abc", ParseError::InvalidMinutes)]
    #[case("!autodelete set 1.5", ParseError::InvalidMinutes)]
    #[case("!autodelete set 99999999999", ParseError::InvalidMinutes)]
    #[case("!autodelete enable 0", ParseError::InvalidMinutes)]
    #[case("!autodelete enable soon", ParseError::InvalidMinutes)]
    fn rejects_invalid_commands(#[case] input: &str, #[case] expected: ParseError) {
        assert_eq!(parse_command(PREFIX, input), Some(Err(expected)));
    }

    #[rstest]
    #[case("hello there")]
    #[case("")]
    #[case("!autodeleted enable")]
    #[case("please !autodelete enable")]
    #[case("!other set 5")]
    fn ignores_ordinary_messages(#[case] input: &str) {
        assert_eq!(parse_command(PREFIX, input), None);
    }

    #[test]
    fn custom_prefix() {
        assert_eq!(
            parse_command("!purge", "!purge disable"),
            Some(Ok(PolicyCommand::Disable))
        );
        assert_eq!(parse_command("!purge", "!autodelete disable"), None);
    }

    #[test]
    fn reply_texts() {
        assert_eq!(
            ParseError::Usage.reply(PREFIX),
            "Usage: !autodelete [enable|disable|set|status] [minutes]"
        );
        assert_eq!(
            ParseError::SetUsage.reply(PREFIX),
            "Usage: !autodelete set [minutes]"
        );
        assert_eq!(
            ParseError::InvalidMinutes.reply(PREFIX),
            "Invalid minutes value. Please provide a positive number."
        );
    }

    #[test]
    fn only_status_is_read_only() {
        assert!(!PolicyCommand::Status.is_mutation());
        assert!(PolicyCommand::Disable.is_mutation());
        assert_eq!(PolicyCommand::Set { minutes: minutes(1) }.name(), "set");
    }
}
