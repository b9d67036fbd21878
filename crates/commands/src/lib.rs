//! Admin control commands.
//!
//! Messages whose first word is the control prefix (`!autodelete` by default)
//! are parsed into a [`PolicyCommand`], authorized, applied to the channel's
//! policy and answered with a short confirmation in the same channel.

pub mod error;
pub mod parse;
pub mod processor;

pub use {
    error::{Error, Result},
    parse::{ParseError, PolicyCommand, parse_command},
    processor::{CommandOutcome, IgnoreReason, PolicyCommandProcessor},
};

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "!autodelete";
