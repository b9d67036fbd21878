//! Shared types, error definitions, and utilities used across all autodelete crates.

pub mod error;
pub mod types;

pub use {
    error::FromMessage,
    types::{MessageEvent, SelfIdentity, now_ms},
};
