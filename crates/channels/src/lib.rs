//! Chat platform collaborator interfaces.
//!
//! The retention core never talks to a platform directly. It deletes and
//! replies through [`ChannelGateway`] and checks permissions through
//! [`AdminAuthorizer`]; each platform adapter implements both and feeds
//! inbound messages to a [`MessageSink`].

pub mod auth;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod sink;

pub use {
    auth::AdminAuthorizer,
    error::{Error, Result},
    gateway::{ChannelGateway, DeleteError},
    memory::{RecordingGateway, StaticAuthorizer},
    sink::MessageSink,
};
