//! Discord adapter.
//!
//! [`DiscordGateway`] and [`DiscordAdminAuthorizer`] implement the platform
//! collaborator traits over serenity's REST client; [`DiscordHandler`] turns
//! gateway events into [`autodelete_common::MessageEvent`]s.

pub mod auth;
pub mod gateway;
pub mod handler;
pub mod ids;

pub use {
    auth::DiscordAdminAuthorizer,
    gateway::DiscordGateway,
    handler::DiscordHandler,
};
