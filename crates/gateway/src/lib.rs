//! Gateway: routes inbound chat messages and owns the bot process lifecycle.
//!
//! Lifecycle:
//! 1. Validate config
//! 2. Open the shared SQLite pool and run every crate's migrations
//! 3. Wire stores, scheduler, command processor and router
//! 4. Connect to Discord and run until Ctrl-C
//! 5. Stop the scheduler and close the pool

pub mod error;
pub mod router;
pub mod server;

pub use {
    error::{Error, Result},
    router::{InboundRouter, Routed},
    server::{build_router, open_database, scheduler_options, start_bot},
};
