//! Metrics collection and export for autodelete.
//!
//! Components record through the `metrics` crate facade using the names in
//! [`definitions`]. When the `prometheus` feature is enabled and metrics are
//! switched on in config, [`init_metrics`] installs a Prometheus recorder that
//! serves `/metrics` on the configured address. Otherwise every macro call is
//! a no-op.

mod definitions;
mod error;
mod recorder;

pub use {
    definitions::*,
    error::{Error, Result},
    recorder::{MetricsRecorderConfig, init_metrics},
};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};
