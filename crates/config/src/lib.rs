//! Configuration loading, validation, and env substitution.
//!
//! Config files: `autodelete.toml`, `autodelete.yaml`, or `autodelete.json`
//! Searched in `./` then `~/.config/autodelete/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{
        apply_env_overrides, config_dir, data_dir, discover_and_load, find_config_file,
        load_config, set_config_dir, set_data_dir,
    },
    schema::{
        AutodeleteConfig, CommandsConfig, DatabaseConfig, DiscordConfig, MetricsConfig,
        PolicyDefaults, SchedulerConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
