mod config_commands;
mod db_commands;
mod policy_commands;

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "autodelete",
    about = "Deletes Discord channel messages after a per-channel delay"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Custom config directory (overrides default ~/.config/autodelete/).
    #[arg(long, global = true, env = "AUTODELETE_CONFIG_DIR")]
    config_dir: Option<std::path::PathBuf>,
    /// Custom data directory (overrides default data dir).
    #[arg(long, global = true, env = "AUTODELETE_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and run the bot (default when no subcommand is provided).
    Run,
    /// Database management (migrate, reset).
    Db {
        #[command(subcommand)]
        action: db_commands::DbAction,
    },
    /// Inspect or edit channel policies without the bot running.
    Policy {
        #[command(subcommand)]
        action: policy_commands::PolicyAction,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

async fn run_bot() -> anyhow::Result<()> {
    let config = autodelete_config::discover_and_load();

    autodelete_metrics::init_metrics(autodelete_metrics::MetricsRecorderConfig {
        enabled: config.metrics.enabled,
        listen: config.metrics.listen.clone(),
        global_labels: vec![("service".into(), "autodelete".into())],
    })
    .context("failed to start metrics recorder")?;

    autodelete_gateway::start_bot(config).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "autodelete starting");

    // Directory overrides must land before any config or database path is resolved.
    if let Some(ref dir) = cli.config_dir {
        autodelete_config::set_config_dir(dir.clone());
    }
    if let Some(ref dir) = cli.data_dir {
        autodelete_config::set_data_dir(dir.clone());
    }

    match cli.command {
        None | Some(Commands::Run) => run_bot().await,
        Some(Commands::Db { action }) => db_commands::handle_db(action).await,
        Some(Commands::Policy { action }) => policy_commands::handle_policy(action).await,
        Some(Commands::Config { action }) => config_commands::handle_config(action),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, clap::CommandFactory};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["autodelete"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "info");
        assert!(!cli.json_logs);
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "autodelete",
            "policy",
            "list",
            "--log-level",
            "debug",
            "--json-logs",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Policy { .. })));
        assert_eq!(cli.log_level, "debug");
        assert!(cli.json_logs);
    }
}
