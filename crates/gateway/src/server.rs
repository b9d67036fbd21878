//! Bot process startup and shutdown.

use std::{sync::Arc, time::Duration};

use {
    anyhow::Context,
    secrecy::ExposeSecret,
    serenity::{Client, http::Http},
    sqlx::{SqlitePool, sqlite::SqlitePoolOptions},
    tracing::{info, warn},
};

use {
    autodelete_channels::{AdminAuthorizer, ChannelGateway, MessageSink},
    autodelete_commands::PolicyCommandProcessor,
    autodelete_common::SelfIdentity,
    autodelete_config::{AutodeleteConfig, DatabaseConfig, Severity},
    autodelete_discord::{DiscordAdminAuthorizer, DiscordGateway, DiscordHandler},
    autodelete_policy::{PolicyStore, SqlitePolicyStore},
    autodelete_scheduler::{
        DeletionScheduler, PendingDeletionStore, SchedulerOptions, SqlitePendingStore,
    },
};

use crate::router::InboundRouter;

/// Open the shared SQLite pool and run every crate's migrations.
pub async fn open_database(config: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    if config.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
        let dir = autodelete_config::data_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data dir {}", dir.display()))?;
    }

    let url = config.resolved_url();
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .connect(&url)
        .await
        .with_context(|| format!("failed to open policy database at {url}"))?;

    autodelete_policy::run_migrations(&pool)
        .await
        .context("failed to run policy migrations")?;
    autodelete_scheduler::run_migrations(&pool)
        .await
        .context("failed to run scheduler migrations")?;

    Ok(pool)
}

/// Scheduler runtime options derived from config.
pub fn scheduler_options(config: &AutodeleteConfig) -> SchedulerOptions {
    SchedulerOptions {
        idle_poll: Duration::from_secs(config.scheduler.idle_poll_secs.max(1)),
        max_concurrent_deletes: config.scheduler.max_concurrent_deletes,
        control_prefix: Some(config.commands.prefix.clone()),
        replay_pending: config.scheduler.replay_pending_on_start,
    }
}

/// Wire the retention core over the given collaborators.
pub fn build_router(
    config: &AutodeleteConfig,
    policies: Arc<dyn PolicyStore>,
    pending: Option<Arc<dyn PendingDeletionStore>>,
    gateway: Arc<dyn ChannelGateway>,
    authorizer: Arc<dyn AdminAuthorizer>,
    identity: SelfIdentity,
) -> InboundRouter {
    let scheduler = DeletionScheduler::with_options(
        Arc::clone(&policies),
        Arc::clone(&gateway),
        identity.clone(),
        pending,
        scheduler_options(config),
    );
    let commands = PolicyCommandProcessor::new(policies, gateway, authorizer, identity)
        .with_prefix(config.commands.prefix.clone())
        .with_default_delay(config.policy.default_delay_minutes);

    InboundRouter::new(commands, scheduler)
        .cancel_pending_on_disable(config.scheduler.cancel_pending_on_disable)
}

/// Run the bot until Ctrl-C or until the Discord connection fails.
///
/// Invalid config, an unreachable database, or a rejected Discord login are
/// fatal. Everything after startup is logged and survived.
pub async fn start_bot(config: AutodeleteConfig) -> anyhow::Result<()> {
    let report = autodelete_config::validate(&config);
    for diag in &report.diagnostics {
        if diag.severity == Severity::Warning {
            warn!(path = diag.path, "{}", diag.message);
        }
    }
    report.into_result().context("invalid configuration")?;

    let pool = open_database(&config.database).await?;

    let policies: Arc<dyn PolicyStore> = Arc::new(
        SqlitePolicyStore::with_pool(pool.clone())
            .default_delay_minutes(config.policy.default_delay_minutes),
    );
    let pending: Option<Arc<dyn PendingDeletionStore>> = if config.scheduler.persist_pending {
        Some(Arc::new(SqlitePendingStore::with_pool(pool.clone())))
    } else {
        None
    };

    let token = config.discord.token.expose_secret().clone();
    let http = Arc::new(Http::new(&token));
    let gateway: Arc<dyn ChannelGateway> = Arc::new(DiscordGateway::new(Arc::clone(&http)));
    let authorizer: Arc<dyn AdminAuthorizer> = Arc::new(DiscordAdminAuthorizer::new(http));

    let identity = SelfIdentity::new();
    let router = Arc::new(build_router(
        &config,
        policies,
        pending,
        gateway,
        authorizer,
        identity.clone(),
    ));
    let scheduler = Arc::clone(router.scheduler());

    let mut client = Client::builder(&token, DiscordHandler::intents())
        .event_handler(DiscordHandler::new(identity, router as Arc<dyn MessageSink>))
        .await
        .context("failed to build discord client")?;

    scheduler.start().await;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            return;
        }
        info!("shutdown requested");
        shard_manager.shutdown_all().await;
    });

    info!(prefix = %config.commands.prefix, "connecting to discord");
    let result = client.start().await.context("discord connection failed");

    scheduler.stop().await;
    pool.close().await;
    info!("autodelete stopped");
    result
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_options_follow_config() {
        let mut config = AutodeleteConfig::default();
        config.commands.prefix = "!purge".into();
        config.scheduler.idle_poll_secs = 0;
        config.scheduler.max_concurrent_deletes = 3;
        config.scheduler.replay_pending_on_start = true;

        let options = scheduler_options(&config);
        assert_eq!(options.idle_poll, Duration::from_secs(1));
        assert_eq!(options.max_concurrent_deletes, 3);
        assert_eq!(options.control_prefix.as_deref(), Some("!purge"));
        assert!(options.replay_pending);
    }

    #[tokio::test]
    async fn open_database_runs_all_migrations() {
        let config = DatabaseConfig {
            url: Some("sqlite::memory:".into()),
            max_connections: 1,
        };
        let pool = open_database(&config).await.unwrap();

        for table in ["channel_policies", "pending_deletions"] {
            let found: Option<(String,)> =
                sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                    .bind(table)
                    .fetch_optional(&pool)
                    .await
                    .unwrap();
            assert!(found.is_some(), "missing table {table}");
        }
    }

    #[tokio::test]
    async fn start_bot_rejects_missing_token() {
        let err = start_bot(AutodeleteConfig::default()).await.unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[tokio::test]
    async fn start_bot_rejects_padded_prefix() {
        let mut config = AutodeleteConfig::default();
        config.discord.token = secrecy::Secret::new("token".into());
        config.commands.prefix = "!autodelete ".into();

        let err = start_bot(config).await.unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));
        assert!(format!("{err:#}").contains("commands.prefix"));
    }
}
