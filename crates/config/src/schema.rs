//! Config schema types (discord, database, commands, policy, scheduler, metrics).

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutodeleteConfig {
    pub discord: DiscordConfig,
    pub database: DatabaseConfig,
    pub commands: CommandsConfig,
    pub policy: PolicyDefaults,
    pub scheduler: SchedulerConfig,
    pub metrics: MetricsConfig,
}

/// Chat platform credentials.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,
}

impl DiscordConfig {
    /// True when no token has been configured.
    pub fn token_missing(&self) -> bool {
        self.token.expose_secret().trim().is_empty()
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
        }
    }
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Policy store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL. When unset, `autodelete.db` in the data dir is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// The configured URL, or a SQLite file under the data directory.
    pub fn resolved_url(&self) -> String {
        match &self.url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => {
                let path = crate::loader::data_dir().join("autodelete.db");
                format!("sqlite:{}?mode=rwc", path.display())
            },
        }
    }
}

/// Admin command surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// First token of every control command.
    pub prefix: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            prefix: "!autodelete".into(),
        }
    }
}

/// Defaults applied to newly created channel policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyDefaults {
    pub default_delay_minutes: u32,
}

impl Default for PolicyDefaults {
    fn default() -> Self {
        Self {
            default_delay_minutes: 2,
        }
    }
}

/// Deletion dispatcher tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// How long the dispatcher sleeps when nothing is queued.
    pub idle_poll_secs: u64,
    /// Upper bound on delete requests in flight at once.
    pub max_concurrent_deletes: usize,
    /// Record each pending deletion in the database before arming it.
    pub persist_pending: bool,
    /// Re-queue persisted pending deletions at startup.
    pub replay_pending_on_start: bool,
    /// Drop a channel's queued deletions when auto-delete is disabled there.
    pub cancel_pending_on_disable: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_poll_secs: 60,
            max_concurrent_deletes: 8,
            persist_pending: true,
            replay_pending_on_start: false,
            cancel_pending_on_disable: false,
        }
    }
}

/// Prometheus exporter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Address the `/metrics` listener binds to.
    pub listen: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: "127.0.0.1:9464".into(),
        }
    }
}
