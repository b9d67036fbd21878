use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    Error, Result,
    env_subst::substitute_env,
    error::Context,
    schema::AutodeleteConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "autodelete.toml",
    "autodelete.yaml",
    "autodelete.yml",
    "autodelete.json",
];

static CONFIG_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);
static DATA_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Override the user-global config directory (e.g. from `--config-dir`).
pub fn set_config_dir(dir: PathBuf) {
    *CONFIG_DIR_OVERRIDE
        .write()
        .unwrap_or_else(|e| e.into_inner()) = Some(dir);
}

/// Override the data directory (e.g. from `--data-dir`).
pub fn set_data_dir(dir: PathBuf) {
    *DATA_DIR_OVERRIDE.write().unwrap_or_else(|e| e.into_inner()) = Some(dir);
}

/// Returns the user-global config directory (`~/.config/autodelete/`).
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = CONFIG_DIR_OVERRIDE
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
    {
        return Some(dir);
    }
    directories::ProjectDirs::from("", "", "autodelete").map(|d| d.config_dir().to_path_buf())
}

/// Returns the data directory holding the default SQLite database.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = DATA_DIR_OVERRIDE
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
    {
        return dir;
    }
    directories::ProjectDirs::from("", "", "autodelete")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<AutodeleteConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./autodelete.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/autodelete/autodelete.{toml,yaml,yml,json}` (user-global)
///
/// Returns `AutodeleteConfig::default()` if no config file is found. Env
/// overrides are applied in every case.
pub fn discover_and_load() -> AutodeleteConfig {
    let config = match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            match load_config(&path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                    AutodeleteConfig::default()
                },
            }
        },
        None => {
            debug!("no config file found, using defaults");
            AutodeleteConfig::default()
        },
    };
    apply_env_overrides(config)
}

/// Apply well-known environment variables on top of a loaded config.
///
/// - `DISCORD_BOT_TOKEN` → `discord.token`
/// - `AUTODELETE_DATABASE_URL`, then `DATABASE_URL` → `database.url`
/// - `AUTODELETE_COMMAND_PREFIX` → `commands.prefix`
///
/// The command prefix is trimmed whichever source it came from.
pub fn apply_env_overrides(config: AutodeleteConfig) -> AutodeleteConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: AutodeleteConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> AutodeleteConfig {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(token) = non_empty("DISCORD_BOT_TOKEN") {
        config.discord.token = Secret::new(token);
    }
    if let Some(url) = non_empty("AUTODELETE_DATABASE_URL").or_else(|| non_empty("DATABASE_URL")) {
        config.database.url = Some(url);
    }
    if let Some(prefix) = non_empty("AUTODELETE_COMMAND_PREFIX") {
        config.commands.prefix = prefix;
    }
    config.commands.prefix = config.commands.prefix.trim().to_string();
    config
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    find_config_in(&dir)
}

fn find_config_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

fn parse_config(raw: &str, path: &Path) -> Result<AutodeleteConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat {
            extension: ext.to_string(),
        }),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::ExposeSecret};

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autodelete.toml");
        std::fs::write(
            &path,
            "[commands]\nprefix = \"!purge\"\n\n[policy]\ndefault_delay_minutes = 10\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.commands.prefix, "!purge");
        assert_eq!(cfg.policy.default_delay_minutes, 10);
    }

    #[test]
    fn loads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autodelete.yaml");
        std::fs::write(&path, "scheduler:\n  persist_pending: false\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert!(!cfg.scheduler.persist_pending);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autodelete.ini");
        std::fs::write(&path, "x=1").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/autodelete.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/autodelete.toml"));
    }

    #[test]
    fn finds_first_known_filename_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_config_in(dir.path()).is_none());
        std::fs::write(dir.path().join("autodelete.json"), "{}").unwrap();
        std::fs::write(dir.path().join("autodelete.toml"), "").unwrap();

        let found = find_config_in(dir.path()).unwrap();
        assert!(found.ends_with("autodelete.toml"));
    }

    #[test]
    fn env_overrides_replace_token_and_url() {
        let lookup = |name: &str| match name {
            "DISCORD_BOT_TOKEN" => Some("tok".to_string()),
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            _ => None,
        };
        let cfg = apply_env_overrides_with(AutodeleteConfig::default(), lookup);
        assert_eq!(cfg.discord.token.expose_secret(), "tok");
        assert_eq!(cfg.database.url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(cfg.commands.prefix, "!autodelete");
    }

    #[test]
    fn specific_database_url_beats_generic() {
        let lookup = |name: &str| match name {
            "AUTODELETE_DATABASE_URL" => Some("sqlite:a.db".to_string()),
            "DATABASE_URL" => Some("sqlite:b.db".to_string()),
            _ => None,
        };
        let cfg = apply_env_overrides_with(AutodeleteConfig::default(), lookup);
        assert_eq!(cfg.database.url.as_deref(), Some("sqlite:a.db"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let lookup = |_: &str| Some("  ".to_string());
        let mut base = AutodeleteConfig::default();
        base.commands.prefix = "!keep".into();
        let cfg = apply_env_overrides_with(base, lookup);
        assert_eq!(cfg.commands.prefix, "!keep");
        assert!(cfg.discord.token_missing());
    }

    #[test]
    fn command_prefix_is_trimmed() {
        let lookup = |name: &str| match name {
            "AUTODELETE_COMMAND_PREFIX" => Some("!purge ".to_string()),
            _ => None,
        };
        let cfg = apply_env_overrides_with(AutodeleteConfig::default(), lookup);
        assert_eq!(cfg.commands.prefix, "!purge");

        let mut base = AutodeleteConfig::default();
        base.commands.prefix = "  !fromfile\t".into();
        let cfg = apply_env_overrides_with(base, |_: &str| None);
        assert_eq!(cfg.commands.prefix, "!fromfile");
    }
}
