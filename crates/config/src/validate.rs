//! Configuration validation.
//!
//! Semantic checks over a loaded [`AutodeleteConfig`]. Errors are fatal at
//! startup; warnings are logged and ignored.

use std::fmt;

use secrecy::ExposeSecret;

use crate::schema::AutodeleteConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "scheduler.max_concurrent_deletes"
    pub path: &'static str,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Convert into an error listing every error-level diagnostic.
    pub fn into_result(self) -> crate::Result<Vec<Diagnostic>> {
        if !self.has_errors() {
            return Ok(self.diagnostics);
        }
        let summary = self
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(crate::Error::invalid(summary))
    }

    fn push(&mut self, severity: Severity, path: &'static str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path,
            message: message.into(),
        });
    }
}

/// Validate a loaded configuration.
pub fn validate(config: &AutodeleteConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if config.discord.token_missing() {
        result.push(
            Severity::Error,
            "discord.token",
            "bot token is not set (set DISCORD_BOT_TOKEN)",
        );
    } else if config.discord.token.expose_secret().contains("${") {
        result.push(
            Severity::Error,
            "discord.token",
            "token contains an unresolved ${...} placeholder",
        );
    }

    let prefix = config.commands.prefix.as_str();
    if prefix.trim().is_empty() {
        result.push(Severity::Error, "commands.prefix", "prefix must not be empty");
    } else if prefix.contains(char::is_whitespace) {
        // Commands are matched against the first word verbatim.
        result.push(
            Severity::Error,
            "commands.prefix",
            "prefix must be a single word with no surrounding whitespace",
        );
    }

    if config.policy.default_delay_minutes == 0 {
        result.push(
            Severity::Error,
            "policy.default_delay_minutes",
            "default delay must be at least 1 minute",
        );
    }

    if config.database.max_connections == 0 {
        result.push(
            Severity::Error,
            "database.max_connections",
            "at least one connection is required",
        );
    }

    if config.scheduler.max_concurrent_deletes == 0 {
        result.push(
            Severity::Error,
            "scheduler.max_concurrent_deletes",
            "at least one concurrent delete is required",
        );
    }

    if config.scheduler.idle_poll_secs == 0 {
        result.push(
            Severity::Warning,
            "scheduler.idle_poll_secs",
            "0 makes the idle dispatcher spin; using 1 second",
        );
    }

    if config.scheduler.replay_pending_on_start && !config.scheduler.persist_pending {
        result.push(
            Severity::Warning,
            "scheduler.replay_pending_on_start",
            "replay has no effect while persist_pending is off",
        );
    }

    if config.metrics.enabled && config.metrics.listen.parse::<std::net::SocketAddr>().is_err() {
        result.push(
            Severity::Error,
            "metrics.listen",
            format!("not a socket address: {}", config.metrics.listen),
        );
    }

    result
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::Secret};

    fn valid_config() -> AutodeleteConfig {
        let mut cfg = AutodeleteConfig::default();
        cfg.discord.token = Secret::new("token".into());
        cfg
    }

    #[test]
    fn default_with_token_is_valid() {
        let result = validate(&valid_config());
        assert!(!result.has_errors(), "{:?}", result.diagnostics);
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn missing_token_is_an_error() {
        let result = validate(&AutodeleteConfig::default());
        assert!(result.has_errors());
        assert!(result.diagnostics.iter().any(|d| d.path == "discord.token"));
    }

    #[test]
    fn unresolved_placeholder_token_is_an_error() {
        let mut cfg = valid_config();
        cfg.discord.token = Secret::new("${DISCORD_BOT_TOKEN}".into());
        assert!(validate(&cfg).has_errors());
    }

    #[test]
    fn zero_default_delay_is_an_error() {
        let mut cfg = valid_config();
        cfg.policy.default_delay_minutes = 0;
        let err = validate(&cfg).into_result().unwrap_err();
        assert!(err.to_string().contains("policy.default_delay_minutes"));
    }

    #[test]
    fn multi_word_prefix_is_an_error() {
        let mut cfg = valid_config();
        cfg.commands.prefix = "auto delete".into();
        assert!(validate(&cfg).has_errors());
    }

    #[test]
    fn padded_prefix_is_an_error() {
        for prefix in ["!autodelete ", " !autodelete", "!autodelete\n"] {
            let mut cfg = valid_config();
            cfg.commands.prefix = prefix.into();
            let result = validate(&cfg);
            assert!(result.has_errors(), "{prefix:?} should be rejected");
            assert_eq!(result.diagnostics[0].path, "commands.prefix");
        }
    }

    #[test]
    fn replay_without_persistence_warns() {
        let mut cfg = valid_config();
        cfg.scheduler.persist_pending = false;
        cfg.scheduler.replay_pending_on_start = true;
        let result = validate(&cfg);
        assert!(!result.has_errors());
        assert_eq!(result.count(Severity::Warning), 1);
    }

    #[test]
    fn bad_metrics_listen_only_matters_when_enabled() {
        let mut cfg = valid_config();
        cfg.metrics.listen = "nope".into();
        assert!(!validate(&cfg).has_errors());
        cfg.metrics.enabled = true;
        assert!(validate(&cfg).has_errors());
    }
}
