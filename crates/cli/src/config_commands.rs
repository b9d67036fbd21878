use {anyhow::Result, clap::Subcommand};

use autodelete_config::{AutodeleteConfig, Severity, ValidationResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors/warnings.
    Check,
    /// Print the effective configuration with the token redacted.
    Show,
}

pub fn handle_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Check => check(),
        ConfigAction::Show => {
            println!("{:#?}", autodelete_config::discover_and_load());
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check() -> Result<()> {
    let config = match autodelete_config::find_config_file() {
        Some(path) => {
            eprintln!("Checking {}\n", path.display());
            match autodelete_config::load_config(&path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("  {BOLD}{RED}error{RESET} {e}");
                    std::process::exit(1);
                },
            }
        },
        None => {
            eprintln!("No config file found; checking defaults.\n");
            AutodeleteConfig::default()
        },
    };
    let config = autodelete_config::apply_env_overrides(config);
    let result = autodelete_config::validate(&config);

    for line in render(&result) {
        eprintln!("{line}");
    }

    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

fn render(result: &ValidationResult) -> Vec<String> {
    let mut lines: Vec<String> = result
        .diagnostics
        .iter()
        .map(|d| {
            let (color, label) = match d.severity {
                Severity::Error => (RED, "error"),
                Severity::Warning => (YELLOW, "warning"),
            };
            format!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message)
        })
        .collect();

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    if !lines.is_empty() {
        lines.push(String::new());
    }
    if errors == 0 && warnings == 0 {
        lines.push("No issues found.".into());
    } else {
        lines.push(format!("{errors} error(s), {warnings} warning(s)"));
    }
    lines
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_reports_missing_token() {
        let result = autodelete_config::validate(&AutodeleteConfig::default());
        let lines = render(&result);
        assert!(lines.iter().any(|l| l.contains("discord.token")));
        assert!(lines.last().unwrap().starts_with("1 error(s)"));
    }

    #[test]
    fn clean_report() {
        let result = ValidationResult {
            diagnostics: Vec::new(),
        };
        assert_eq!(render(&result), vec!["No issues found.".to_string()]);
    }
}
