//! `pypeline config` - inspect or create the configuration file.

use std::path::PathBuf;

use serde_json::json;

use crate::{
    cli::ConfigCommands,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
///
/// `explicit` is the `--config` path, which `init` writes to instead of the
/// user config location.
pub fn execute(
    cmd: ConfigCommands,
    explicit: Option<PathBuf>,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = lookup(&config, &key)?;
            if !output.report(&json!({ "key": key, "value": value }))? {
                output.print(&value)?;
            }
        }

        ConfigCommands::List => {
            if !output.report(&config)? {
                output.header("Effective configuration:")?;
                output.print(&render(&config)?)?;
            }
        }

        ConfigCommands::Path => {
            let path = explicit.unwrap_or_else(AppConfig::config_path);
            if !output.report(&json!({ "path": path }))? {
                output.print(&path.display().to_string())?;
            }
        }

        ConfigCommands::Init { force } => {
            let path = explicit.unwrap_or_else(AppConfig::config_path);
            if path.exists() && !force {
                output.warning(&format!(
                    "Config already exists at {} (use --force to overwrite)",
                    path.display()
                ))?;
                return Ok(());
            }
            write_default(&path)?;
            if !output.report(&json!({ "path": path, "written": true }))? {
                output.success(&format!("Configuration created at {}", path.display()))?;
            }
        }
    }

    Ok(())
}

fn lookup(config: &AppConfig, key: &str) -> CliResult<String> {
    config.get(key).ok_or_else(|| CliError::ConfigError {
        message: format!("Unknown config key: '{key}'"),
        source: None,
    })
}

fn render(config: &AppConfig) -> CliResult<String> {
    toml::to_string_pretty(config).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise config: {e}"),
        source: Some(Box::new(e)),
    })
}

fn write_default(path: &std::path::Path) -> CliResult<()> {
    let body = render(&AppConfig::default())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_cli_context(|| format!("Failed to create config directory '{}'", parent.display()))?;
    }
    std::fs::write(path, body)
        .with_cli_context(|| format!("Failed to write config to '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lookup_known_and_unknown_keys() {
        let cfg = AppConfig::default();
        assert_eq!(lookup(&cfg, "defaults.license").unwrap(), "MIT");
        let err = lookup(&cfg, "does.not.exist").unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn written_default_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");
        write_default(&path).unwrap();

        let loaded = AppConfig::load(Some(&path), true).unwrap();
        assert_eq!(loaded.defaults.license, "MIT");
        assert_eq!(
            loaded.dependencies.defaults,
            AppConfig::default().dependencies.defaults
        );
    }
}
