//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `PYPELINE_*` environment variables, `__` between nested keys
//!    (`PYPELINE_DEFAULTS__AUTHOR_NAME`)
//! 3. The file passed with `--config`
//! 4. `./.pypeline.toml`
//! 5. The user config file (see [`AppConfig::config_path`])
//! 6. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::global::OutputFormat;

const ENV_PREFIX: &str = "PYPELINE";
const LOCAL_CONFIG: &str = ".pypeline.toml";

/// Dependencies every new project starts with.
pub const DEFAULT_DEPENDENCIES: &[&str] = &[
    "snowflake-snowpark-python>=1.42.0",
    "pyspark>=4.0.1",
    "numpy>=2.3.4",
    "pandas>=2.3.3",
    "build==1.3.0",
    "twine==6.2.0",
    "ruff==0.14.9",
    "pre-commit==4.5.1",
    "pytest==9.0.2",
    "pytest-cov==7.0.0",
    "pytest-asyncio==1.3.0",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fallbacks for `init` fields not given on the command line.
    pub defaults: Defaults,
    pub output: OutputConfig,
    pub templates: TemplateConfig,
    pub dependencies: DependencyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub company_name: Option<String>,
    pub license: String,
    pub git: bool,
    pub destination: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            author_name: None,
            author_email: None,
            company_name: None,
            license: "MIT".into(),
            git: false,
            destination: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory whose files override the built-in templates.
    pub local_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    pub defaults: Vec<String>,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            defaults: DEFAULT_DEPENDENCIES.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Load configuration from every source in the resolution order.
    ///
    /// `explicit` is the `--config` path. It must exist when `require_explicit`
    /// is set.
    pub fn load(explicit: Option<&Path>, require_explicit: bool) -> anyhow::Result<Self> {
        let defaults = toml::to_string(&Self::default()).context("Failed to encode defaults")?;

        let mut builder = Config::builder().add_source(File::from_str(&defaults, FileFormat::Toml));

        let user = Self::config_path();
        debug!(path = %user.display(), "User config location");
        builder = builder
            .add_source(File::from(user).format(FileFormat::Toml).required(false))
            .add_source(File::from(PathBuf::from(LOCAL_CONFIG)).format(FileFormat::Toml).required(false));

        if let Some(path) = explicit {
            debug!(path = %path.display(), "Loading explicit config file");
            builder = builder.add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(require_explicit),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("dependencies.defaults")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Path to the user configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.pypeline.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "pypeline", "pypeline")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
    }

    /// Look up a dotted key (`defaults.license`) as display text.
    pub fn get(&self, key: &str) -> Option<String> {
        let tree = serde_json::to_value(self).ok()?;
        let value = key
            .split('.')
            .try_fold(&tree, |node, part| node.get(part))?;
        Some(match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_license_is_mit() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.defaults.license, "MIT");
        assert!(!cfg.defaults.git);
    }

    #[test]
    fn default_dependencies_are_seeded() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.dependencies.defaults.len(), DEFAULT_DEPENDENCIES.len());
        assert!(cfg.dependencies.defaults.iter().any(|d| d.starts_with("pandas")));
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[defaults]\nauthor_name = \"Jane Doe\"\ngit = true\n\n[dependencies]\ndefaults = [\"polars>=1.0\"]\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path), true).unwrap();
        assert_eq!(cfg.defaults.author_name.as_deref(), Some("Jane Doe"));
        assert!(cfg.defaults.git);
        assert_eq!(cfg.defaults.license, "MIT");
        assert_eq!(cfg.dependencies.defaults, vec!["polars>=1.0".to_string()]);
    }

    #[test]
    fn missing_explicit_file_is_an_error_only_when_required() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(&path), true).is_err());
        assert!(AppConfig::load(Some(&path), false).is_ok());
    }

    #[test]
    fn get_walks_dotted_keys() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.get("defaults.license").as_deref(), Some("MIT"));
        assert_eq!(cfg.get("defaults.git").as_deref(), Some("false"));
        assert_eq!(cfg.get("output.format").as_deref(), Some("auto"));
        assert!(cfg.get("defaults.nope").is_none());
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
