//! Configuration types and loading.
//!
//! [`InstructConfig`] is assembled from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. `.instruct/config.yaml`
//! 3. `INSTRUCT_*` environment variables, with `__` separating nested keys
//!    and `_` standing for `-` (`INSTRUCT_ENGINE__MAX_RESTARTS=8`)

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use instruct_engine::EngineSettings;
use instruct_table::TableSyntax;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the config file inside `.instruct/`.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "INSTRUCT_";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to write config file: {0}")]
    WriteError(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    #[error("no .instruct directory found")]
    InstructDirNotFound,
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

fn default_rules_dir() -> PathBuf {
    PathBuf::from("rules")
}

/// Project configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstructConfig {
    /// Directory holding decision-table sheets, relative to the project root
    /// unless absolute.
    #[serde(default = "default_rules_dir")]
    pub rules_dir: PathBuf,

    /// Marker and placeholder literals used by the tables.
    #[serde(default)]
    pub table: TableSyntax,

    /// Forward-chaining engine settings.
    #[serde(default)]
    pub engine: EngineSettings,

    /// Emit JSON output by default.
    #[serde(default)]
    pub json: bool,
}

impl Default for InstructConfig {
    fn default() -> Self {
        Self {
            rules_dir: default_rules_dir(),
            table: TableSyntax::default(),
            engine: EngineSettings::default(),
            json: false,
        }
    }
}

impl InstructConfig {
    /// Resolves [`InstructConfig::rules_dir`] against the project root.
    pub fn rules_path(&self, project_root: &Path) -> PathBuf {
        if self.rules_dir.is_absolute() {
            self.rules_dir.clone()
        } else {
            project_root.join(&self.rules_dir)
        }
    }
}

/// Defaults layered with the given YAML file (if it exists) only.
fn file_figment(config_path: &Path) -> Figment {
    Figment::from(Serialized::defaults(InstructConfig::default())).merge(Yaml::file(config_path))
}

/// Maps `INSTRUCT_ENGINE__MAX_RESTARTS` to `engine.max-restarts`.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| key.as_str().replace("__", ".").replace('_', "-").into())
}

/// Loads configuration from `instruct_dir/config.yaml` and the environment.
///
/// A missing or empty file yields the defaults.
pub fn load_config(instruct_dir: &Path) -> Result<InstructConfig> {
    let config_path = instruct_dir.join(CONFIG_FILE_NAME);
    file_figment(&config_path)
        .merge(env_provider())
        .extract()
        .map_err(|e| ConfigError::Invalid(Box::new(e)))
}

/// Loads configuration when no `.instruct/` directory exists: defaults and
/// environment only.
pub fn load_default_config() -> Result<InstructConfig> {
    Figment::from(Serialized::defaults(InstructConfig::default()))
        .merge(env_provider())
        .extract()
        .map_err(|e| ConfigError::Invalid(Box::new(e)))
}

/// Loads only the file layer, ignoring the environment.
pub fn load_config_file(config_path: &Path) -> Result<InstructConfig> {
    file_figment(config_path)
        .extract()
        .map_err(|e| ConfigError::Invalid(Box::new(e)))
}

/// Saves configuration to `instruct_dir/config.yaml`.
pub fn save_config(instruct_dir: &Path, config: &InstructConfig) -> Result<()> {
    let content = serde_yaml::to_string(config)?;
    std::fs::write(instruct_dir.join(CONFIG_FILE_NAME), content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_file(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, InstructConfig::default());
        assert_eq!(config.rules_dir, PathBuf::from("rules"));
        assert!(config.engine.ignore_fact_changes);
        assert_eq!(config.engine.max_restarts, 64);
    }

    #[test]
    fn file_overrides_defaults_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "rules-dir: tables\ntable:\n  marker: TEMPLATE\nengine:\n  max-restarts: 8\n",
        )
        .unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.rules_dir, PathBuf::from("tables"));
        assert_eq!(config.table.marker, "TEMPLATE");
        assert_eq!(config.table.placeholder, "$value");
        assert_eq!(config.engine.max_restarts, 8);
        assert!(config.engine.ignore_fact_changes);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = InstructConfig {
            rules_dir: PathBuf::from("sheets"),
            json: true,
            ..InstructConfig::default()
        };
        save_config(dir.path(), &config).unwrap();
        let loaded = load_config_file(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn invalid_value_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "engine:\n  max-restarts: lots\n").unwrap();
        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn rules_path_resolves_relative_dirs() {
        let config = InstructConfig::default();
        assert_eq!(
            config.rules_path(Path::new("/srv/project")),
            PathBuf::from("/srv/project/rules")
        );
        let absolute = InstructConfig {
            rules_dir: PathBuf::from("/opt/rules"),
            ..InstructConfig::default()
        };
        assert_eq!(
            absolute.rules_path(Path::new("/srv/project")),
            PathBuf::from("/opt/rules")
        );
    }
}
