//! Where ticklist keeps its files
//!
//! A `Config` names the data directory holding `todos.json` (and, on old
//! installs, `todos.txt`) plus an optional TUI log file. Values come from
//! built-in defaults, then `config.toml`, then `TICKLIST_*` environment
//! variables, each layer overriding the one before.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides the data directory
pub const DATA_DIR_ENV: &str = "TICKLIST_DATA_DIR";

/// Overrides the TUI log file; an empty value removes it
pub const LOG_FILE_ENV: &str = "TICKLIST_LOG_FILE";

/// Points at a config file other than the default one
pub const CONFIG_ENV: &str = "TICKLIST_CONFIG";

/// Name of the structured collection file inside the data directory
pub const TODOS_FILE: &str = "todos.json";

/// Name of the line-per-task file written by older releases
pub const LEGACY_FILE: &str = "todos.txt";

const APP_DIR: &str = "ticklist";

/// Resolved file locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the todo collection
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log file used by the TUI when TICKLIST_LOG is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_data_dir(default_data_dir())
    }
}

impl Config {
    /// A config rooted at `data_dir`, ignoring files and the environment
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_file: None,
        }
    }

    /// Load from [`Config::config_file_path`] with environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Like [`Config::load`], but `--config <path>` wins when given
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load `path` (defaults when it does not exist) and apply the environment
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let base = match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("Cannot read config file {}", path.display()))
            }
        };

        Ok(base.with_env_overrides(|name| std::env::var(name).ok()))
    }

    fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `TICKLIST_*` overrides read through `lookup`
    fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|dir| !dir.is_empty()) {
            self.data_dir = dir.into();
        }
        if let Some(log) = lookup(LOG_FILE_ENV) {
            self.log_file = (!log.is_empty()).then(|| log.into());
        }
        self
    }

    /// Write to [`Config::config_file_path`]
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Write as TOML to `path`, creating its directory
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Cannot encode config as TOML")?;
        std::fs::write(path, content)
            .with_context(|| format!("Cannot write config file {}", path.display()))
    }

    /// `$TICKLIST_CONFIG`, or `config.toml` in the platform config directory
    pub fn config_file_path() -> PathBuf {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => platform_dir(dirs::config_dir()).join("config.toml"),
        }
    }

    pub fn todos_path(&self) -> PathBuf {
        self.data_dir.join(TODOS_FILE)
    }

    pub fn legacy_path(&self) -> PathBuf {
        self.data_dir.join(LEGACY_FILE)
    }

    /// Where the TUI logs when no log file is configured
    pub fn default_log_path(&self) -> PathBuf {
        self.data_dir.join("debug.log")
    }
}

fn platform_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

fn default_data_dir() -> PathBuf {
    platform_dir(dirs::data_local_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_data_dir_is_app_specific() {
        let config = Config::default();
        assert!(config.data_dir.ends_with("ticklist"));
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_file_locations_follow_data_dir() {
        let config = Config::with_data_dir("/srv/tick");

        assert_eq!(config.todos_path(), PathBuf::from("/srv/tick/todos.json"));
        assert_eq!(config.legacy_path(), PathBuf::from("/srv/tick/todos.txt"));
        assert_eq!(config.default_log_path(), PathBuf::from("/srv/tick/debug.log"));
    }

    #[test]
    fn test_env_moves_data_dir() {
        let config = Config::with_data_dir("/from/file")
            .with_env_overrides(env_of(&[(DATA_DIR_ENV, "/from/env")]));
        assert_eq!(config.data_dir, PathBuf::from("/from/env"));

        // An empty value leaves the file's choice alone
        let config =
            Config::with_data_dir("/from/file").with_env_overrides(env_of(&[(DATA_DIR_ENV, "")]));
        assert_eq!(config.data_dir, PathBuf::from("/from/file"));
    }

    #[test]
    fn test_env_sets_and_clears_log_file() {
        let config = Config::with_data_dir("/d")
            .with_env_overrides(env_of(&[(LOG_FILE_ENV, "/tmp/tick.log")]));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/tick.log")));

        let cleared = config.with_env_overrides(env_of(&[(LOG_FILE_ENV, "")]));
        assert!(cleared.log_file.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(r#"log_file = "/var/log/tick.log""#).unwrap();

        assert_eq!(config.data_dir, default_data_dir());
        assert_eq!(config.log_file, Some(PathBuf::from("/var/log/tick.log")));
    }

    #[test]
    fn test_invalid_toml_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "data_dir = [").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("config.toml"));
    }

    #[test]
    fn test_saved_config_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let config = Config {
            data_dir: temp_dir.path().join("todos"),
            log_file: Some(temp_dir.path().join("tick.log")),
        };

        config.save_to_path(&path).unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();
        let reloaded = Config::from_toml(&saved).unwrap();

        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_unset_log_file_is_not_written() {
        let toml = toml::to_string_pretty(&Config::with_data_dir("/d")).unwrap();
        assert!(toml.contains("data_dir"));
        assert!(!toml.contains("log_file"));
    }
}
