//! Configuration loading and management
//!
//! Handles parsing of `todopad.toml` in the data directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::kv;
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::store::DEFAULT_TASKS_KEY;
use crate::task::{Category, Priority};

/// Name of the configuration file inside the data directory
pub const CONFIG_FILE: &str = "todopad.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the task list is stored
    #[serde(default)]
    pub storage: StorageConfig,

    /// Values new tasks start with
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key the whole task list is written under
    #[serde(default = "default_key")]
    pub key: String,

    /// How long a write waits for another writer's lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_key() -> String {
    DEFAULT_TASKS_KEY.to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub category: Category,

    #[serde(default)]
    pub priority: Priority,
}

impl Config {
    /// Load configuration from a `todopad.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory.
    ///
    /// A missing file yields defaults. An invalid file also yields defaults,
    /// together with a warning describing what was ignored.
    pub fn load_from_dir(dir: &Path) -> (Self, Option<String>) {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return (Self::default(), None);
        }
        match Self::load(&config_path) {
            Ok(config) => (config, None),
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                let warning = format!(
                    "ignoring {}: {err}; using default settings",
                    config_path.display()
                );
                (Self::default(), Some(warning))
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        kv::validate_key(self.storage.key.trim())
            .map_err(|err| Error::InvalidConfig(format!("storage.key: {err}")))?;
        if self.storage.key.trim() != self.storage.key {
            return Err(Error::InvalidConfig(
                "storage.key cannot have surrounding whitespace".to_string(),
            ));
        }
        Ok(())
    }
}

/// Platform data directory (`~/.local/share/todopad` on Linux)
pub fn default_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "todopad").map(|dirs| dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.storage.key, "tasks");
        assert_eq!(cfg.defaults.category, Category::Work);
        assert_eq!(cfg.defaults.priority, Priority::Medium);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[storage]
key = "todo-list"

[defaults]
category = "Personal"
priority = "High"
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.storage.key, "todo-list");
        assert_eq!(cfg.defaults.category, Category::Personal);
        assert_eq!(cfg.defaults.priority, Priority::High);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[defaults]\npriority = \"Low\"\n").expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.storage.key, "tasks");
        assert_eq!(cfg.defaults.category, Category::Work);
        assert_eq!(cfg.defaults.priority, Priority::Low);
    }

    #[test]
    fn invalid_storage_key_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[storage]\nkey = \"../outside\"\n").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_priority_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[defaults]\npriority = \"Urgent\"\n").expect("write config");

        assert!(matches!(Config::load(&path), Err(Error::TomlParse(_))));
    }

    #[test]
    fn load_from_dir_defaults_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (cfg, warning) = Config::load_from_dir(dir.path());
        assert_eq!(cfg.storage.key, "tasks");
        assert_eq!(cfg.storage.lock_timeout_ms, DEFAULT_LOCK_TIMEOUT_MS);
        assert!(warning.is_none());
    }

    #[test]
    fn load_from_dir_reports_invalid_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(CONFIG_FILE), r#"[storage]
key = "my tasks"
"#)
            .expect("write config");

        let (cfg, warning) = Config::load_from_dir(dir.path());
        assert_eq!(cfg.storage.key, "tasks");
        let warning = warning.expect("warning for invalid config");
        assert!(warning.contains(CONFIG_FILE));
        assert!(warning.contains("storage.key"));
    }

    #[test]
    fn save_writes_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        Config::default().save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("key = \"tasks\""));
        assert!(written.contains("category = \"Work\""));
        assert!(written.contains("priority = \"Medium\""));
    }
}
