//! Configuration loading and management
//!
//! Handles parsing of the optional `.orgtask.toml` file in the data root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::audit::DEFAULT_PREVIEW_LEN;
use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;

/// Config file name, looked up in the data root
pub const CONFIG_FILE: &str = ".orgtask.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Actor configuration
    #[serde(default)]
    pub actor: ActorConfig,

    /// Task defaults
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Audit rendering and paging
    #[serde(default)]
    pub audit: AuditConfig,

    /// Store tuning
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Actor-related configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActorConfig {
    /// Username to act as when none is given on the command line
    #[serde(default)]
    pub default: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Category assigned by `create_task` when the request has none
    #[serde(default = "default_category")]
    pub default_category: String,
}

fn default_category() -> String {
    "Work".to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_category: default_category(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Characters of a description kept in a diff clause before "..."
    #[serde(default = "default_preview_len")]
    pub description_preview_len: usize,

    /// Entries shown by `audit log` when no limit is given (0 = all)
    #[serde(default = "default_audit_limit")]
    pub default_limit: usize,
}

fn default_preview_len() -> usize {
    DEFAULT_PREVIEW_LEN
}

fn default_audit_limit() -> usize {
    50
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            description_preview_len: default_preview_len(),
            default_limit: default_audit_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// How long to wait for a registry lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a `.orgtask.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data root, or return defaults
    pub fn load_from_root(root: &Path) -> Self {
        let config_path = Self::path_in(root);
        if config_path.exists() {
            match Self::load(&config_path) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    pub fn path_in(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.tasks.default_category.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "tasks.default_category cannot be empty".to_string(),
            ));
        }
        if self.audit.description_preview_len == 0 {
            return Err(Error::InvalidConfig(
                "audit.description_preview_len must be >= 1".to_string(),
            ));
        }
        if self.storage.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.actor.default, "");
        assert_eq!(cfg.tasks.default_category, "Work");
        assert_eq!(cfg.audit.description_preview_len, 20);
        assert_eq!(cfg.audit.default_limit, 50);
        assert_eq!(cfg.storage.lock_timeout_ms, 5000);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[actor]
default = "elon"

[tasks]
default_category = "Personal"

[audit]
description_preview_len = 8
default_limit = 0

[storage]
lock_timeout_ms = 250
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.actor.default, "elon");
        assert_eq!(cfg.tasks.default_category, "Personal");
        assert_eq!(cfg.audit.description_preview_len, 8);
        assert_eq!(cfg.audit.default_limit, 0);
        assert_eq!(cfg.storage.lock_timeout_ms, 250);
    }

    #[test]
    fn invalid_values_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[audit]\ndescription_preview_len = 0\n").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_from_root_defaults_when_missing_or_invalid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from_root(dir.path());
        assert_eq!(cfg.tasks.default_category, "Work");

        fs::write(Config::path_in(dir.path()), "[tasks]\ndefault_category = \"\"\n")
            .expect("write config");
        let cfg = Config::load_from_root(dir.path());
        assert_eq!(cfg.tasks.default_category, "Work");
    }

    #[test]
    fn save_writes_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        Config::default().save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("default_category = \"Work\""));
    }
}
