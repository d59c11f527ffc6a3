//! Configuration loading and management
//!
//! Handles parsing of the `config.toml` file. Lookup order: `--config`,
//! `TT_CONFIG`, then the platform config directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::query::{FilterMode, HistorySort};

pub const CONFIG_ENV: &str = "TT_CONFIG";
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Directory holding the stored lists (default: platform data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Default views
    #[serde(default)]
    pub view: ViewConfig,

    /// Storage tuning
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewConfig {
    /// Filter used by `tt list` when none is given
    #[serde(default)]
    pub pending_filter: FilterMode,

    /// Sort key used by `tt history` when none is given
    #[serde(default)]
    pub history_sort: HistorySort,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// How long a save waits for the slot lock
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

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "todo-tracker")
}

/// Platform config file location, when the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Platform data directory, falling back to `./.tt` when unknown.
pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".tt"))
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|err| {
            crate::error::Error::InvalidConfig(format!("{}: {err}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, else from `TT_CONFIG`, else from the platform
    /// location. An explicitly named file must exist and parse; the platform
    /// file falls back to defaults when missing or invalid.
    pub fn resolve(path: Option<&Path>) -> crate::error::Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            if !env_path.trim().is_empty() {
                return Self::load(Path::new(env_path.trim()));
            }
        }
        Ok(default_config_path()
            .map(|path| Self::load_or_default(&path))
            .unwrap_or_default())
    }

    /// Load configuration, or return defaults when missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Data directory to use, given an optional override.
    pub fn data_dir(&self, cli_dir: Option<&Path>) -> PathBuf {
        cli_dir
            .map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(default_data_dir)
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.storage.lock_timeout_ms == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        if let Some(dir) = &self.data_dir {
            if dir.as_os_str().is_empty() {
                return Err(crate::error::Error::InvalidConfig(
                    "data_dir cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
