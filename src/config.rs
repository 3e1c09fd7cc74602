use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::categories::all_category_keys;
use crate::deleter::TrashFailurePolicy;
use crate::error::ConfigError;
use crate::utils;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grace_period_hours: f64,
    pub empty_recycle_bin: bool,
    pub targets: Vec<String>,
    pub dev_bloat_hunter: bool,
    pub search_paths: Vec<PathBuf>,
    pub max_scan_depth: usize,
    pub trash_failure: TrashFailurePolicy,
    pub extra_whitelist: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grace_period_hours: 24.0,
            empty_recycle_bin: true,
            targets: all_category_keys().into_iter().map(String::from).collect(),
            dev_bloat_hunter: false,
            search_paths: utils::home_dir().into_iter().collect(),
            max_scan_depth: 3,
            trash_failure: TrashFailurePolicy::Skip,
            extra_whitelist: Vec::new(),
        }
    }
}

impl Config {
    /// Grace period as a duration. Negative or non-finite hours mean no grace.
    pub fn grace_period(&self) -> Duration {
        Duration::try_from_secs_f64(self.grace_period_hours * 3600.0).unwrap_or(Duration::ZERO)
    }
}

/// Source of the configuration an engine call runs with.
pub trait ConfigProvider: Send + Sync {
    fn config(&self) -> Config;
}

impl ConfigProvider for Config {
    fn config(&self) -> Config {
        self.clone()
    }
}

/// `<config dir>/tidysweep/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tidysweep").join("config.json"))
}

/// Read a config file. A missing file yields the defaults; missing keys are
/// filled from the defaults.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json).map_err(io_err)
}

/// File-backed provider. A corrupt or unreadable file falls back to the
/// defaults so a bad config never stops a scan.
#[derive(Debug)]
pub struct JsonConfigProvider {
    path: PathBuf,
    current: RwLock<Config>,
}

impl JsonConfigProvider {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = read_config(&path).unwrap_or_else(|e| {
            tracing::error!("Failed to load config: {e}");
            Config::default()
        });
        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file, keeping the current value on failure.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let fresh = read_config(&self.path)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        Ok(())
    }

    /// Replace the in-memory value without persisting it.
    pub fn set(&self, config: Config) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        write_config(&self.path, &self.config())
    }
}

impl ConfigProvider for JsonConfigProvider {
    fn config(&self) -> Config {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
