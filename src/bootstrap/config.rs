//! # Configuration loader
//!
//! Reads the TOML file into `SyncConfig` and layers CLI flags on top.
//! Missing keys fall back to the serde defaults of the model; no other
//! validation happens here.

use std::path::{Path, PathBuf};

use cl_core::config::StorageConfig;
use cl_core::SyncConfig;

use crate::cli::Cli;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// `<config dir>/cliplink/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cliplink").join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<SyncConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// An explicit path must exist. Without one, the default location is used
/// when present and built-in defaults otherwise.
pub fn resolve_config(explicit: Option<&Path>) -> Result<SyncConfig, ConfigError> {
    match explicit {
        Some(path) => load_config(path),
        None => match default_config_path() {
            Some(path) if path.is_file() => load_config(&path),
            _ => Ok(SyncConfig::default()),
        },
    }
}

/// Flags that override file values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub adb: Option<PathBuf>,
    pub tick_ms: Option<u64>,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            adb: cli.adb.clone(),
            tick_ms: cli.tick_ms,
        }
    }
}

impl CliOverrides {
    pub fn apply(&self, config: &mut SyncConfig) {
        if let Some(adb) = &self.adb {
            config.adb.binary = adb.clone();
        }
        if let Some(tick_ms) = self.tick_ms {
            config.sync.tick_ms = tick_ms.max(1);
        }
    }
}

/// Scratch directory for artifact transfers.
pub fn resolve_work_dir(storage: &StorageConfig) -> PathBuf {
    storage.work_dir.clone().unwrap_or_else(|| {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("cliplink")
    })
}
