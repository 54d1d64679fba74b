//! Runtime configuration model.
//!
//! Plain data with serde defaults. Loading from disk and CLI overrides live in
//! the binary's bootstrap layer.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::companion::{DEFAULT_FILES_DIR, DEFAULT_IMAGE_PUSH_PATH, DEFAULT_PACKAGE};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub sync: TimingConfig,
    pub adb: AdbConfig,
    pub companion: CompanionConfig,
    pub monitor: MonitorConfig,
    pub storage: StorageConfig,
}

/// Loop cadence and suppression windows, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_ms: u64,
    pub echo_window_ms: u64,
    pub global_debounce_ms: u64,
    pub capture_timeout_ms: u64,
    pub capture_poll_ms: u64,
    pub push_timeout_ms: u64,
    pub queue_capacity: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 500,
            echo_window_ms: 3_000,
            global_debounce_ms: 1_000,
            capture_timeout_ms: 5_000,
            capture_poll_ms: 250,
            push_timeout_ms: 10_000,
            queue_capacity: 256,
        }
    }
}

impl TimingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn echo_window(&self) -> Duration {
        Duration::from_millis(self.echo_window_ms)
    }

    pub fn global_debounce(&self) -> Duration {
        Duration::from_millis(self.global_debounce_ms)
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }

    pub fn capture_poll(&self) -> Duration {
        Duration::from_millis(self.capture_poll_ms.max(1))
    }

    pub fn push_timeout(&self) -> Duration {
        Duration::from_millis(self.push_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdbConfig {
    /// Path or name of the `adb` executable.
    pub binary: PathBuf,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("adb"),
        }
    }
}

/// Where the companion app lives on the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    pub package: String,
    pub files_dir: String,
    pub image_push_path: String,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            files_dir: DEFAULT_FILES_DIR.to_string(),
            image_push_path: DEFAULT_IMAGE_PUSH_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Appended after the built-in detection rules.
    pub extra_rules: Vec<ExtraRuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraRuleConfig {
    pub name: String,
    /// Every substring must be present in a log line for the rule to fire.
    pub contains: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Scratch directory for artifacts moving through `adb push`/`pull`.
    /// `None` lets the bootstrap pick one.
    pub work_dir: Option<PathBuf>,
}
