//! Settings schema structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub cache: CacheSettings,
    pub watcher: WatcherSettings,
    pub repository: RepositorySettings,
}

/// Refresh timing of each configuration cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Delay between refresh cycles (default: 10000)
    pub update_interval_ms: u64,
    /// Pause before each cycle so change notifications can settle (default: 250)
    pub settle_delay_ms: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            update_interval_ms: 10_000,
            settle_delay_ms: 250,
        }
    }
}

impl CacheSettings {
    /// Short timings for tests
    pub fn fast() -> Self {
        Self {
            update_interval_ms: 100,
            settle_delay_ms: 5,
        }
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Filesystem watcher used by `sitecfg watch`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherSettings {
    pub enabled: bool,
    /// Debounce window for filesystem events (default: 200)
    pub debounce_ms: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 200,
        }
    }
}

impl WatcherSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySettings {
    /// Directory served by the filesystem repository
    pub root: Option<PathBuf>,
}
