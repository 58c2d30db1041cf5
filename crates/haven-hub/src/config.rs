//! Hub Configuration - module switches, timings and file locations
//!
//! Loaded from RON. Every field has a default, so an empty document `()`
//! is a valid configuration.
//!
//! ```ron
//! (
//!     restrictions: (
//!         enabled: true,
//!         sweep_interval_secs: 10,
//!         playtime_policy: Session,
//!     ),
//!     zones: (
//!         confirm_window_secs: 30,
//!         bypass_after_playtime: 7200,
//!     ),
//!     paths: (
//!         catalog: "restrictions.ron",
//!         zones: "zones.ron",
//!         database: Some("haven.db"),
//!     ),
//! )
//! ```

use crate::error::{Error, Result};
use haven_core::DEFAULT_CONFIRM_WINDOW_SECS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where default-restriction windows get their elapsed time from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaytimePolicy {
    /// Each player's own accumulated play time
    #[default]
    Session,
    /// Time since the server started, shared by everyone
    ServerUptime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestrictionsConfig {
    pub enabled: bool,
    pub sweep_interval_secs: u64,
    pub playtime_policy: PlaytimePolicy,
}

impl Default for RestrictionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_interval_secs: 10,
            playtime_policy: PlaytimePolicy::Session,
        }
    }
}

impl RestrictionsConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonesConfig {
    pub enabled: bool,
    pub confirm_window_secs: i64,
    /// Seconds of play time after which zone rules stop applying; 0 disables
    pub bypass_after_playtime: i64,
    /// Radius used by `zone add <name>` when none is given
    pub default_radius: f64,
}

impl Default for ZonesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            confirm_window_secs: DEFAULT_CONFIRM_WINDOW_SECS,
            bypass_after_playtime: 0,
            default_radius: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub catalog: PathBuf,
    pub zones: PathBuf,
    /// native_db file; `None` keeps player restrictions in memory only
    pub database: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("restrictions.ron"),
            zones: PathBuf::from("zones.ron"),
            database: None,
        }
    }
}

/// Configuration for the hub
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub restrictions: RestrictionsConfig,
    pub zones: ZonesConfig,
    pub paths: PathsConfig,
}

impl HubConfig {
    /// Parse a RON document
    pub fn from_ron(content: &str) -> Result<Self> {
        let config: HubConfig = haven_script::ron_options()
            .from_str(content)
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_ron(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.zones.confirm_window_secs <= 0 {
            return Err(Error::Config(
                "zones.confirm_window_secs must be positive".to_string(),
            ));
        }
        if self.zones.bypass_after_playtime < 0 {
            return Err(Error::Config(
                "zones.bypass_after_playtime must not be negative".to_string(),
            ));
        }
        if !(self.zones.default_radius > 0.0 && self.zones.default_radius <= haven_core::zone::MAX_RADIUS) {
            return Err(Error::Config(format!(
                "zones.default_radius must be in (0, {}]",
                haven_core::zone::MAX_RADIUS
            )));
        }
        Ok(())
    }
}
