//! Configuration for timerlab.
//!
//! ```toml
//! # ~/.timerlab/config.toml
//! [timers]
//! delay_ms = 1000      # producer delay
//! timeout_ms = 5000    # per-scenario budget
//! loop_limit = 10000   # max timers one advance_all may fire
//!
//! [app]
//! ascii_only = false   # [ok]/[FAIL]/[warn] instead of emoji
//! ```
//!
//! The file is optional. `TIMERLAB_CONFIG` points at a different file.

use serde::Deserialize;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use timerlab_types::{DEFAULT_DELAY, DEFAULT_LOOP_LIMIT, DEFAULT_SCENARIO_TIMEOUT};

pub const CONFIG_ENV_VAR: &str = "TIMERLAB_CONFIG";

#[derive(Debug, Default, Deserialize)]
pub struct TimerlabConfig {
    pub timers: Option<TimersConfig>,
    pub app: Option<AppConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimersConfig {
    /// Producer delay in milliseconds. Default: 1000.
    pub delay_ms: Option<u64>,
    /// Per-scenario timeout in milliseconds. Default: 5000. Must be non-zero.
    pub timeout_ms: Option<u64>,
    /// Timers a single `advance_all` may fire. Default: 10000. Must be non-zero.
    pub loop_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only markers in the report.
    #[serde(default)]
    pub ascii_only: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl TimerlabConfig {
    /// Load the config from the default location. `Ok(None)` if there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load the config at `path`. `Ok(None)` if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        Self::parse(&content, path).map(Some)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, err);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source: err,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

/// Resolved settings with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub delay: Duration,
    pub timeout: Duration,
    pub loop_limit: usize,
    pub ascii_only: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_SCENARIO_TIMEOUT,
            loop_limit: DEFAULT_LOOP_LIMIT,
            ascii_only: false,
        }
    }
}

impl Settings {
    pub fn from_config(config: Option<&TimerlabConfig>) -> Result<Self, ConfigError> {
        let mut settings = Settings::default();
        let Some(config) = config else {
            return Ok(settings);
        };

        if let Some(timers) = &config.timers {
            if let Some(delay_ms) = timers.delay_ms {
                settings.delay = Duration::from_millis(delay_ms);
            }
            if let Some(timeout_ms) = timers.timeout_ms {
                if timeout_ms == 0 {
                    return Err(ConfigError::Invalid {
                        field: "timers.timeout_ms",
                        reason: "must be greater than zero",
                    });
                }
                settings.timeout = Duration::from_millis(timeout_ms);
            }
            if let Some(loop_limit) = timers.loop_limit {
                if loop_limit == 0 {
                    return Err(ConfigError::Invalid {
                        field: "timers.loop_limit",
                        reason: "must be greater than zero",
                    });
                }
                settings.loop_limit = loop_limit;
            }
        }

        if let Some(app) = &config.app {
            settings.ascii_only = app.ascii_only;
        }

        if settings.delay >= settings.timeout {
            tracing::warn!(
                delay = ?settings.delay,
                timeout = ?settings.timeout,
                "Delay is not below the scenario timeout; the real-timer scenario will time out"
            );
        }

        Ok(settings)
    }
}

pub fn config_path() -> Option<PathBuf> {
    resolve_config_path(env::var_os(CONFIG_ENV_VAR), dirs::home_dir())
}

fn resolve_config_path(explicit: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(explicit) = explicit
        && !explicit.is_empty()
    {
        return Some(PathBuf::from(explicit));
    }
    home.map(|home| home.join(".timerlab").join("config.toml"))
}
