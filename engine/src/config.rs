use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use rubberstamp_types::ui::UiOptions;

use crate::state::{LossCheck, Rules};

const SEED_ENV: &str = "RUBBERSTAMP_SEED";
const PACE_ENV: &str = "RUBBERSTAMP_PACE";

/// `~/.rubberstamp/config.toml`. Every section is optional.
///
/// ```toml
/// [app]
/// tui = "full"
/// ascii_only = false
/// high_contrast = false
/// reduced_motion = false
///
/// [simulation]
/// seed = 42
/// pace = 1.0
/// loss_check = "immediate"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct RubberstampConfig {
    pub app: Option<AppConfig>,
    pub simulation: Option<SimulationConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    pub tui: Option<String>,
    /// Use ASCII-only glyphs for icons and spinners.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Freeze spinners.
    #[serde(default)]
    pub reduced_motion: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SimulationConfig {
    /// Fixed seed for a reproducible card stream. Random when absent.
    pub seed: Option<u64>,
    /// Multiplier on spawn delays. `0.5` plays twice as fast.
    pub pace: Option<f64>,
    #[serde(default)]
    pub loss_check: LossCheck,
}

impl RubberstampConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from an explicit path. A missing file is `Ok(None)`.
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

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.app
            .as_ref()
            .map(|app| UiOptions {
                ascii_only: app.ascii_only,
                high_contrast: app.high_contrast,
                reduced_motion: app.reduced_motion,
            })
            .unwrap_or_default()
    }

    /// Seed from `RUBBERSTAMP_SEED`, falling back to `[simulation] seed`.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        env::var(SEED_ENV)
            .ok()
            .and_then(|raw| parse_env_seed(&raw))
            .or_else(|| self.simulation.as_ref().and_then(|sim| sim.seed))
    }

    /// Pace from `RUBBERSTAMP_PACE`, falling back to `[simulation] pace`.
    /// Invalid values fall back to real time.
    #[must_use]
    pub fn rules(&self) -> Rules {
        let configured = env::var(PACE_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .or_else(|| self.simulation.as_ref().and_then(|sim| sim.pace));
        let pace = match configured {
            Some(pace) if pace.is_finite() && pace > 0.0 => pace,
            Some(pace) => {
                tracing::warn!("Ignoring invalid simulation pace {pace}; using 1.0");
                1.0
            }
            None => 1.0,
        };
        Rules {
            pace,
            loss_check: self
                .simulation
                .as_ref()
                .map(|sim| sim.loss_check)
                .unwrap_or_default(),
        }
    }
}

fn parse_env_seed(raw: &str) -> Option<u64> {
    match raw.trim().parse() {
        Ok(seed) => Some(seed),
        Err(err) => {
            tracing::warn!("Ignoring {SEED_ENV}={raw:?}: {err}");
            None
        }
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".rubberstamp").join("config.toml"))
}
