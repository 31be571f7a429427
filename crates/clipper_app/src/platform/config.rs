use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clipper_engine::{ClientSettings, EngineConfig, TrackerSettings};
use engine_logging::{engine_info, engine_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_FILENAME: &str = "clipper.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Settings loaded from `clipper.ron`. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipperConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub output_dir: PathBuf,
    pub log: LogDestination,
}

impl Default for ClipperConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            base_url: client.base_url,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            read_timeout_secs: client.read_timeout.as_secs(),
            poll_interval_ms: TrackerSettings::default().poll_interval.as_millis() as u64,
            output_dir: PathBuf::from("./output"),
            log: LogDestination::default(),
        }
    }
}

impl ClipperConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            client: ClientSettings {
                base_url: self.base_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                read_timeout: Duration::from_secs(self.read_timeout_secs),
            },
            tracker: TrackerSettings {
                poll_interval: Duration::from_millis(self.poll_interval_ms),
            },
            output_dir: self.output_dir.clone(),
        }
    }
}

/// Loads the config at `path`; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<ClipperConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            engine_info!("No config at {:?}, using defaults", path);
            return Ok(ClipperConfig::default());
        }
        Err(source) => {
            engine_warn!("Failed to read config from {:?}: {}", path, source);
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
