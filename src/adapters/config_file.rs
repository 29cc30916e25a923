//! JSON config file adapter.
//!
//! Implements [`ConfigPort`] over a JSON file on disk. A missing file is
//! not an error — first runs get [`SystemConfig::default()`] — but a
//! file that exists and fails to parse is, so a typo cannot silently
//! reset the rig to defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

/// Config storage in a single JSON file.
pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no config at {}, using defaults", self.path.display());
                return Ok(SystemConfig::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config: SystemConfig =
            serde_json::from_str(&raw).map_err(|_| ConfigError::Corrupted)?;
        config
            .validate()
            .map_err(ConfigError::ValidationFailed)?;

        info!("loaded config from {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config
            .validate()
            .map_err(ConfigError::ValidationFailed)?;

        let raw = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;
        fs::write(&self.path, raw).map_err(ConfigError::Io)?;
        Ok(())
    }
}
