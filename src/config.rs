//! Configuration for the engine
//!
//! Sources, lowest precedence first: built-in defaults, a JSON file,
//! `SOXGATE_*` environment variables, then command line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SoxError};
use crate::ops::Mp3Quality;

/// Path of the engine binary
pub const ENV_SOX_PATH: &str = "SOXGATE_SOX_PATH";
/// Default MP3 encoder quality, 0 (best) to 9 (fastest)
pub const ENV_MP3_QUALITY: &str = "SOXGATE_MP3_QUALITY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoxConfig {
    /// Engine binary, looked up on `PATH` when relative
    pub binary: PathBuf,
    /// Quality a gate built from this config uses for MP3 encodes that do not pick one
    pub mp3_quality: u8,
    /// Let the engine draw its progress meter on stderr
    pub show_progress: bool,
}

impl Default for SoxConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("sox"),
            mp3_quality: Mp3Quality::DEFAULT.value(),
            show_progress: false,
        }
    }
}

impl SoxConfig {
    /// Load a JSON config file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SoxError::Config {
            reason: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Defaults overridden by the environment
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Optional file, then environment, then validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key/value source
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(binary) = lookup(ENV_SOX_PATH).filter(|value| !value.trim().is_empty()) {
            self.binary = PathBuf::from(binary);
        }

        if let Some(quality) = lookup(ENV_MP3_QUALITY) {
            self.mp3_quality = quality.trim().parse().map_err(|_| SoxError::Config {
                reason: format!("{} must be an integer 0-9, got '{}'", ENV_MP3_QUALITY, quality),
            })?;
        }

        Ok(())
    }

    /// Validate configuration parameter validity
    pub fn validate(&self) -> Result<()> {
        if self.binary.as_os_str().is_empty() {
            return Err(SoxError::Config {
                reason: "Engine binary path must not be empty".to_string(),
            });
        }

        Mp3Quality::new(self.mp3_quality).map_err(|_| SoxError::Config {
            reason: format!("MP3 quality must be 0-9, got {}", self.mp3_quality),
        })?;

        Ok(())
    }

    pub fn mp3_quality(&self) -> Result<Mp3Quality> {
        Mp3Quality::new(self.mp3_quality)
    }

    /// Save config to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
