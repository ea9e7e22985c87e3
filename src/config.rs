//! Settings for the command line front end.
//!
//! Values come from an optional TOML file and are then overridden by flags.
//! The digest core itself takes no configuration beyond what is passed in.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::hash::{ComparisonService, DigestEngine, DEFAULT_BUFFER_SIZE};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Front end settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Chunk size for streaming reads, in bytes.
    pub buffer_size: usize,
    /// Hash both inputs of a comparison at the same time.
    pub concurrent: bool,
    /// Colour the verdict line.
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            concurrent: true,
            color: true,
        }
    }
}

impl Settings {
    /// `<config dir>/hashcompare/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hashcompare").join(CONFIG_FILE_NAME))
    }

    /// Load settings.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// tried and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        let mut settings: Settings = toml::from_str(data).context("invalid settings")?;
        settings.normalize();
        Ok(settings)
    }

    /// Build the comparison service these settings describe.
    pub fn service(&self) -> ComparisonService {
        ComparisonService::with_engine(DigestEngine::with_buffer_size(self.buffer_size))
            .with_concurrency(self.concurrent)
    }

    /// Override the chunk size; 0 means the default, as in the settings file.
    pub fn set_buffer_size(&mut self, buffer_size: usize) {
        self.buffer_size = buffer_size;
        self.normalize();
    }

    fn read_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::from_toml(&data).with_context(|| format!("in {}", path.display()))
    }

    fn normalize(&mut self) {
        if self.buffer_size == 0 {
            self.buffer_size = DEFAULT_BUFFER_SIZE;
        }
    }
}
