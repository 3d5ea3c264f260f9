//! Configuration file support for fwconsole.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (highest first):
//! 1. Command-line arguments
//! 2. Environment variables (FWCONSOLE_*)
//! 3. Local config file (./fwconsole.toml)
//! 4. Global config file (~/.config/fwconsole/config.toml)

use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Connection configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ConnectionConfig {
    /// Preferred serial port (e.g., "/dev/ttyUSB0" or "COM3").
    pub serial: Option<String>,
    /// Default baud rate.
    pub baud: Option<u32>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Config {
    /// Connection settings.
    #[serde(default)]
    pub connection: ConnectionConfig,
}

impl Config {
    /// Local config file name looked up in the working directory.
    const LOCAL_FILE: &'static str = "fwconsole.toml";

    /// Load configuration from all available sources.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Some(global) = Self::load_from_file(&global_path) {
                    debug!("loaded global config from {}", global_path.display());
                    config.merge(global);
                }
            }
        }

        // Load local config (overrides global)
        let local_path = Path::new(Self::LOCAL_FILE);
        if local_path.exists() {
            if let Some(local) = Self::load_from_file(local_path) {
                debug!("loaded local config from {}", local_path.display());
                config.merge(local);
            }
        }

        config
    }

    /// Load configuration from an explicit path, falling back to defaults.
    pub fn load_from_path(path: &Path) -> Self {
        Self::load_from_file(path).unwrap_or_else(|| {
            warn!("could not load config from {}", path.display());
            Self::default()
        })
    }

    /// Parse one TOML file. An invalid file warns and is skipped rather
    /// than aborting the run; an unreadable file is skipped silently.
    fn load_from_file(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!("invalid TOML in {}: {err}", path.display());
                None
            },
        }
    }

    /// Merge another config into this one; the other wins where set.
    fn merge(&mut self, other: Self) {
        if other.connection.serial.is_some() {
            self.connection.serial = other.connection.serial;
        }
        if other.connection.baud.is_some() {
            self.connection.baud = other.connection.baud;
        }
    }

    /// Global config file path under the platform config directory.
    fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "fwconsole").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Persist to the global config file, creating directories as needed.
    pub fn save(&self) -> std::io::Result<PathBuf> {
        let path = Self::global_config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no config directory available")
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        fs::write(&path, content)?;
        Ok(path)
    }
}
