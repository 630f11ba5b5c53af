//! TOML configuration file loading
//!
//! Supports `~/.config/omni/rover/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Command, Result};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct RoverConfigFile {
    /// TCP controller parameters
    #[serde(default)]
    pub tcp: TcpFileConfig,

    /// BLE controller parameters
    #[serde(default)]
    pub ble: BleFileConfig,

    /// Delivery retry policy
    #[serde(default)]
    pub retry: RetryFileConfig,

    /// Replacement phrase table; entry order is resolution priority
    #[serde(default)]
    pub phrases: Option<Vec<PhraseEntry>>,
}

/// TCP-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct TcpFileConfig {
    /// Controller host or IP
    pub host: Option<String>,

    /// Controller port
    pub port: Option<u16>,

    /// Connect and I/O timeout in seconds
    pub timeout_secs: Option<f64>,
}

/// BLE-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct BleFileConfig {
    /// Advertised device name to discover
    pub device_name: Option<String>,

    /// GATT characteristic id ("2A56" or a full UUID)
    pub characteristic_id: Option<String>,
}

/// Retry policy configuration
#[derive(Debug, Default, Deserialize)]
pub struct RetryFileConfig {
    /// Extra delivery attempts after a failure (0 = one-shot)
    pub max_retries: Option<u32>,

    /// Base delay between attempts in milliseconds
    pub base_delay_ms: Option<u64>,
}

/// One phrase table entry
#[derive(Debug, Deserialize)]
pub struct PhraseEntry {
    /// Substring to match in the recognized text
    pub phrase: String,

    /// Command to deliver on a match
    pub command: Command,
}

/// Load the TOML config file from the standard path
///
/// Returns `RoverConfigFile::default()` if the file doesn't exist or can't be
/// parsed.
#[must_use]
pub fn load_config_file() -> RoverConfigFile {
    let Some(path) = config_file_path() else {
        return RoverConfigFile::default();
    };

    if !path.exists() {
        return RoverConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                RoverConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            RoverConfigFile::default()
        }
    }
}

/// Read a config file from an explicit path
///
/// Unlike [`load_config_file`], problems are hard errors — a path the user
/// asked for must be honored or reported.
///
/// # Errors
///
/// Returns error when the file cannot be read or parsed.
pub fn read_config_file(path: &Path) -> Result<RoverConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Return the config file path: `~/.config/omni/rover/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("omni")
            .join("rover")
            .join("config.toml")
    })
}
