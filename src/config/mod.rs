//! Configuration management for the rover gateway
//!
//! All values are fixed at startup: defaults, overlaid by the optional TOML
//! config file, overlaid by CLI/env flags in `main`. Nothing mutates the
//! configuration at runtime, so it is safely shared across tasks by
//! reference.

pub mod file;

use std::path::Path;
use std::time::Duration;

use crate::command::PhraseTable;
use crate::dispatch::RetryPolicy;
use crate::{Error, Result};

/// Rover gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP controller parameters
    pub tcp: TcpConfig,

    /// BLE controller parameters
    pub ble: BleConfig,

    /// Caller-level delivery retry policy
    pub retry: RetryPolicy,

    /// Phrase table used for transcript resolution
    pub table: PhraseTable,
}

/// TCP controller connection parameters
#[derive(Debug, Clone)]
pub struct TcpConfig {
    /// Controller host or IP
    pub host: String,

    /// Controller port
    pub port: u16,

    /// Connect and I/O timeout in seconds
    pub timeout_secs: f64,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.158".to_string(),
            port: 9000,
            timeout_secs: 2.0,
        }
    }
}

/// BLE controller parameters
#[derive(Debug, Clone)]
pub struct BleConfig {
    /// Advertised device name to discover
    pub device_name: String,

    /// GATT characteristic id, short ("2A56") or full UUID form
    pub characteristic_id: String,
}

impl Default for BleConfig {
    fn default() -> Self {
        Self {
            device_name: "Voice_RC".to_string(),
            characteristic_id: "2A56".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tcp: TcpConfig::default(),
            ble: BleConfig::default(),
            retry: RetryPolicy::default(),
            table: PhraseTable::default(),
        }
    }
}

impl Config {
    /// Load configuration: defaults overlaid with the TOML config file
    ///
    /// With an explicit `path` the file must exist and parse; without one,
    /// the standard path is tried and silently skipped when absent.
    ///
    /// # Errors
    ///
    /// Returns error when an explicitly given file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let overlay = match path {
            Some(p) => file::read_config_file(p)?,
            None => file::load_config_file(),
        };

        let config = Self::from(overlay);
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would misbehave downstream
    ///
    /// `timeout_secs` feeds `Duration::from_secs_f64`, which panics on
    /// negative or non-finite input; a bad config file must surface as a
    /// config error instead.
    fn validate(&self) -> Result<()> {
        let timeout = self.tcp.timeout_secs;
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(Error::Config(format!(
                "tcp.timeout_secs must be a positive number, got {timeout}"
            )));
        }

        Ok(())
    }
}

impl From<file::RoverConfigFile> for Config {
    fn from(f: file::RoverConfigFile) -> Self {
        let defaults = Self::default();

        let tcp = TcpConfig {
            host: f.tcp.host.unwrap_or(defaults.tcp.host),
            port: f.tcp.port.unwrap_or(defaults.tcp.port),
            timeout_secs: f.tcp.timeout_secs.unwrap_or(defaults.tcp.timeout_secs),
        };

        let ble = BleConfig {
            device_name: f.ble.device_name.unwrap_or(defaults.ble.device_name),
            characteristic_id: f
                .ble
                .characteristic_id
                .unwrap_or(defaults.ble.characteristic_id),
        };

        let retry = RetryPolicy {
            max_retries: f.retry.max_retries.unwrap_or(defaults.retry.max_retries),
            base_delay: f
                .retry
                .base_delay_ms
                .map_or(defaults.retry.base_delay, Duration::from_millis),
        };

        // A [[phrases]] list replaces the built-in table wholesale; file
        // order is resolution order.
        let table = f.phrases.map_or(defaults.table, |entries| {
            PhraseTable::new(entries.into_iter().map(|e| (e.phrase, e.command)))
        });

        Self {
            tcp,
            ble,
            retry,
            table,
        }
    }
}
