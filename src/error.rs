//! Error types for the rover gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the rover gateway
///
/// Transport delivery faults are deliberately *not* represented here: the
/// transport adapters classify them into [`crate::transport::DeliveryOutcome`]
/// and never let them escape as errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Unknown command name (config file or CLI)
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// BLE session/backend error outside the delivery path
    #[error("ble error: {0}")]
    Ble(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
