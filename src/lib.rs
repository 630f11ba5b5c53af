//! Rover Gateway - voice command gateway for RC rover controllers
//!
//! Converts recognized speech phrases into canonical driving commands and
//! delivers each one-shot to an embedded controller over TCP or BLE.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  transcripts  ┌──────────────┐  Command  ┌─────────────┐
//! │ speech engine├──────────────▶│ PhraseTable  ├──────────▶│  Transport  │
//! │ (external)   │  mpsc channel │  resolver    │ dispatch  │  tcp │ ble  │
//! └──────────────┘               └──────────────┘           └──────┬──────┘
//!                                                                  │
//!                                                           rover controller
//! ```
//!
//! The phrase table and transport configuration are built once at startup and
//! immutable thereafter; the dispatch loop issues at most one delivery at a
//! time, and transport failures are logged outcomes, never fatal.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod transcript;
pub mod transport;

pub use command::{Command, PhraseTable};
pub use config::{BleConfig, Config, TcpConfig};
pub use dispatch::{Dispatcher, RetryPolicy};
pub use error::{Error, Result};
#[cfg(feature = "bluer-backend")]
pub use transport::BluerConnector;
pub use transport::{
    BleConnector, BleDevice, BleTransport, DeliveryOutcome, FailureReason, TcpTransport, Transport,
};
