//! Transport adapters for command delivery
//!
//! Each adapter implements the [`Transport`] trait: one `deliver` operation
//! that takes a [`Command`] and returns a [`DeliveryOutcome`]. Transport
//! faults are classified into the outcome and never escape as errors; retry
//! policy, if any, belongs to the caller.

mod ble;
#[cfg(feature = "bluer-backend")]
mod bluer_link;
mod tcp;

use std::fmt;

use async_trait::async_trait;

pub use ble::{BleConnector, BleDevice, BleTransport, decode_wire_byte, parse_characteristic_id, wire_byte};
#[cfg(feature = "bluer-backend")]
pub use bluer_link::BluerConnector;
pub use tcp::TcpTransport;

use crate::Command;

/// Why a delivery attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Transport-level failure: refused, reset, unreachable, GATT error
    ConnectionError(String),

    /// Connect or I/O deadline exceeded
    Timeout,

    /// BLE discovery exhausted without a matching device
    DeviceNotFound,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionError(detail) => write!(f, "connection error: {detail}"),
            Self::Timeout => f.write_str("timeout"),
            Self::DeviceNotFound => f.write_str("device not found"),
        }
    }
}

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The command reached the controller. Carries the reply text when the
    /// transport has a reply channel (TCP); `None` for fire-and-forget (BLE).
    Delivered(Option<String>),

    /// The command did not reach the controller
    Failed(FailureReason),
}

impl DeliveryOutcome {
    /// Whether the command reached the controller
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

/// Trait for command delivery transports
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short transport name for logs (e.g. "tcp", "ble")
    fn name(&self) -> &'static str;

    /// Human-readable delivery target (address or device name)
    fn target(&self) -> String;

    /// Deliver one command to the remote controller
    ///
    /// Opens whatever connection the transport needs, sends the command, and
    /// tears the connection down again. All transport faults are absorbed and
    /// classified into [`DeliveryOutcome::Failed`]; this method never panics
    /// and never returns an error.
    async fn deliver(&self, cmd: Command) -> DeliveryOutcome;
}
