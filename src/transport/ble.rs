//! Single-byte GATT command delivery
//!
//! The controller exposes one writable characteristic; driving commands are
//! written to it as single bytes with no reply channel. Device discovery and
//! pairing belong to an injected [`BleConnector`] collaborator, so the
//! transport itself stays testable without a radio.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::{DeliveryOutcome, FailureReason, Transport};
use crate::config::BleConfig;
use crate::{Command, Error, Result};

/// Scan window for name-filtered device discovery
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Bluetooth base UUID; 16-bit identifiers expand into bits 96..112
const BLUETOOTH_BASE_UUID: u128 = 0x0000_0000_0000_1000_8000_0080_5F9B_34FB;

/// Single-byte wire encoding of a command
///
/// Speed commands have no encoding in the controller firmware and return
/// `None`; the transport reports them as a failed delivery rather than
/// writing a truncated or made-up byte.
#[must_use]
pub const fn wire_byte(cmd: Command) -> Option<u8> {
    match cmd {
        Command::Forward => Some(0x01),
        Command::Stop => Some(0x02),
        Command::Left => Some(0x03),
        Command::Right => Some(0x04),
        Command::Reverse => Some(0x05),
        Command::SpeedFast | Command::SpeedSlow => None,
    }
}

/// Decode a wire byte back to its command
///
/// The inverse of [`wire_byte`]; mirrors the decode table in the controller
/// firmware and backs the round-trip tests.
#[must_use]
pub const fn decode_wire_byte(byte: u8) -> Option<Command> {
    match byte {
        0x01 => Some(Command::Forward),
        0x02 => Some(Command::Stop),
        0x03 => Some(Command::Left),
        0x04 => Some(Command::Right),
        0x05 => Some(Command::Reverse),
        _ => None,
    }
}

/// Parse a characteristic identifier
///
/// Accepts both the 16-bit short form the firmware advertises ("2A56") and
/// full 128-bit UUID strings. Short forms expand over the Bluetooth base
/// UUID.
///
/// # Errors
///
/// Returns [`Error::Config`] when the string is neither form.
pub fn parse_characteristic_id(s: &str) -> Result<Uuid> {
    let s = s.trim();

    if s.len() == 4 {
        let short = u16::from_str_radix(s, 16)
            .map_err(|_| Error::Config(format!("invalid short characteristic id: {s}")))?;
        return Ok(Uuid::from_u128(
            BLUETOOTH_BASE_UUID | (u128::from(short) << 96),
        ));
    }

    Uuid::parse_str(s).map_err(|_| Error::Config(format!("invalid characteristic id: {s}")))
}

/// Discovery collaborator: yields a connectable device by advertised name
///
/// Discovery and pairing internals are opaque to the transport; production
/// code plugs in a BlueZ-backed implementation, tests plug in stubs.
#[async_trait]
pub trait BleConnector: Send + Sync {
    /// Scan for a device advertising exactly `device_name`
    ///
    /// Returns `Ok(None)` when the scan window closes without a match.
    ///
    /// # Errors
    ///
    /// Returns error when the scan itself cannot run (adapter missing or
    /// powered off).
    async fn discover(
        &self,
        device_name: &str,
        timeout: Duration,
    ) -> Result<Option<Box<dyn BleDevice>>>;
}

/// A discovered device ready for a scoped connect-and-write
#[async_trait]
pub trait BleDevice: Send + Sync {
    /// Connect, write `value` to `characteristic`, and disconnect
    ///
    /// Implementations must disconnect on every exit path, success or error.
    ///
    /// # Errors
    ///
    /// Returns error on connect or GATT write failure.
    async fn write_command(&self, characteristic: Uuid, value: u8) -> Result<()>;
}

/// Delivers commands as single-byte GATT writes
pub struct BleTransport {
    config: BleConfig,
    characteristic: Uuid,
    connector: Arc<dyn BleConnector>,
}

impl BleTransport {
    /// Create a BLE transport for the configured device
    ///
    /// # Errors
    ///
    /// Returns error when the configured characteristic id does not parse.
    pub fn new(config: BleConfig, connector: Arc<dyn BleConnector>) -> Result<Self> {
        let characteristic = parse_characteristic_id(&config.characteristic_id)?;
        Ok(Self {
            config,
            characteristic,
            connector,
        })
    }
}

#[async_trait]
impl Transport for BleTransport {
    fn name(&self) -> &'static str {
        "ble"
    }

    fn target(&self) -> String {
        self.config.device_name.clone()
    }

    async fn deliver(&self, cmd: Command) -> DeliveryOutcome {
        // Encoding check comes first: an unencodable command is a
        // configuration error, not worth a radio scan.
        let Some(byte) = wire_byte(cmd) else {
            return DeliveryOutcome::Failed(FailureReason::ConnectionError(format!(
                "command {cmd} has no single-byte wire encoding"
            )));
        };

        let device = match self
            .connector
            .discover(&self.config.device_name, DISCOVERY_TIMEOUT)
            .await
        {
            Ok(Some(device)) => device,
            Ok(None) => {
                tracing::debug!(device = %self.config.device_name, "no matching device in scan window");
                return DeliveryOutcome::Failed(FailureReason::DeviceNotFound);
            }
            Err(e) => return DeliveryOutcome::Failed(FailureReason::ConnectionError(e.to_string())),
        };

        match device.write_command(self.characteristic, byte).await {
            Ok(()) => {
                tracing::debug!(
                    device = %self.config.device_name,
                    characteristic = %self.characteristic,
                    byte = format_args!("{byte:#04x}"),
                    "gatt write complete"
                );
                DeliveryOutcome::Delivered(None)
            }
            Err(e) => DeliveryOutcome::Failed(FailureReason::ConnectionError(e.to_string())),
        }
    }
}
