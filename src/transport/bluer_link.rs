//! BlueZ-backed BLE connector (Linux, `bluer-backend` feature)

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use uuid::Uuid;

use super::{BleConnector, BleDevice};
use crate::{Error, Result};

fn ble_err(e: &bluer::Error) -> Error {
    Error::Ble(e.to_string())
}

/// [`BleConnector`] backed by the BlueZ daemon over D-Bus
pub struct BluerConnector {
    session: bluer::Session,
}

impl BluerConnector {
    /// Open a session to the BlueZ daemon
    ///
    /// # Errors
    ///
    /// Returns error when the daemon is unreachable.
    pub async fn new() -> Result<Self> {
        let session = bluer::Session::new().await.map_err(|e| ble_err(&e))?;
        Ok(Self { session })
    }
}

#[async_trait]
impl BleConnector for BluerConnector {
    async fn discover(
        &self,
        device_name: &str,
        timeout: Duration,
    ) -> Result<Option<Box<dyn BleDevice>>> {
        let adapter = self
            .session
            .default_adapter()
            .await
            .map_err(|e| ble_err(&e))?;
        adapter.set_powered(true).await.map_err(|e| ble_err(&e))?;

        tracing::debug!(adapter = adapter.name(), device = device_name, "scanning");

        let events = adapter.discover_devices().await.map_err(|e| ble_err(&e))?;
        tokio::pin!(events);

        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                () = &mut deadline => return Ok(None),
                event = events.next() => match event {
                    Some(bluer::AdapterEvent::DeviceAdded(addr)) => {
                        let device = adapter.device(addr).map_err(|e| ble_err(&e))?;
                        let name = device.name().await.map_err(|e| ble_err(&e))?;
                        if name.as_deref() == Some(device_name) {
                            tracing::debug!(address = %addr, device = device_name, "device found");
                            return Ok(Some(Box::new(BluerDevice { device })));
                        }
                    }
                    Some(_) => {}
                    None => return Ok(None),
                },
            }
        }
    }
}

/// A discovered BlueZ device
struct BluerDevice {
    device: bluer::Device,
}

impl BluerDevice {
    async fn write_connected(&self, characteristic: Uuid, value: u8) -> Result<()> {
        for service in self.device.services().await.map_err(|e| ble_err(&e))? {
            for chr in service.characteristics().await.map_err(|e| ble_err(&e))? {
                if chr.uuid().await.map_err(|e| ble_err(&e))? == characteristic {
                    chr.write(&[value]).await.map_err(|e| ble_err(&e))?;
                    return Ok(());
                }
            }
        }

        Err(Error::Ble(format!(
            "characteristic {characteristic} not found on device"
        )))
    }
}

#[async_trait]
impl BleDevice for BluerDevice {
    async fn write_command(&self, characteristic: Uuid, value: u8) -> Result<()> {
        self.device.connect().await.map_err(|e| ble_err(&e))?;

        // Disconnect on every exit path; a failed write must not leave the
        // link up and block the next delivery's connect.
        let result = self.write_connected(characteristic, value).await;

        if let Err(e) = self.device.disconnect().await {
            tracing::warn!(error = %e, "disconnect failed");
        }

        result
    }
}
