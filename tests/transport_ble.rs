//! BLE transport tests against stub discovery collaborators

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use rover_gateway::transport::{
    BleConnector, BleDevice, BleTransport, DeliveryOutcome, FailureReason, Transport,
    decode_wire_byte, parse_characteristic_id, wire_byte,
};
use rover_gateway::{BleConfig, Command, Error};

/// What the stub connector should do when asked to discover
#[derive(Clone, Copy)]
enum StubBehavior {
    /// Device found; writes succeed
    Found,
    /// Device found; GATT write fails
    FoundButWriteFails,
    /// Scan window closes without a match
    NotFound,
    /// Scan itself cannot run
    ScanError,
}

struct StubConnector {
    behavior: StubBehavior,
    discover_calls: AtomicUsize,
    writes: Arc<Mutex<Vec<(Uuid, u8)>>>,
}

impl StubConnector {
    fn new(behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            discover_calls: AtomicUsize::new(0),
            writes: Arc::new(Mutex::new(Vec::new())),
        })
    }

    fn discover_calls(&self) -> usize {
        self.discover_calls.load(Ordering::SeqCst)
    }

    fn writes(&self) -> Vec<(Uuid, u8)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl BleConnector for StubConnector {
    async fn discover(
        &self,
        _device_name: &str,
        _timeout: Duration,
    ) -> rover_gateway::Result<Option<Box<dyn BleDevice>>> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            StubBehavior::Found => Ok(Some(Box::new(StubDevice {
                writes: Arc::clone(&self.writes),
                fail_write: false,
            }))),
            StubBehavior::FoundButWriteFails => Ok(Some(Box::new(StubDevice {
                writes: Arc::clone(&self.writes),
                fail_write: true,
            }))),
            StubBehavior::NotFound => Ok(None),
            StubBehavior::ScanError => Err(Error::Ble("adapter powered off".to_string())),
        }
    }
}

struct StubDevice {
    writes: Arc<Mutex<Vec<(Uuid, u8)>>>,
    fail_write: bool,
}

#[async_trait]
impl BleDevice for StubDevice {
    async fn write_command(&self, characteristic: Uuid, value: u8) -> rover_gateway::Result<()> {
        if self.fail_write {
            return Err(Error::Ble("gatt write failed".to_string()));
        }

        self.writes.lock().unwrap().push((characteristic, value));
        Ok(())
    }
}

fn transport_with(connector: Arc<StubConnector>) -> BleTransport {
    BleTransport::new(BleConfig::default(), connector).unwrap()
}

// -- wire encoding ------------------------------------------------------------

#[test]
fn wire_bytes_round_trip() {
    for cmd in [
        Command::Forward,
        Command::Stop,
        Command::Left,
        Command::Right,
        Command::Reverse,
    ] {
        let byte = wire_byte(cmd).unwrap();
        assert_eq!(decode_wire_byte(byte), Some(cmd));
    }
}

#[test]
fn wire_table_matches_firmware() {
    assert_eq!(wire_byte(Command::Forward), Some(0x01));
    assert_eq!(wire_byte(Command::Stop), Some(0x02));
    assert_eq!(wire_byte(Command::Left), Some(0x03));
    assert_eq!(wire_byte(Command::Right), Some(0x04));
    assert_eq!(wire_byte(Command::Reverse), Some(0x05));
}

#[test]
fn speed_commands_have_no_encoding() {
    assert_eq!(wire_byte(Command::SpeedFast), None);
    assert_eq!(wire_byte(Command::SpeedSlow), None);
    assert_eq!(decode_wire_byte(0x00), None);
    assert_eq!(decode_wire_byte(0x06), None);
}

// -- delivery -----------------------------------------------------------------

#[tokio::test]
async fn successful_write_is_delivered_without_reply() {
    let connector = StubConnector::new(StubBehavior::Found);
    let transport = transport_with(Arc::clone(&connector));

    let outcome = transport.deliver(Command::Left).await;

    assert_eq!(outcome, DeliveryOutcome::Delivered(None));
    assert_eq!(
        connector.writes(),
        vec![(parse_characteristic_id("2A56").unwrap(), 0x03)]
    );
}

#[tokio::test]
async fn missing_device_is_device_not_found() {
    let connector = StubConnector::new(StubBehavior::NotFound);
    let transport = transport_with(Arc::clone(&connector));

    let outcome = transport.deliver(Command::Forward).await;

    assert_eq!(outcome, DeliveryOutcome::Failed(FailureReason::DeviceNotFound));
    assert_eq!(connector.discover_calls(), 1);
    assert!(connector.writes().is_empty());
}

#[tokio::test]
async fn speed_command_fails_before_any_scan() {
    let connector = StubConnector::new(StubBehavior::Found);
    let transport = transport_with(Arc::clone(&connector));

    let outcome = transport.deliver(Command::SpeedFast).await;

    assert!(
        matches!(outcome, DeliveryOutcome::Failed(FailureReason::ConnectionError(_))),
        "unexpected outcome: {outcome:?}"
    );
    // Unencodable commands never hit the radio
    assert_eq!(connector.discover_calls(), 0);
    assert!(connector.writes().is_empty());
}

#[tokio::test]
async fn gatt_write_failure_is_connection_error() {
    let connector = StubConnector::new(StubBehavior::FoundButWriteFails);
    let transport = transport_with(connector);

    let outcome = transport.deliver(Command::Stop).await;

    assert!(matches!(
        outcome,
        DeliveryOutcome::Failed(FailureReason::ConnectionError(_))
    ));
}

#[tokio::test]
async fn scan_failure_is_connection_error() {
    let connector = StubConnector::new(StubBehavior::ScanError);
    let transport = transport_with(connector);

    let outcome = transport.deliver(Command::Right).await;

    assert!(matches!(
        outcome,
        DeliveryOutcome::Failed(FailureReason::ConnectionError(_))
    ));
}

#[test]
fn bad_characteristic_id_fails_at_construction() {
    let config = BleConfig {
        device_name: "Voice_RC".to_string(),
        characteristic_id: "not a uuid".to_string(),
    };

    assert!(BleTransport::new(config, StubConnector::new(StubBehavior::Found)).is_err());
}
