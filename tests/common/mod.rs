//! Shared test utilities

use std::sync::Mutex;

use async_trait::async_trait;

use rover_gateway::transport::{DeliveryOutcome, Transport};
use rover_gateway::Command;

/// Transport stub that records deliveries and replays scripted outcomes
///
/// Outcomes are consumed front-to-back; once the script runs dry every
/// delivery succeeds with `Delivered(None)`.
pub struct StubTransport {
    delivered: Mutex<Vec<Command>>,
    script: Mutex<Vec<DeliveryOutcome>>,
}

impl StubTransport {
    /// Stub where every delivery succeeds
    #[must_use]
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    /// Stub replaying `script` before defaulting to success
    #[must_use]
    pub fn with_script(script: Vec<DeliveryOutcome>) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            script: Mutex::new(script),
        }
    }

    /// Commands handed to `deliver`, in call order (retries included)
    pub fn delivered(&self) -> Vec<Command> {
        self.delivered.lock().expect("stub lock poisoned").clone()
    }
}

impl Default for StubTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for StubTransport {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn target(&self) -> String {
        "stub".to_string()
    }

    async fn deliver(&self, cmd: Command) -> DeliveryOutcome {
        self.delivered.lock().expect("stub lock poisoned").push(cmd);

        let mut script = self.script.lock().expect("stub lock poisoned");
        if script.is_empty() {
            DeliveryOutcome::Delivered(None)
        } else {
            script.remove(0)
        }
    }
}
