//! Dispatch loop: recognized text in, delivered commands out
//!
//! Consumes transcript events from a bounded channel, resolves each against
//! the phrase table, and hands matches to the transport one at a time. There
//! is never more than one delivery in flight; event order is delivery order.
//! Failed deliveries are logged and never stop the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::Command;
use crate::command::PhraseTable;
use crate::transport::{DeliveryOutcome, Transport};

/// Caller-level retry policy for failed deliveries
///
/// The transports themselves never retry; this sits above them. The default
/// of zero retries preserves the one-shot semantics of `deliver`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure
    pub max_retries: u32,

    /// Delay before the first retry (doubles each attempt)
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based): `base_delay * 2^attempt`
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Drives transcripts through resolution and delivery
pub struct Dispatcher {
    table: PhraseTable,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
}

impl Dispatcher {
    /// Create a dispatcher over an immutable table and a transport
    #[must_use]
    pub fn new(table: PhraseTable, transport: Arc<dyn Transport>, retry: RetryPolicy) -> Self {
        Self {
            table,
            transport,
            retry,
        }
    }

    /// Consume transcripts until the channel closes
    ///
    /// Blocks on the next event; cancellation (producer drop or shutdown)
    /// takes effect at the loop boundary, never mid-delivery.
    pub async fn run(&self, mut transcripts: mpsc::Receiver<String>) {
        while let Some(text) = transcripts.recv().await {
            self.dispatch(&text).await;
        }

        tracing::info!("transcript stream closed, dispatch loop exiting");
    }

    /// Resolve one transcript and deliver the matched command, if any
    ///
    /// Returns `None` when no phrase matches — an ordinary outcome that
    /// triggers no transport call.
    pub async fn dispatch(&self, text: &str) -> Option<DeliveryOutcome> {
        let Some(cmd) = self.table.resolve(text) else {
            tracing::debug!(text, "no phrase match");
            return None;
        };

        tracing::info!(text, command = %cmd, "phrase matched");
        Some(self.deliver(cmd).await)
    }

    /// Deliver one command, applying the retry policy
    pub async fn deliver(&self, cmd: Command) -> DeliveryOutcome {
        let transport = self.transport.as_ref();
        let mut attempt = 0u32;

        loop {
            let outcome = transport.deliver(cmd).await;

            match &outcome {
                DeliveryOutcome::Delivered(reply) => {
                    tracing::info!(
                        transport = transport.name(),
                        target = %transport.target(),
                        command = %cmd,
                        reply = ?reply,
                        "delivered"
                    );
                    return outcome;
                }
                DeliveryOutcome::Failed(reason) => {
                    if attempt >= self.retry.max_retries {
                        tracing::warn!(
                            transport = transport.name(),
                            target = %transport.target(),
                            command = %cmd,
                            error = %reason,
                            "delivery failed"
                        );
                        return outcome;
                    }

                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        transport = transport.name(),
                        target = %transport.target(),
                        command = %cmd,
                        error = %reason,
                        delay = ?delay,
                        "delivery failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
