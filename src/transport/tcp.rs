//! Newline-framed TCP delivery
//!
//! One connection per call: connect, send `<word>\n`, half-close the write
//! side so the controller sees end-of-command without a length prefix, then
//! read a short ASCII reply until the peer closes. The controller stops
//! scanning at the newline, so the word itself must not contain one.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::{DeliveryOutcome, FailureReason, Transport};
use crate::Command;
use crate::config::TcpConfig;

/// Upper bound on reply bytes read before giving up on more
const MAX_REPLY_BYTES: usize = 256;

/// ASCII command word sent on the wire
const fn wire_word(cmd: Command) -> &'static str {
    match cmd {
        Command::Forward => "forward",
        Command::Stop => "stop",
        Command::Left => "left",
        Command::Right => "right",
        Command::Reverse => "reverse",
        Command::SpeedFast => "fast",
        Command::SpeedSlow => "slow",
    }
}

/// Delivers commands over a short-lived TCP connection
pub struct TcpTransport {
    config: TcpConfig,
}

impl TcpTransport {
    /// Create a TCP transport for the configured controller address
    #[must_use]
    pub const fn new(config: TcpConfig) -> Self {
        Self { config }
    }

    fn io_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.config.timeout_secs)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    fn name(&self) -> &'static str {
        "tcp"
    }

    fn target(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    async fn deliver(&self, cmd: Command) -> DeliveryOutcome {
        let addr = self.target();
        let io_timeout = self.io_timeout();

        let mut stream = match timeout(io_timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::debug!(addr = %addr, error = %e, "connect failed");
                return DeliveryOutcome::Failed(classify(&e));
            }
            Err(_) => {
                tracing::debug!(addr = %addr, "connect timed out");
                return DeliveryOutcome::Failed(FailureReason::Timeout);
            }
        };

        if let (Ok(local), Ok(peer)) = (stream.local_addr(), stream.peer_addr()) {
            tracing::debug!(local = %local, peer = %peer, "connected");
        }

        let mut frame = wire_word(cmd).as_bytes().to_vec();
        frame.push(b'\n');

        let exchange = async {
            stream.write_all(&frame).await?;
            // Half-close: the controller reads to EOF for the reply boundary
            stream.shutdown().await?;
            read_reply(&mut stream).await
        };

        match timeout(io_timeout, exchange).await {
            Ok(Ok(reply)) => {
                tracing::debug!(addr = %addr, reply = %reply, "reply received, socket closing");
                DeliveryOutcome::Delivered(Some(reply))
            }
            Ok(Err(e)) => DeliveryOutcome::Failed(classify(&e)),
            Err(_) => DeliveryOutcome::Failed(FailureReason::Timeout),
        }
    }
}

/// Read up to [`MAX_REPLY_BYTES`] until the peer closes
///
/// Invalid (non-ASCII) bytes are dropped, not fatal; surrounding whitespace
/// is trimmed. A zero-byte reply decodes to the empty string.
async fn read_reply(stream: &mut TcpStream) -> io::Result<String> {
    let mut buf = [0u8; MAX_REPLY_BYTES];
    let mut filled = 0;

    while filled < buf.len() {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    let reply: String = buf[..filled]
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect();

    Ok(reply.trim().to_string())
}

/// Map an OS-level error to a failure reason
fn classify(e: &io::Error) -> FailureReason {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => FailureReason::Timeout,
        _ => FailureReason::ConnectionError(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_words_are_single_line_ascii() {
        for cmd in Command::ALL {
            let word = wire_word(cmd);
            assert!(word.is_ascii());
            assert!(!word.contains('\n'));
            assert!(!word.is_empty());
        }
    }

    #[test]
    fn classify_timeout_kinds() {
        let e = io::Error::new(io::ErrorKind::TimedOut, "slow");
        assert_eq!(classify(&e), FailureReason::Timeout);

        let e = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(classify(&e), FailureReason::ConnectionError(_)));
    }
}
