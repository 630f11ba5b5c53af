//! Transcript sources feeding the dispatch loop
//!
//! The speech engine is an external collaborator; all the dispatch loop sees
//! is a bounded channel of lower-cased, trimmed text events. The stdin source
//! here stands in for it — pipe a recognizer (or your keyboard) into the
//! binary and every line becomes a transcript event.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Spawn a task turning stdin lines into transcript events
///
/// Lines are lower-cased and trimmed; blank lines are skipped. The returned
/// receiver closes when stdin hits EOF, which ends the dispatch loop.
#[must_use]
pub fn stdin_transcripts(buffer: usize) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(buffer);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let text = line.to_lowercase().trim().to_string();
                    if text.is_empty() {
                        continue;
                    }

                    tracing::debug!(text, "transcript event");
                    if tx.send(text).await.is_err() {
                        // Consumer gone; stop reading
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "stdin read failed");
                    break;
                }
            }
        }

        tracing::debug!("stdin transcript source finished");
    });

    rx
}
