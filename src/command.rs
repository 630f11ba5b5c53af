//! Driving commands and the phrase table that recognizes them
//!
//! The phrase table is an ordered list of substring patterns. Resolution
//! scans the table in insertion order and the first phrase contained in the
//! recognized text wins, so order encodes priority: multi-word phrases must
//! appear before the single words they contain ("go back" before "go"), or
//! the shorter phrase shadows them.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::Error;

/// A canonical driving instruction, independent of transport encoding
///
/// Each transport adapter owns its own wire encoding of this enum: the TCP
/// adapter sends an ASCII word, the BLE adapter a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    /// Drive forward
    Forward,
    /// Stop the motors
    Stop,
    /// Turn left
    Left,
    /// Turn right
    Right,
    /// Drive backward
    Reverse,
    /// Full speed
    SpeedFast,
    /// Half speed
    SpeedSlow,
}

impl Command {
    /// All command values, for iteration in tests and table listings
    pub const ALL: [Self; 7] = [
        Self::Forward,
        Self::Stop,
        Self::Left,
        Self::Right,
        Self::Reverse,
        Self::SpeedFast,
        Self::SpeedSlow,
    ];

    /// Stable lowercase name used in config files, CLI arguments, and logs
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Stop => "stop",
            Self::Left => "left",
            Self::Right => "right",
            Self::Reverse => "reverse",
            Self::SpeedFast => "speed-fast",
            Self::SpeedSlow => "speed-slow",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "stop" => Ok(Self::Stop),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "reverse" => Ok(Self::Reverse),
            "speed-fast" | "fast" => Ok(Self::SpeedFast),
            "speed-slow" | "slow" => Ok(Self::SpeedSlow),
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }
}

/// Ordered phrase → command mapping
///
/// Immutable after construction; safe to share across threads by reference.
#[derive(Debug, Clone)]
pub struct PhraseTable {
    entries: Vec<(String, Command)>,
}

impl PhraseTable {
    /// Build a table from (phrase, command) pairs, preserving order
    ///
    /// Phrases are lowercased and trimmed; entries that normalize to the
    /// empty string are discarded (an empty pattern would match everything).
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (String, Command)>) -> Self {
        let entries: Vec<(String, Command)> = entries
            .into_iter()
            .filter_map(|(phrase, cmd)| {
                let phrase = phrase.to_lowercase().trim().to_string();
                if phrase.is_empty() {
                    tracing::warn!("dropping empty phrase table entry");
                    None
                } else {
                    Some((phrase, cmd))
                }
            })
            .collect();

        tracing::debug!(entries = entries.len(), "phrase table built");
        Self { entries }
    }

    /// Resolve recognized text to a command
    ///
    /// Scans entries in table order and returns the command of the first
    /// phrase that occurs as a substring of `text`. Returns `None` when no
    /// phrase matches; a non-match is an ordinary outcome, not an error.
    #[must_use]
    pub fn resolve(&self, text: &str) -> Option<Command> {
        let text = text.to_lowercase();
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.entries
            .iter()
            .find(|(phrase, _)| text.contains(phrase.as_str()))
            .map(|&(_, cmd)| cmd)
    }

    /// The table entries in resolution order
    #[must_use]
    pub fn entries(&self) -> &[(String, Command)] {
        &self.entries
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PhraseTable {
    /// The built-in phrase table
    ///
    /// Multi-word phrases come first so their single-word substrings do not
    /// shadow them ("go back" must win over "go").
    fn default() -> Self {
        let phrases = [
            ("move forward", Command::Forward),
            ("go back", Command::Reverse),
            ("turn left", Command::Left),
            ("turn right", Command::Right),
            ("speed up", Command::SpeedFast),
            ("full speed", Command::SpeedFast),
            ("slow down", Command::SpeedSlow),
            ("half speed", Command::SpeedSlow),
            ("forward", Command::Forward),
            ("go", Command::Forward),
            ("start", Command::Forward),
            ("stop", Command::Stop),
            ("halt", Command::Stop),
            ("brake", Command::Stop),
            ("woah", Command::Stop),
            ("left", Command::Left),
            ("right", Command::Right),
            ("reverse", Command::Reverse),
            ("backward", Command::Reverse),
            ("faster", Command::SpeedFast),
            ("slower", Command::SpeedSlow),
        ];

        Self::new(phrases.map(|(p, c)| (p.to_string(), c)))
    }
}
