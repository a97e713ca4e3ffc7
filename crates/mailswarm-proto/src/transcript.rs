//! Human-readable per-step output.
//!
//! Each logged step of a session produces one [`TranscriptLine`], rendered as
//! `[SMTP Client 3] HELO: 250 ok`. Failures produce a single
//! `[SMTP Client 3] Exception: ...` line.

use std::fmt;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::script::Protocol;

/// What a transcript line reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A completed step and its trimmed reply.
    Step {
        /// Step label.
        label: String,
        /// Reply text with surrounding whitespace removed.
        response: String,
    },
    /// The error that ended the session.
    Exception(String),
}

/// One line of client output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    /// Protocol of the emitting client.
    pub protocol: Protocol,
    /// Client sequence number.
    pub client_id: u32,
    /// Line content.
    pub entry: Entry,
}

impl TranscriptLine {
    /// Creates a step line, trimming the reply.
    #[must_use]
    pub fn step(protocol: Protocol, client_id: u32, label: &str, response: &str) -> Self {
        Self {
            protocol,
            client_id,
            entry: Entry::Step {
                label: label.to_string(),
                response: response.trim().to_string(),
            },
        }
    }

    /// Creates an exception line.
    #[must_use]
    pub fn exception(protocol: Protocol, client_id: u32, description: impl fmt::Display) -> Self {
        Self {
            protocol,
            client_id,
            entry: Entry::Exception(description.to_string()),
        }
    }

    /// Returns true if this line reports a failure.
    #[must_use]
    pub const fn is_exception(&self) -> bool {
        matches!(self.entry, Entry::Exception(_))
    }
}

impl fmt::Display for TranscriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} Client {}] ", self.protocol, self.client_id)?;
        match &self.entry {
            Entry::Step { label, response } => write!(f, "{label}: {response}"),
            Entry::Exception(description) => write!(f, "Exception: {description}"),
        }
    }
}

/// Destination for transcript lines.
///
/// Sinks are shared between concurrently running sessions.
pub trait TranscriptSink: Send + Sync {
    /// Records one line.
    fn emit(&self, line: TranscriptLine);
}

/// Writes each line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl TranscriptSink for ConsoleSink {
    fn emit(&self, line: TranscriptLine) {
        let mut out = std::io::stdout().lock();
        // Nothing sensible to do if stdout is gone.
        let _ = writeln!(out, "{line}");
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<TranscriptLine>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every line recorded so far.
    #[must_use]
    pub fn lines(&self) -> Vec<TranscriptLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the lines emitted by one client, in order.
    #[must_use]
    pub fn lines_for(&self, protocol: Protocol, client_id: u32) -> Vec<TranscriptLine> {
        self.lines()
            .into_iter()
            .filter(|l| l.protocol == protocol && l.client_id == client_id)
            .collect()
    }

    /// Returns every line rendered as text.
    #[must_use]
    pub fn rendered(&self) -> Vec<String> {
        self.lines().iter().map(ToString::to_string).collect()
    }
}

impl TranscriptSink for MemorySink {
    fn emit(&self, line: TranscriptLine) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }
}
