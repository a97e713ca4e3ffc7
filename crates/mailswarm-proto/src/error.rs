//! Error types for scripted client sessions.

use std::io;
use std::string::FromUtf8Error;
use std::time::Duration;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Session error types.
///
/// Every variant is terminal for the session that produced it: the remaining
/// steps are skipped and the connection is released.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (connection refused, reset, broken pipe).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No data arrived within the configured read timeout.
    #[error("timed out after {0:?} waiting for server response")]
    Timeout(Duration),

    /// Server response was not valid UTF-8.
    #[error("undecodable server response: {0}")]
    Decode(#[from] FromUtf8Error),

    /// Peer closed the connection before a dot-terminated response completed.
    #[error("connection closed before response terminator ({0} bytes received)")]
    ConnectionClosed(usize),

    /// Accumulated multi-line response grew past the allowed size.
    #[error("response exceeds {0} bytes without a terminator")]
    ResponseTooLarge(usize),
}

impl Error {
    /// Returns true if this error was caused by the read timeout elapsing.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns true if the server refused the connection.
    #[must_use]
    pub fn is_refused(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == io::ErrorKind::ConnectionRefused)
    }
}
