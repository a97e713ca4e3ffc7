//! Connections to the servers under test.

mod session;
mod stream;

pub use session::{Session, SessionStats};
pub use stream::{CHUNK_SIZE, MAX_RESPONSE_SIZE, ProbeStream};

use std::fmt;
use std::time::Duration;

use tokio::net::TcpStream;

use crate::error::Result;

/// Default SMTP port.
pub const SMTP_PORT: u16 = 25;
/// Default POP3 port.
pub const POP3_PORT: u16 = 110;
/// Default POP3 read timeout.
pub const POP3_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Address of a server under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Per-read timeout; `None` waits indefinitely.
    pub read_timeout: Option<Duration>,
}

impl Endpoint {
    /// Creates an endpoint with no read timeout.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            read_timeout: None,
        }
    }

    /// Local SMTP server on port 25, no read timeout.
    #[must_use]
    pub fn smtp_default() -> Self {
        Self::new("localhost", SMTP_PORT)
    }

    /// Local POP3 server on port 110 with a 30 second read timeout.
    #[must_use]
    pub fn pop3_default() -> Self {
        Self::new("localhost", POP3_PORT).read_timeout(Some(POP3_READ_TIMEOUT))
    }

    /// Sets the per-read timeout.
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Opens a plain TCP connection to `endpoint`.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn connect(endpoint: &Endpoint) -> Result<ProbeStream<TcpStream>> {
    let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port)).await?;
    Ok(ProbeStream::new(stream).with_read_timeout(endpoint.read_timeout))
}
