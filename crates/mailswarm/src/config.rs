//! Run configuration, read once at startup.

use std::time::Duration;

use clap::Parser;
use mailswarm_proto::{Endpoint, Protocol};
use mailswarm_proto::connection::{POP3_PORT, SMTP_PORT};

/// Default number of clients per protocol.
pub const DEFAULT_CLIENTS: u32 = 100;
/// Default number of concurrent workers.
pub const DEFAULT_WORKERS: usize = 25;
/// Default POP3 read timeout in seconds.
pub const DEFAULT_POP3_TIMEOUT_SECS: u64 = 30;

/// Open many concurrent SMTP and POP3 sessions against local mail servers
#[derive(Parser, Debug, Clone)]
#[command(name = "mailswarm")]
#[command(about = "Load test local SMTP and POP3 servers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// SMTP server hostname
    #[arg(long, default_value = "localhost")]
    pub smtp_host: String,

    /// SMTP server port
    #[arg(long, default_value_t = SMTP_PORT)]
    pub smtp_port: u16,

    /// Per-read SMTP timeout in seconds (0 waits indefinitely)
    #[arg(long, default_value_t = 0, value_name = "SECS")]
    pub smtp_timeout_secs: u64,

    /// POP3 server hostname
    #[arg(long, default_value = "localhost")]
    pub pop3_host: String,

    /// POP3 server port
    #[arg(long, default_value_t = POP3_PORT)]
    pub pop3_port: u16,

    /// Per-read POP3 timeout in seconds (0 waits indefinitely)
    #[arg(long, default_value_t = DEFAULT_POP3_TIMEOUT_SECS, value_name = "SECS")]
    pub pop3_timeout_secs: u64,

    /// Number of clients per protocol
    #[arg(short, long, default_value_t = DEFAULT_CLIENTS)]
    pub clients: u32,

    /// Number of sessions allowed to run at once
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,
}

/// Immutable run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SMTP server under test.
    pub smtp: Endpoint,
    /// POP3 server under test.
    pub pop3: Endpoint,
    /// Clients launched per protocol, numbered from 1.
    pub clients: u32,
    /// Worker pool size.
    pub workers: usize,
}

impl Config {
    /// Returns the endpoint a protocol's clients connect to.
    #[must_use]
    pub const fn endpoint(&self, protocol: Protocol) -> &Endpoint {
        match protocol {
            Protocol::Smtp => &self.smtp,
            Protocol::Pop3 => &self.pop3,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            smtp: Endpoint::smtp_default(),
            pop3: Endpoint::pop3_default(),
            clients: DEFAULT_CLIENTS,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            smtp: Endpoint::new(cli.smtp_host, cli.smtp_port)
                .read_timeout(timeout_from_secs(cli.smtp_timeout_secs)),
            pop3: Endpoint::new(cli.pop3_host, cli.pop3_port)
                .read_timeout(timeout_from_secs(cli.pop3_timeout_secs)),
            clients: cli.clients,
            workers: cli.workers,
        }
    }
}

const fn timeout_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}
