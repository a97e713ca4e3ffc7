//! Fixed protocol scripts expressed as ordered lists of steps.
//!
//! A script is data: each [`Step`] names an optional request and how the
//! reply is read. The session runner in [`crate::connection`] executes any
//! script the same way, so SMTP and POP3 share one I/O path.

use std::fmt;

use crate::command::{Pop3Command, SmtpCommand, test_message};

/// Sender used by the SMTP script.
pub const SMTP_SENDER: &str = "user1@example.com";
/// Recipient used by the SMTP script.
pub const SMTP_RECIPIENT: &str = "user2@example.com";
/// HELO identity used by the SMTP script.
pub const SMTP_HELO_NAME: &str = "user1";
/// Mailbox the POP3 script logs into.
pub const POP3_USER: &str = "user2";
/// Password the POP3 script logs in with.
pub const POP3_PASSWORD: &str = "password2";

/// Protocol a script speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Simple Mail Transfer Protocol.
    Smtp,
    /// Post Office Protocol v3.
    Pop3,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Smtp => f.write_str("SMTP"),
            Self::Pop3 => f.write_str("POP3"),
        }
    }
}

/// How the reply to a step is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Exactly one read, taken as the complete reply.
    Single,
    /// Read until the buffer ends with `\r\n.\r\n` or `\n.\n`.
    UntilDotTerminator,
}

/// One request/reply exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Label used in the transcript.
    pub label: &'static str,
    /// Bytes written before reading; `None` for the server greeting.
    pub request: Option<Vec<u8>>,
    /// How the reply is read.
    pub read: ReadMode,
    /// Whether the reply is written to the transcript.
    pub logged: bool,
}

impl Step {
    /// The server greeting: no request, one read.
    #[must_use]
    pub const fn banner() -> Self {
        Self {
            label: "Banner",
            request: None,
            read: ReadMode::Single,
            logged: true,
        }
    }

    /// A logged write followed by a single read.
    #[must_use]
    pub const fn exchange(label: &'static str, request: Vec<u8>) -> Self {
        Self {
            label,
            request: Some(request),
            read: ReadMode::Single,
            logged: true,
        }
    }

    /// A silent write followed by reads up to the dot-terminator.
    #[must_use]
    pub const fn multiline(label: &'static str, request: Vec<u8>) -> Self {
        Self {
            label,
            request: Some(request),
            read: ReadMode::UntilDotTerminator,
            logged: false,
        }
    }
}

/// An ordered protocol transcript for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    protocol: Protocol,
    steps: Vec<Step>,
}

impl Script {
    /// Creates a script from explicit steps.
    #[must_use]
    pub const fn new(protocol: Protocol, steps: Vec<Step>) -> Self {
        Self { protocol, steps }
    }

    /// Builds the script for `protocol` as run by client `client_id`.
    #[must_use]
    pub fn for_protocol(protocol: Protocol, client_id: u32) -> Self {
        match protocol {
            Protocol::Smtp => Self::smtp(client_id),
            Protocol::Pop3 => Self::pop3(),
        }
    }

    /// Banner, HELO, MAIL FROM, RCPT TO, DATA, message body, QUIT.
    #[must_use]
    pub fn smtp(client_id: u32) -> Self {
        let steps = vec![
            Step::banner(),
            Step::exchange(
                "HELO",
                SmtpCommand::Helo {
                    hostname: SMTP_HELO_NAME.to_string(),
                }
                .serialize(),
            ),
            Step::exchange(
                "MAIL FROM",
                SmtpCommand::MailFrom {
                    from: SMTP_SENDER.to_string(),
                }
                .serialize(),
            ),
            Step::exchange(
                "RCPT TO",
                SmtpCommand::RcptTo {
                    to: SMTP_RECIPIENT.to_string(),
                }
                .serialize(),
            ),
            Step::exchange("DATA", SmtpCommand::Data.serialize()),
            Step::exchange("Email Sent", test_message(client_id)),
            Step::exchange("QUIT", SmtpCommand::Quit.serialize()),
        ];
        Self::new(Protocol::Smtp, steps)
    }

    /// Banner, USER, PASS, LIST, RETR 1, QUIT. LIST and RETR are silent.
    #[must_use]
    pub fn pop3() -> Self {
        let steps = vec![
            Step::banner(),
            Step::exchange(
                "USER",
                Pop3Command::User {
                    name: POP3_USER.to_string(),
                }
                .serialize(),
            ),
            Step::exchange(
                "PASS",
                Pop3Command::Pass {
                    secret: POP3_PASSWORD.to_string(),
                }
                .serialize(),
            ),
            Step::multiline("LIST", Pop3Command::List.serialize()),
            Step::multiline("RETR 1", Pop3Command::Retr { msg: 1 }.serialize()),
            Step::exchange("QUIT", Pop3Command::Quit.serialize()),
        ];
        Self::new(Protocol::Pop3, steps)
    }

    /// Returns the protocol this script speaks.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns the steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps that write a request.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.steps.iter().filter(|s| s.request.is_some()).count()
    }

    /// Number of steps that produce a transcript line.
    #[must_use]
    pub fn logged_count(&self) -> usize {
        self.steps.iter().filter(|s| s.logged).count()
    }
}

/// Checks whether an accumulated reply ends with a dot-terminator line.
#[must_use]
pub fn has_dot_terminator(data: &[u8]) -> bool {
    data.ends_with(b"\r\n.\r\n") || data.ends_with(b"\n.\n")
}
