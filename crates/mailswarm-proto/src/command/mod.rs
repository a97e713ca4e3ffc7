//! Wire commands for the SMTP and POP3 scripts.

/// SMTP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpCommand {
    /// HELO - Simple greeting
    Helo {
        /// Client hostname
        hostname: String,
    },
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Sender address
        from: String,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Recipient address
        to: String,
    },
    /// DATA - Begin message data
    Data,
    /// QUIT - Close connection
    Quit,
}

impl SmtpCommand {
    /// Serializes the command to bytes.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        match self {
            Self::Helo { hostname } => {
                buf.extend_from_slice(b"HELO ");
                buf.extend_from_slice(hostname.as_bytes());
            }
            Self::MailFrom { from } => {
                buf.extend_from_slice(b"MAIL FROM:<");
                buf.extend_from_slice(from.as_bytes());
                buf.push(b'>');
            }
            Self::RcptTo { to } => {
                buf.extend_from_slice(b"RCPT TO:<");
                buf.extend_from_slice(to.as_bytes());
                buf.push(b'>');
            }
            Self::Data => {
                buf.extend_from_slice(b"DATA");
            }
            Self::Quit => {
                buf.extend_from_slice(b"QUIT");
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}

/// POP3 command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pop3Command {
    /// USER - Identify the mailbox
    User {
        /// Mailbox name
        name: String,
    },
    /// PASS - Plaintext password
    Pass {
        /// Password
        secret: String,
    },
    /// LIST - Scan listing of all messages
    List,
    /// RETR - Retrieve one message
    Retr {
        /// Message number (1-based)
        msg: u32,
    },
    /// QUIT - End the session
    Quit,
}

impl Pop3Command {
    /// Serializes the command to bytes.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let line = match self {
            Self::User { name } => format!("USER {name}"),
            Self::Pass { secret } => format!("PASS {secret}"),
            Self::List => "LIST".to_string(),
            Self::Retr { msg } => format!("RETR {msg}"),
            Self::Quit => "QUIT".to_string(),
        };

        let mut buf = line.into_bytes();
        buf.extend_from_slice(b"\r\n");
        buf
    }
}

/// Builds the DATA payload sent by SMTP client `client_id`.
///
/// The payload already carries the terminating `.` line; no dot-stuffing is
/// applied since no body line starts with `.`.
#[must_use]
pub fn test_message(client_id: u32) -> Vec<u8> {
    format!(
        "Subject: Test Email from client {client_id}\r\n\
         \r\n\
         This is a test email sent automatically.\r\n\
         .\r\n"
    )
    .into_bytes()
}
