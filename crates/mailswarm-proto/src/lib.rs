//! # mailswarm-proto
//!
//! Scripted SMTP and POP3 client sessions for load testing mail servers.
//!
//! Each client runs a fixed transcript: the SMTP client greets, sends one
//! message and quits; the POP3 client logs in, lists, retrieves message 1
//! and quits. Transcripts are plain data ([`Script`]) executed by a single
//! runner ([`Session`]), so both protocols share the same I/O path.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use mailswarm_proto::{ConsoleSink, Endpoint, Script, Session};
//! use mailswarm_proto::connection::connect;
//!
//! #[tokio::main]
//! async fn main() -> mailswarm_proto::Result<()> {
//!     let stream = connect(&Endpoint::smtp_default()).await?;
//!     let session = Session::new(stream, 1, Arc::new(ConsoleSink));
//!     session.run(&Script::smtp(1)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Reading replies
//!
//! ```text
//! ReadMode::Single             one read of up to 1024 bytes
//! ReadMode::UntilDotTerminator reads until "\r\n.\r\n" or "\n.\n"
//! ```
//!
//! ## Modules
//!
//! - [`command`]: SMTP and POP3 command builders
//! - [`connection`]: Endpoints, chunked streams and the session runner
//! - [`script`]: Fixed protocol transcripts as step lists
//! - [`transcript`]: Per-step output lines and sinks

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod script;
pub mod transcript;

pub use connection::{Endpoint, ProbeStream, Session, SessionStats};
pub use error::{Error, Result};
pub use script::{Protocol, ReadMode, Script, Step};
pub use transcript::{ConsoleSink, Entry, MemorySink, TranscriptLine, TranscriptSink};
