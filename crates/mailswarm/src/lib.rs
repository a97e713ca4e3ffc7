//! # mailswarm
//!
//! Concurrent SMTP and POP3 load generator for local mail servers.
//!
//! A run launches `clients` SMTP sessions and `clients` POP3 sessions,
//! interleaved per client id, on a fixed-size worker pool. Each session
//! prints one line per step; a failed session prints one `Exception` line
//! and stops. Failures never abort the run; they are tallied in the
//! returned [`RunReport`].
//!
//! ```ignore
//! use std::sync::Arc;
//! use mailswarm::{Config, Dispatcher};
//! use mailswarm_proto::ConsoleSink;
//!
//! let report = Dispatcher::new(Config::default(), Arc::new(ConsoleSink))
//!     .run()
//!     .await?;
//! println!("{}", report.summary());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dispatcher;
mod error;
pub mod logging;
pub mod pool;
pub mod report;
pub mod task;

pub use config::{Cli, Config};
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use pool::WorkerPool;
pub use report::{RunReport, Summary, TaskOutcome, TaskStatus};
pub use task::run_client;
