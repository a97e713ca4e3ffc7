//! `mailswarm` - load test local SMTP and POP3 servers.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use mailswarm::{Cli, Config, Dispatcher};
use mailswarm_proto::ConsoleSink;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    mailswarm::logging::init();

    let config = Config::from(cli);
    let report = Dispatcher::new(config, Arc::new(ConsoleSink))
        .run()
        .await
        .context("load run aborted")?;

    for failure in report.failures() {
        debug!(
            client_id = failure.client_id,
            protocol = %failure.protocol,
            status = ?failure.status,
            "failed task"
        );
    }

    let summary = report.summary();
    info!(%summary, elapsed = ?report.elapsed(), "run complete");

    // Client failures are reported, not signalled through the exit code.
    Ok(())
}
