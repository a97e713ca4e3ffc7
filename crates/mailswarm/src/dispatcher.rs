//! Fans client tasks out over the worker pool.

use std::sync::Arc;
use std::time::Instant;

use mailswarm_proto::{Protocol, TranscriptSink};
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::pool::WorkerPool;
use crate::report::{RunReport, TaskOutcome};
use crate::task::run_client;

/// Launches every client of a run and collects their outcomes.
pub struct Dispatcher {
    config: Config,
    sink: Arc<dyn TranscriptSink>,
}

impl Dispatcher {
    /// Creates a dispatcher writing transcripts to `sink`.
    #[must_use]
    pub fn new(config: Config, sink: Arc<dyn TranscriptSink>) -> Self {
        Self { config, sink }
    }

    /// Runs the whole load.
    ///
    /// For each client id an SMTP task and then a POP3 task are queued; the
    /// pool decides when each one runs. Returns once every task has ended.
    ///
    /// # Errors
    ///
    /// Returns an error only if the worker pool itself fails. Client failures
    /// are reported in the returned [`RunReport`].
    pub async fn run(&self) -> Result<RunReport> {
        let started = Instant::now();
        let pool: WorkerPool<TaskOutcome> = WorkerPool::start(self.config.workers)?;

        info!(
            clients = self.config.clients,
            workers = pool.size(),
            smtp = %self.config.smtp,
            pop3 = %self.config.pop3,
            "starting run"
        );

        for client_id in 1..=self.config.clients {
            for protocol in [Protocol::Smtp, Protocol::Pop3] {
                let endpoint = self.config.endpoint(protocol).clone();
                let sink = Arc::clone(&self.sink);
                pool.submit(async move { run_client(protocol, client_id, &endpoint, sink).await })?;
            }
        }

        let outcomes = pool.drain().await?;
        Ok(RunReport::new(outcomes, started.elapsed()))
    }
}
