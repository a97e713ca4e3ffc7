//! One client task: connect, run the script, record the outcome.

use std::sync::Arc;
use std::time::Instant;

use mailswarm_proto::connection::connect;
use mailswarm_proto::{
    Endpoint, Protocol, Script, Session, SessionStats, TranscriptLine, TranscriptSink,
};
use tracing::{debug, warn};

use crate::report::TaskOutcome;

/// Runs the fixed script for `protocol` as client `client_id`.
///
/// Failures are contained: the error is written to the transcript as a single
/// `Exception` line and returned as a failed outcome. The connection is
/// released before this returns, whatever the outcome.
pub async fn run_client(
    protocol: Protocol,
    client_id: u32,
    endpoint: &Endpoint,
    sink: Arc<dyn TranscriptSink>,
) -> TaskOutcome {
    let started = Instant::now();
    let script = Script::for_protocol(protocol, client_id);

    let result: mailswarm_proto::Result<SessionStats> = async {
        let stream = connect(endpoint).await?;
        debug!(client_id, %protocol, %endpoint, "connected");
        Session::new(stream, client_id, Arc::clone(&sink))
            .run(&script)
            .await
    }
    .await;

    let elapsed = started.elapsed();
    match result {
        Ok(stats) => {
            debug!(client_id, %protocol, steps = stats.steps, ?elapsed, "session complete");
            TaskOutcome::completed(protocol, client_id, stats, elapsed)
        }
        Err(err) => {
            sink.emit(TranscriptLine::exception(protocol, client_id, &err));
            warn!(client_id, %protocol, %endpoint, error = %err, "session failed");
            TaskOutcome::failed(protocol, client_id, err.to_string(), err.is_timeout(), elapsed)
        }
    }
}
