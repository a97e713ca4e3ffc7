//! Runs one script over one connection.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

use super::ProbeStream;
use crate::error::Result;
use crate::script::{ReadMode, Script};
use crate::transcript::{TranscriptLine, TranscriptSink};

/// Counters for a completed session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Steps run to completion.
    pub steps: usize,
    /// Requests written.
    pub requests: usize,
    /// Bytes written.
    pub bytes_sent: usize,
    /// Bytes read.
    pub bytes_received: usize,
}

/// A client session that owns its connection until it ends.
///
/// [`Session::run`] consumes the session, so the connection is released on
/// every exit path, including errors part-way through the script.
pub struct Session<S> {
    stream: ProbeStream<S>,
    client_id: u32,
    sink: Arc<dyn TranscriptSink>,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a session for client `client_id`.
    pub fn new(stream: ProbeStream<S>, client_id: u32, sink: Arc<dyn TranscriptSink>) -> Self {
        Self {
            stream,
            client_id,
            sink,
        }
    }

    /// Executes every step of `script` in order.
    ///
    /// Logged steps emit one transcript line with the trimmed reply. The
    /// first failure aborts the remaining steps and is returned; nothing is
    /// emitted for it here.
    ///
    /// # Errors
    ///
    /// Returns an error if any write, read or decode fails.
    pub async fn run(mut self, script: &Script) -> Result<SessionStats> {
        let protocol = script.protocol();
        let mut stats = SessionStats::default();

        for step in script.steps() {
            if let Some(request) = &step.request {
                trace!(client_id = self.client_id, %protocol, step = step.label, "sending request");
                self.stream.send(request).await?;
                stats.requests += 1;
                stats.bytes_sent += request.len();
            }

            let raw = match step.read {
                ReadMode::Single => self.stream.read_chunk().await?,
                ReadMode::UntilDotTerminator => self.stream.read_until_terminator().await?.to_vec(),
            };
            stats.bytes_received += raw.len();
            let reply = String::from_utf8(raw)?;

            if step.logged {
                self.sink.emit(TranscriptLine::step(
                    protocol,
                    self.client_id,
                    step.label,
                    &reply,
                ));
            } else {
                debug!(
                    client_id = self.client_id,
                    %protocol,
                    step = step.label,
                    reply = reply.trim(),
                    "multi-line reply complete"
                );
            }
            stats.steps += 1;
        }

        if let Err(err) = self.stream.shutdown().await {
            debug!(
                client_id = self.client_id,
                %protocol,
                error = %err,
                "shutdown after QUIT failed"
            );
        }

        Ok(stats)
    }
}
