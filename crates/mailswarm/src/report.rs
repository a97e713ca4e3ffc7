//! Per-task outcomes and run totals.

use std::fmt;
use std::time::Duration;

use mailswarm_proto::{Protocol, SessionStats};

/// How a client task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Every step of the script completed.
    Completed(SessionStats),
    /// The task stopped at its first error.
    Failed {
        /// Error description, as written to the transcript.
        reason: String,
        /// Whether the failure was a read timeout.
        timed_out: bool,
    },
}

/// Result of one client task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    /// Protocol the client spoke.
    pub protocol: Protocol,
    /// Client sequence number.
    pub client_id: u32,
    /// How the task ended.
    pub status: TaskStatus,
    /// Wall time from connect to end.
    pub elapsed: Duration,
}

impl TaskOutcome {
    /// Creates a successful outcome.
    #[must_use]
    pub const fn completed(
        protocol: Protocol,
        client_id: u32,
        stats: SessionStats,
        elapsed: Duration,
    ) -> Self {
        Self {
            protocol,
            client_id,
            status: TaskStatus::Completed(stats),
            elapsed,
        }
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn failed(
        protocol: Protocol,
        client_id: u32,
        reason: impl Into<String>,
        timed_out: bool,
        elapsed: Duration,
    ) -> Self {
        Self {
            protocol,
            client_id,
            status: TaskStatus::Failed {
                reason: reason.into(),
                timed_out,
            },
            elapsed,
        }
    }

    /// Returns true if the task ran its whole script.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, TaskStatus::Completed(_))
    }
}

/// Aggregate counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// SMTP tasks that completed.
    pub smtp_succeeded: usize,
    /// SMTP tasks that failed.
    pub smtp_failed: usize,
    /// POP3 tasks that completed.
    pub pop3_succeeded: usize,
    /// POP3 tasks that failed.
    pub pop3_failed: usize,
    /// Failures caused by a read timeout.
    pub timed_out: usize,
    /// Bytes written by completed tasks.
    pub bytes_sent: usize,
    /// Bytes read by completed tasks.
    pub bytes_received: usize,
}

impl Summary {
    /// Total number of tasks.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.smtp_succeeded + self.smtp_failed + self.pop3_succeeded + self.pop3_failed
    }

    /// Total number of failed tasks.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.smtp_failed + self.pop3_failed
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SMTP {}/{} ok, POP3 {}/{} ok, {} timed out, {} bytes sent, {} bytes received",
            self.smtp_succeeded,
            self.smtp_succeeded + self.smtp_failed,
            self.pop3_succeeded,
            self.pop3_succeeded + self.pop3_failed,
            self.timed_out,
            self.bytes_sent,
            self.bytes_received,
        )
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    outcomes: Vec<TaskOutcome>,
    elapsed: Duration,
}

impl RunReport {
    /// Creates a report, ordering outcomes by client and protocol.
    #[must_use]
    pub fn new(mut outcomes: Vec<TaskOutcome>, elapsed: Duration) -> Self {
        outcomes.sort_by_key(|o| (o.client_id, o.protocol == Protocol::Pop3));
        Self { outcomes, elapsed }
    }

    /// Every task outcome.
    #[must_use]
    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    /// Outcomes of failed tasks.
    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Wall time of the whole run.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Tallies the outcomes.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for outcome in &self.outcomes {
            match (&outcome.status, outcome.protocol) {
                (TaskStatus::Completed(stats), protocol) => {
                    match protocol {
                        Protocol::Smtp => summary.smtp_succeeded += 1,
                        Protocol::Pop3 => summary.pop3_succeeded += 1,
                    }
                    summary.bytes_sent += stats.bytes_sent;
                    summary.bytes_received += stats.bytes_received;
                }
                (TaskStatus::Failed { timed_out, .. }, protocol) => {
                    match protocol {
                        Protocol::Smtp => summary.smtp_failed += 1,
                        Protocol::Pop3 => summary.pop3_failed += 1,
                    }
                    if *timed_out {
                        summary.timed_out += 1;
                    }
                }
            }
        }
        summary
    }
}
