//! Fixed-size worker pool.
//!
//! Jobs wait in a single FIFO queue and are picked up by whichever worker is
//! free, so at most `workers` jobs run at once and admission follows
//! submission order. Completion order is unspecified.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::trace;

use crate::error::{Error, Result};

type Job<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Pool of worker tasks with an explicit start/submit/drain lifecycle.
///
/// Dropping the pool without calling [`WorkerPool::drain`] aborts the workers
/// and discards queued jobs.
pub struct WorkerPool<T> {
    queue: mpsc::UnboundedSender<Job<T>>,
    workers: JoinSet<Vec<T>>,
    size: usize,
}

impl<T> WorkerPool<T>
where
    T: Send + 'static,
{
    /// Spawns `workers` worker tasks on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoWorkers`] if `workers` is zero.
    pub fn start(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::NoWorkers);
        }

        let (tx, rx) = mpsc::unbounded_channel::<Job<T>>();
        let rx = Arc::new(Mutex::new(rx));
        let mut set = JoinSet::new();

        for worker in 0..workers {
            let rx = Arc::clone(&rx);
            set.spawn(async move {
                let mut outputs = Vec::new();
                loop {
                    // Only the worker holding the lock waits on the queue.
                    let job = rx.lock().await.recv().await;
                    let Some(job) = job else { break };
                    outputs.push(job.await);
                }
                trace!(worker, completed = outputs.len(), "worker exiting");
                outputs
            });
        }

        Ok(Self {
            queue: tx,
            workers: set,
            size: workers,
        })
    }

    /// Number of workers.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Queues a job without waiting for a free worker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolClosed`] if every worker has already exited.
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.queue
            .send(Box::pin(job))
            .map_err(|_| Error::PoolClosed)
    }

    /// Closes the queue, waits for every queued job to finish and returns
    /// their outputs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Worker`] if a worker panicked.
    pub async fn drain(self) -> Result<Vec<T>> {
        let Self {
            queue, mut workers, ..
        } = self;
        drop(queue);

        let mut outputs = Vec::new();
        while let Some(joined) = workers.join_next().await {
            outputs.extend(joined?);
        }
        Ok(outputs)
    }
}
