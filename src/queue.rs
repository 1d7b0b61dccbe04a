use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread::JoinHandle;

use crate::foundation::error::{LoaderError, LoaderResult};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Serializes build jobs onto one worker thread.
///
/// The `build` command queues one job per cell size; every job writes into the same output tree,
/// so two must never run at once. Jobs run in submission order; a failing (or panicking) job
/// reports through its [`JobHandle`] and the queue keeps going.
pub struct BuildQueue {
    tx: Option<mpsc::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    next_id: AtomicU64,
}

/// Receives the outcome of one submitted job.
#[derive(Debug)]
pub struct JobHandle<T> {
    id: u64,
    rx: mpsc::Receiver<LoaderResult<T>>,
}

impl<T> JobHandle<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Block until the job has run.
    pub fn wait(self) -> LoaderResult<T> {
        self.rx
            .recv()
            .map_err(|_| LoaderError::render(format!("build job {} was dropped", self.id)))?
    }
}

impl BuildQueue {
    pub fn new() -> LoaderResult<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        let worker = std::thread::Builder::new()
            .name("pixel-loader-build".into())
            .spawn(move || {
                for job in rx {
                    job();
                }
            })
            .map_err(|e| LoaderError::render(format!("failed to spawn build worker: {e}")))?;
        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            next_id: AtomicU64::new(0),
        })
    }

    /// Queue `job` behind everything submitted so far.
    pub fn submit<T, F>(&self, job: F) -> LoaderResult<JobHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> LoaderResult<T> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (done_tx, done_rx) = mpsc::channel();
        let wrapped: Job = Box::new(move || {
            tracing::debug!(job = id, "build job started");
            let result = std::panic::catch_unwind(AssertUnwindSafe(job))
                .unwrap_or_else(|_| Err(LoaderError::render(format!("build job {id} panicked"))));
            if let Err(e) = &result {
                tracing::warn!(job = id, error = %e, "build job failed");
            } else {
                tracing::debug!(job = id, "build job finished");
            }
            // The submitter may have dropped its handle.
            let _ = done_tx.send(result);
        });

        self.tx
            .as_ref()
            .ok_or_else(|| LoaderError::render("build queue is shut down"))?
            .send(wrapped)
            .map_err(|_| LoaderError::render("build worker has stopped"))?;
        Ok(JobHandle { id, rx: done_rx })
    }

    /// Run every queued job to completion and stop the worker.
    pub fn shutdown(mut self) -> LoaderResult<()> {
        self.stop()
    }

    fn stop(&mut self) -> LoaderResult<()> {
        drop(self.tx.take());
        match self.worker.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| LoaderError::render("build worker panicked")),
            None => Ok(()),
        }
    }
}

impl Drop for BuildQueue {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
#[path = "../tests/unit/queue.rs"]
mod tests;
