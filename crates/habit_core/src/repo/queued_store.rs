//! Background writer wrapper for key-value stores.
//!
//! # Responsibility
//! - Move blob writes off the caller's thread (fire-and-forget).
//! - Report background write failures on `flush`.
//!
//! # Invariants
//! - One worker thread consumes one channel, so writes apply in FIFO order and
//!   a stale blob never overwrites a newer one.
//! - Reads are queued behind pending writes and observe the latest value.
//! - Dropping the wrapper drains the queue before the worker exits.

use super::kv_store::{KeyValueStore, StoreError, StoreResult};
use log::{info, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

enum Job {
    Write {
        key: String,
        value: String,
    },
    Read {
        key: String,
        reply: Sender<StoreResult<Option<String>>>,
    },
    Flush {
        reply: Sender<Option<StoreError>>,
    },
}

/// Wraps a store so writes are applied by a dedicated thread.
pub struct QueuedKvStore {
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl QueuedKvStore {
    /// Moves `inner` onto a new writer thread.
    pub fn spawn<S>(inner: S) -> StoreResult<Self>
    where
        S: KeyValueStore + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("habit-store-writer".to_string())
            .spawn(move || run_worker(inner, receiver))
            .map_err(|err| StoreError::Unavailable(format!("failed to spawn writer: {err}")))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Blocks until every queued write has been applied.
    ///
    /// Returns the first write failure observed since the previous flush.
    pub fn flush(&self) -> StoreResult<()> {
        let (reply, response) = mpsc::channel();
        self.send(Job::Flush { reply })?;
        match response.recv() {
            Ok(None) => Ok(()),
            Ok(Some(err)) => Err(err),
            Err(_) => Err(StoreError::WorkerStopped),
        }
    }

    fn send(&self, job: Job) -> StoreResult<()> {
        let sender = self.sender.as_ref().ok_or(StoreError::WorkerStopped)?;
        sender.send(job).map_err(|_| StoreError::WorkerStopped)
    }
}

impl KeyValueStore for QueuedKvStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let (reply, response) = mpsc::channel();
        self.send(Job::Read {
            key: key.to_string(),
            reply,
        })?;
        response.recv().map_err(|_| StoreError::WorkerStopped)?
    }

    /// Enqueues the write and returns before it is applied.
    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        self.send(Job::Write {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

impl Drop for QueuedKvStore {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop after the backlog drains.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("event=kv_writer_stop module=repo status=error error_code=worker_panicked");
            }
        }
    }
}

fn run_worker<S: KeyValueStore>(inner: S, receiver: Receiver<Job>) {
    let mut first_failure: Option<StoreError> = None;
    let mut applied: u64 = 0;

    for job in receiver {
        match job {
            Job::Write { key, value } => match inner.write(&key, &value) {
                Ok(()) => applied += 1,
                Err(err) => {
                    warn!(
                        "event=kv_write module=repo status=error mode=queued bytes={} error={}",
                        value.len(),
                        err
                    );
                    first_failure.get_or_insert(err);
                }
            },
            Job::Read { key, reply } => {
                let _ = reply.send(inner.read(&key));
            }
            Job::Flush { reply } => {
                let _ = reply.send(first_failure.take());
            }
        }
    }

    info!("event=kv_writer_stop module=repo status=ok applied_writes={applied}");
}
