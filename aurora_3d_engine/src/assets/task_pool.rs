/// Fixed-size worker pool with polled task status.
///
/// Workers pull jobs from a crossbeam channel. A task's user closure is
/// guarded by `catch_unwind` — a panic degrades the task to `Failed`
/// instead of killing the worker thread. Completion is communicated by
/// status only; there is no wakeup into the consuming thread, which
/// polls once per frame.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Sender};

use crate::engine_warn;

/// Lifecycle of a submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Queued, no worker has picked it up yet
    Pending,
    /// A worker is executing the closure
    Running,
    /// Finished; the result is ready to take
    Completed,
    /// The closure panicked (or the pool shut down before running it)
    Failed,
}

struct TaskState<T> {
    status: TaskStatus,
    result: Option<T>,
}

/// Handle to a submitted task. Cheap to clone; the result can be taken
/// exactly once after `status()` reports `Completed`.
pub struct Task<T> {
    state: Arc<Mutex<TaskState<T>>>,
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> Task<T> {
    /// Current status. Non-blocking.
    ///
    /// The mutex inside is the only memory-ordering barrier between
    /// the worker and the poller — a result is visible exactly when
    /// `Completed` is observed.
    pub fn status(&self) -> TaskStatus {
        self.state.lock().map(|s| s.status).unwrap_or(TaskStatus::Failed)
    }

    /// Take the result if the task has completed.
    ///
    /// Returns `None` while the task is still pending/running, after
    /// a failure, or if the result was already taken.
    pub fn take_result(&self) -> Option<T> {
        let mut state = self.state.lock().ok()?;
        if state.status == TaskStatus::Completed {
            state.result.take()
        } else {
            None
        }
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size thread pool executing task closures.
pub struct TaskPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl TaskPool {
    /// Spawn `worker_count` worker threads (at least 1).
    pub fn new(worker_count: usize) -> Self {
        let (sender, receiver) = unbounded::<Job>();
        let workers = (0..worker_count.max(1))
            .filter_map(|i| {
                let receiver = receiver.clone();
                let spawned = std::thread::Builder::new()
                    .name(format!("aurora3d-worker-{}", i))
                    .spawn(move || {
                        while let Ok(job) = receiver.recv() {
                            job();
                        }
                    });
                match spawned {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        engine_warn!(
                            "aurora3d::TaskPool",
                            "Failed to spawn worker thread {}: {}",
                            i,
                            e
                        );
                        None
                    }
                }
            })
            .collect();
        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// Submit a closure; returns a pollable task handle.
    pub fn submit<T, F>(&self, f: F) -> Task<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let state = Arc::new(Mutex::new(TaskState {
            status: TaskStatus::Pending,
            result: None,
        }));

        let worker_state = state.clone();
        let job: Job = Box::new(move || {
            if let Ok(mut s) = worker_state.lock() {
                s.status = TaskStatus::Running;
            }
            let outcome = catch_unwind(AssertUnwindSafe(f));
            if let Ok(mut s) = worker_state.lock() {
                match outcome {
                    Ok(value) => {
                        s.result = Some(value);
                        s.status = TaskStatus::Completed;
                    }
                    Err(_) => s.status = TaskStatus::Failed,
                }
            }
        });

        let sent = self
            .sender
            .as_ref()
            .map(|s| s.send(job).is_ok())
            .unwrap_or(false);
        if !sent {
            if let Ok(mut s) = state.lock() {
                s.status = TaskStatus::Failed;
            }
        }

        Task { state }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        // Closing the channel lets workers drain remaining jobs and exit
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
#[path = "task_pool_tests.rs"]
mod tests;
