// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::JobError;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Configuration for the [`JobQueue`].
#[derive(Debug, Clone)]
pub struct JobQueueConfig {
    /// Number of worker threads. Zero runs every job inline on the
    /// submitting thread.
    pub workers: usize,
    /// Prefix for worker thread names.
    pub thread_name: String,
}

impl Default for JobQueueConfig {
    fn default() -> Self {
        let parallelism = thread::available_parallelism().map_or(1, |n| n.get());
        Self {
            // Leave one core for the main simulation thread.
            workers: parallelism.saturating_sub(1),
            thread_name: "ember-worker".to_string(),
        }
    }
}

/// A fixed-size pool of worker threads executing submitted closures.
pub struct JobQueue {
    sender: Option<Sender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
    in_flight: Arc<AtomicUsize>,
}

impl JobQueue {
    /// Creates a queue and spawns its workers.
    pub fn new(config: JobQueueConfig) -> Self {
        if config.workers == 0 {
            log::info!("JobQueue: no workers requested, jobs will run inline.");
            return Self::inline();
        }

        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let mut workers = Vec::with_capacity(config.workers);

        for index in 0..config.workers {
            let receiver: Receiver<Job> = receiver.clone();
            let spawned = thread::Builder::new()
                .name(format!("{}-{index}", config.thread_name))
                .spawn(move || {
                    log::trace!("Job worker {index} started.");
                    while let Ok(job) = receiver.recv() {
                        job();
                    }
                    log::trace!("Job worker {index} stopped.");
                });

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => log::error!("JobQueue: failed to spawn worker {index}: {e}"),
            }
        }

        if workers.is_empty() {
            log::warn!("JobQueue: no worker could be spawned, falling back to inline execution.");
            return Self::inline();
        }

        log::info!("JobQueue started with {} workers.", workers.len());
        Self {
            sender: Some(sender),
            workers,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a queue without workers. Every job runs on the caller's thread.
    pub fn inline() -> Self {
        Self {
            sender: None,
            workers: Vec::new(),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the number of worker threads.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Returns `true` if submitted jobs may run on another thread.
    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.sender.is_some()
    }

    /// Returns the number of submitted jobs that have not finished yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submits a closure and returns a handle to its result.
    ///
    /// A panic inside the closure is caught and reported through
    /// [`JobHandle::join`]; it never takes a worker down.
    pub fn submit<F, R>(&self, f: F) -> JobHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::AcqRel);

        let job: Job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(f)).map_err(panic_message);
            in_flight.fetch_sub(1, Ordering::AcqRel);
            // The handle may already be gone; the result is simply dropped.
            let _ = result_tx.send(result);
        });

        match &self.sender {
            Some(sender) => {
                if let Err(e) = sender.send(job) {
                    log::error!("JobQueue: workers disconnected, running job inline.");
                    (e.into_inner())();
                }
            }
            None => job(),
        }

        JobHandle {
            receiver: result_rx,
        }
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new(JobQueueConfig::default())
    }
}

impl Drop for JobQueue {
    fn drop(&mut self) {
        // Closing the channel lets every worker drain and exit.
        self.sender.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("JobQueue: a worker thread panicked during shutdown.");
            }
        }
    }
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue")
            .field("workers", &self.workers.len())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// A handle to the eventual result of a submitted job.
#[must_use = "a job handle must be joined to observe completion"]
pub struct JobHandle<R> {
    receiver: Receiver<Result<R, JobError>>,
}

impl<R> JobHandle<R> {
    /// Blocks until the job completes.
    pub fn join(self) -> Result<R, JobError> {
        self.receiver
            .recv()
            .map_err(|_| JobError::Disconnected)
            .and_then(|result| result)
    }

    /// Blocks until the job completes or `timeout` elapses.
    pub fn join_timeout(self, timeout: Duration) -> Result<R, JobError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(JobError::TimedOut(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(JobError::Disconnected),
        }
    }

    /// Returns `true` once the result is available.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !self.receiver.is_empty()
    }
}

/// Joins every handle, in order, sharing one optional deadline.
///
/// This is the fork-join barrier: it returns only after all jobs completed,
/// or with the first error encountered.
pub fn join_all<R>(
    handles: impl IntoIterator<Item = JobHandle<R>>,
    timeout: Option<Duration>,
) -> Result<Vec<R>, JobError> {
    let deadline = timeout.map(|t| (Instant::now() + t, t));
    let mut results = Vec::new();

    for handle in handles {
        let result = match deadline {
            Some((at, total)) => {
                let remaining = at.saturating_duration_since(Instant::now());
                handle
                    .join_timeout(remaining)
                    .map_err(|e| match e {
                        JobError::TimedOut(_) => JobError::TimedOut(total),
                        other => other,
                    })?
            }
            None => handle.join()?,
        };
        results.push(result);
    }

    Ok(results)
}

fn panic_message(payload: Box<dyn Any + Send>) -> JobError {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    JobError::Panicked(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    fn parallel_queue() -> JobQueue {
        JobQueue::new(JobQueueConfig {
            workers: 4,
            thread_name: "test-worker".to_string(),
        })
    }

    #[test]
    fn inline_queue_runs_on_caller_thread() {
        let queue = JobQueue::new(JobQueueConfig {
            workers: 0,
            ..Default::default()
        });
        assert!(!queue.is_parallel());
        let caller = thread::current().id();
        let handle = queue.submit(move || thread::current().id() == caller);
        assert!(handle.join().unwrap());
    }

    #[test]
    fn parallel_queue_returns_results() {
        let queue = parallel_queue();
        assert_eq!(queue.worker_count(), 4);
        let handles: Vec<_> = (0..32).map(|i| queue.submit(move || i * 2)).collect();
        let results = join_all(handles, None).unwrap();
        assert_eq!(results, (0..32).map(|i| i * 2).collect::<Vec<_>>());
        assert_eq!(queue.in_flight(), 0);
    }

    #[test]
    fn panicking_job_is_reported_not_propagated() {
        let queue = parallel_queue();
        let handle = queue.submit(|| -> u32 { panic!("boom") });
        assert_eq!(handle.join(), Err(JobError::Panicked("boom".to_string())));

        // The worker survived and keeps serving jobs.
        let handle = queue.submit(|| 7);
        assert_eq!(handle.join(), Ok(7));
    }

    #[test]
    fn join_timeout_reports_slow_jobs() {
        let queue = parallel_queue();
        let release = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&release);
        let handle = queue.submit(move || {
            while !flag.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(1));
            }
        });

        let timeout = Duration::from_millis(20);
        assert_eq!(handle.join_timeout(timeout), Err(JobError::TimedOut(timeout)));
        release.store(true, Ordering::Release);
    }

    #[test]
    fn join_all_stops_at_first_error() {
        let queue = parallel_queue();
        let handles = vec![
            queue.submit(|| 1),
            queue.submit(|| -> i32 { panic!("second") }),
            queue.submit(|| 3),
        ];
        let err = join_all(handles, Some(Duration::from_secs(5))).unwrap_err();
        assert_eq!(err, JobError::Panicked("second".to_string()));
    }

    #[test]
    fn dropping_the_queue_joins_workers() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let queue = parallel_queue();
            for _ in 0..16 {
                let counter = Arc::clone(&counter);
                let _ = queue.submit(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
        }
        // Workers drain the channel before exiting.
        assert_eq!(counter.load(Ordering::SeqCst), 16);
    }
}
