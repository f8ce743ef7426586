//! Bounded worker pool that fans clone jobs out across a fixed number of workers
//!
//! The pool owns a single job queue, `W` long-lived workers and one
//! [`CompletionBarrier`]. Every job is handed to exactly one worker and the
//! caller waits on the barrier until all jobs are processed.
//!
//! A "destination exists" error only skips the job. Any other clone error is
//! fatal: it is broadcast through a shared [`CancellationToken`], workers stop
//! pulling jobs, in-flight clones are asked to abort and [`CloneDispatcher::dispatch`]
//! returns the first fatal error.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::barrier::CompletionBarrier;
use super::config::{CANCEL_GRACE_PERIOD_SECS, JOB_QUEUE_CAPACITY};
use super::job::RepositoryJob;
use super::stats::CloneStatistics;
use crate::git::{CloneError, CloneOutcome};

/// Something that can clone a single repository
///
/// Clones run on tokio's blocking pool, so implementations may block freely.
/// Long-running implementations should poll `cancel` and return
/// [`CloneError::Cancelled`] once it fires.
pub trait Cloner: Send + Sync + 'static {
    fn clone_repo(&self, job: &RepositoryJob, cancel: &CancellationToken) -> Result<(), CloneError>;
}

impl<F> Cloner for F
where
    F: Fn(&RepositoryJob) -> Result<(), CloneError> + Send + Sync + 'static,
{
    fn clone_repo(&self, job: &RepositoryJob, _cancel: &CancellationToken) -> Result<(), CloneError> {
        self(job)
    }
}

/// Errors that stop a dispatch run
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("failed to clone {repo}")]
    Fatal {
        repo: String,
        #[source]
        source: CloneError,
    },

    #[error("clone task for {repo} panicked")]
    Panicked { repo: String },
}

type FatalSlot = Arc<Mutex<Option<DispatchError>>>;

/// State shared by every worker in a run
struct WorkerContext<C> {
    queue: tokio::sync::Mutex<mpsc::Receiver<RepositoryJob>>,
    cloner: Arc<C>,
    barrier: CompletionBarrier,
    cancel: CancellationToken,
    fatal: FatalSlot,
    statistics: Arc<CloneStatistics>,
}

/// Distributes clone jobs across a fixed pool of workers
pub struct CloneDispatcher<C> {
    cloner: Arc<C>,
    workers: usize,
    statistics: Arc<CloneStatistics>,
}

impl<C: Cloner> CloneDispatcher<C> {
    pub fn new(cloner: C, workers: usize) -> Self {
        Self {
            cloner: Arc::new(cloner),
            workers,
            statistics: Arc::new(CloneStatistics::new()),
        }
    }

    /// Statistics collected by this dispatcher across runs
    pub fn statistics(&self) -> Arc<CloneStatistics> {
        Arc::clone(&self.statistics)
    }

    /// Clones every job and waits for the pool to finish
    ///
    /// Returns `Ok` when every job was cloned or skipped, or the first fatal
    /// error. After a fatal error the remaining jobs may or may not have been
    /// attempted.
    pub async fn dispatch(&self, jobs: Vec<RepositoryJob>) -> Result<(), DispatchError> {
        if self.workers == 0 {
            return Err(DispatchError::NoWorkers);
        }

        let (sender, receiver) = mpsc::channel(JOB_QUEUE_CAPACITY);
        let context = Arc::new(WorkerContext {
            queue: tokio::sync::Mutex::new(receiver),
            cloner: Arc::clone(&self.cloner),
            barrier: CompletionBarrier::new(jobs.len()),
            cancel: CancellationToken::new(),
            fatal: Arc::new(Mutex::new(None)),
            statistics: Arc::clone(&self.statistics),
        });

        debug!(jobs = jobs.len(), workers = self.workers, "Starting clone workers");
        let handles: Vec<_> = (0..self.workers)
            .map(|worker_id| tokio::spawn(run_worker(worker_id, Arc::clone(&context))))
            .collect();

        // Producer: suspends whenever every worker is busy and the queue is full
        for job in jobs {
            tokio::select! {
                biased;
                () = context.cancel.cancelled() => break,
                sent = sender.send(job) => {
                    if sent.is_err() {
                        break;
                    }
                }
            }
        }
        drop(sender);

        tokio::select! {
            () = context.barrier.wait() => {}
            () = context.cancel.cancelled() => {}
        }

        if context.cancel.is_cancelled() {
            let grace = Duration::from_secs(CANCEL_GRACE_PERIOD_SECS);
            if tokio::time::timeout(grace, join_all(handles)).await.is_err() {
                warn!("Abandoning clones still in flight after {}s", CANCEL_GRACE_PERIOD_SECS);
            }
        } else {
            join_all(handles).await;
        }

        let fatal = context
            .fatal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match fatal {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Pulls jobs off the shared queue until it is closed and drained, or the run is cancelled
async fn run_worker<C: Cloner>(worker_id: usize, context: Arc<WorkerContext<C>>) {
    loop {
        let job = {
            let mut queue = context.queue.lock().await;
            tokio::select! {
                biased;
                () = context.cancel.cancelled() => None,
                job = queue.recv() => job,
            }
        };
        let Some(job) = job else {
            break;
        };

        info!(worker = worker_id, "Working on: {}", job.name);

        let cloner = Arc::clone(&context.cloner);
        let token = context.cancel.clone();
        let task_job = job.clone();
        let result =
            tokio::task::spawn_blocking(move || cloner.clone_repo(&task_job, &token)).await;

        match result {
            Ok(Ok(())) => {
                let outcome = CloneOutcome::Cloned;
                info!(worker = worker_id, "{} {} {}", outcome.symbol(), job.name, outcome.text());
                context.statistics.record(&job.name, &outcome);
            }
            Ok(Err(err)) if err.is_skip() => {
                warn!(worker = worker_id, "{} {}: {}", CloneOutcome::Skipped.symbol(), job.name, err);
                context.statistics.record(&job.name, &CloneOutcome::Skipped);
            }
            Ok(Err(CloneError::Cancelled)) if context.cancel.is_cancelled() => {
                debug!(worker = worker_id, "Abandoned {} after cancellation", job.name);
                break;
            }
            Ok(Err(err)) => {
                error!(worker = worker_id, "🔴 {}: {}", job.name, err);
                context.statistics.record_failure(&job.name, &err.to_string());
                fail(
                    &context,
                    DispatchError::Fatal {
                        repo: job.name.clone(),
                        source: err,
                    },
                );
                break;
            }
            Err(join_err) => {
                error!(worker = worker_id, "🔴 {}: clone task failed: {}", job.name, join_err);
                context.statistics.record_failure(&job.name, &join_err.to_string());
                fail(&context, DispatchError::Panicked { repo: job.name.clone() });
                break;
            }
        }

        context.barrier.release();
    }

    debug!(worker = worker_id, "Worker finished");
}

/// Records the first fatal error of the run and cancels every worker
fn fail<C>(context: &WorkerContext<C>, err: DispatchError) {
    {
        let mut slot = context.fatal.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(err);
        }
    }
    context.cancel.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn jobs(names: &[&str]) -> Vec<RepositoryJob> {
        names.iter().map(|name| RepositoryJob::new("org", *name)).collect()
    }

    #[tokio::test]
    async fn test_zero_workers_is_rejected() {
        let dispatcher = CloneDispatcher::new(|_: &RepositoryJob| -> Result<(), CloneError> { Ok(()) }, 0);
        let result = dispatcher.dispatch(jobs(&["a"])).await;
        assert!(matches!(result, Err(DispatchError::NoWorkers)));
    }

    #[tokio::test]
    async fn test_empty_job_list_completes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let dispatcher = CloneDispatcher::new(
            move |_: &RepositoryJob| -> Result<(), CloneError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            4,
        );

        dispatcher.dispatch(Vec::new()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_more_workers_than_jobs() {
        let dispatcher = CloneDispatcher::new(|_: &RepositoryJob| -> Result<(), CloneError> { Ok(()) }, 16);
        dispatcher.dispatch(jobs(&["a", "b"])).await.unwrap();
        assert_eq!(dispatcher.statistics().cloned(), 2);
    }

    #[tokio::test]
    async fn test_unexpected_cancelled_error_is_fatal() {
        let dispatcher = CloneDispatcher::new(
            |_: &RepositoryJob| -> Result<(), CloneError> { Err(CloneError::Cancelled) },
            1,
        );
        let result = dispatcher.dispatch(jobs(&["a"])).await;
        assert!(matches!(result, Err(DispatchError::Fatal { .. })));
    }

    #[tokio::test]
    async fn test_panicking_clone_is_fatal() {
        let dispatcher = CloneDispatcher::new(
            |job: &RepositoryJob| -> Result<(), CloneError> { panic!("boom on {}", job.name) },
            2,
        );
        let result = dispatcher.dispatch(jobs(&["a", "b"])).await;
        assert!(matches!(result, Err(DispatchError::Panicked { .. })));
    }
}
