//! Runs one `plan` call on a worker thread under a deadline.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::warn;

use crate::algorithms::{SchedulerError, SchedulerFactory, TimeBudget};
use crate::model::ProblemInstance;
use crate::schedule::Schedule;

/// What the worker sent back.
#[derive(Debug)]
pub(crate) enum Answer {
    Planned(Result<Schedule, SchedulerError>),
    Panicked(String),
    /// No answer within budget plus grace; the worker was detached.
    Silent,
}

#[derive(Debug)]
pub(crate) struct Supervised {
    pub answer: Answer,
    /// Time until the worker answered, or until it was detached.
    pub wall_time: Duration,
    pub iterations: u64,
}

pub(crate) struct Job {
    pub instance: Arc<ProblemInstance>,
    pub scheduler: String,
    pub factory: SchedulerFactory,
    pub seed: u64,
}

/// Runs `job` on its own thread and waits at most `time_budget + grace`.
///
/// A worker that does not answer in time has its budget cancelled and is left
/// to finish on its own; its eventual answer is discarded.
pub(crate) fn supervise(job: &Job, time_budget: Duration, grace: Duration) -> Supervised {
    let budget = Arc::new(TimeBudget::new(time_budget));
    let (tx, rx) = mpsc::channel();

    let worker_budget = Arc::clone(&budget);
    let instance = Arc::clone(&job.instance);
    let factory = Arc::clone(&job.factory);
    let seed = job.seed;
    let spawned = thread::Builder::new()
        .name(format!("satplan-{}-{}", job.scheduler, seed))
        .spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                let scheduler = factory();
                scheduler.plan(&instance, &worker_budget, seed)
            }));
            let answered_at = worker_budget.elapsed();
            let answer = match result {
                Ok(planned) => Answer::Planned(planned),
                Err(payload) => Answer::Panicked(panic_message(payload.as_ref())),
            };
            // The supervisor may have given up already.
            let _ = tx.send((answer, answered_at));
        });

    let handle = match spawned {
        Ok(handle) => handle,
        Err(e) => {
            return Supervised {
                answer: Answer::Panicked(format!("could not spawn worker thread: {e}")),
                wall_time: budget.elapsed(),
                iterations: 0,
            }
        }
    };

    let (answer, wall_time) = match rx.recv_timeout(time_budget.saturating_add(grace)) {
        Ok(answered) => {
            let _ = handle.join();
            answered
        }
        Err(RecvTimeoutError::Timeout) => {
            budget.cancel();
            warn!(
                "{} on {} (seed {}) did not answer within {:?}; detaching worker",
                job.scheduler,
                job.instance.name(),
                seed,
                time_budget.saturating_add(grace)
            );
            (Answer::Silent, budget.elapsed())
        }
        Err(RecvTimeoutError::Disconnected) => (
            Answer::Panicked("worker exited without answering".into()),
            budget.elapsed(),
        ),
    };

    Supervised {
        answer,
        wall_time,
        iterations: budget.iterations(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
