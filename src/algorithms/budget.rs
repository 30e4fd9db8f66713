//! Wall-clock budget shared between a scheduler and its supervisor.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::error::SchedulerError;
use crate::schedule::Schedule;

/// Time limit of one `plan` call.
///
/// Schedulers call [`tick`](Self::tick) once per unit of work and stop as soon
/// as it reports expiry. The supervisor may also [`cancel`](Self::cancel) the
/// budget, which makes it expire immediately.
#[derive(Debug)]
pub struct TimeBudget {
    limit: Duration,
    started: Instant,
    iterations: AtomicU64,
    cancelled: AtomicBool,
}

impl TimeBudget {
    /// Starts the clock now.
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            started: Instant::now(),
            iterations: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
        }
    }

    /// A budget that only expires when cancelled.
    pub fn unlimited() -> Self {
        Self::new(Duration::MAX)
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed) || self.elapsed() >= self.limit
    }

    /// Counts one iteration and returns `true` if the budget has expired.
    pub fn tick(&self) -> bool {
        self.iterations.fetch_add(1, Ordering::Relaxed);
        self.is_expired()
    }

    /// Iterations counted so far.
    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Relaxed)
    }

    /// Makes the budget expire at the next check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// The timeout error carrying `partial`.
    pub fn exceeded(&self, partial: Schedule) -> SchedulerError {
        SchedulerError::TimeoutExceeded {
            budget: self.limit,
            partial,
        }
    }

    /// Fails with [`SchedulerError::TimeoutExceeded`] once expired, cloning
    /// `partial` into the error.
    pub fn check(&self, partial: &Schedule) -> Result<(), SchedulerError> {
        if self.is_expired() {
            Err(self.exceeded(partial.clone()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counts_iterations() {
        let budget = TimeBudget::unlimited();
        for _ in 0..5 {
            assert!(!budget.tick());
        }
        assert_eq!(budget.iterations(), 5);
        assert!(budget.check(&Schedule::new()).is_ok());
    }

    #[test]
    fn test_zero_budget_is_expired() {
        let budget = TimeBudget::new(Duration::ZERO);
        assert!(budget.tick());
        let err = budget.check(&Schedule::new()).unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_cancel_expires_budget() {
        let budget = TimeBudget::unlimited();
        assert!(!budget.is_expired());
        budget.cancel();
        assert!(budget.is_cancelled());
        assert!(budget.tick());
    }

    #[test]
    fn test_remaining_saturates() {
        let budget = TimeBudget::new(Duration::ZERO);
        assert_eq!(budget.remaining(), Duration::ZERO);
    }
}
