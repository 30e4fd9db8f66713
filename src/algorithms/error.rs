use std::time::Duration;

use thiserror::Error;

use crate::schedule::Schedule;

/// Why a scheduler did not return a schedule.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulerError {
    /// The time budget ran out; `partial` holds whatever had been committed.
    #[error("time budget of {budget:?} exceeded with {} assignment(s) committed", .partial.len())]
    TimeoutExceeded { budget: Duration, partial: Schedule },

    /// Any other failure inside the scheduler.
    #[error("scheduler fault: {message}")]
    Fault { message: String },
}

impl SchedulerError {
    pub fn fault(message: impl Into<String>) -> Self {
        SchedulerError::Fault {
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SchedulerError::TimeoutExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_counts_partial() {
        let err = SchedulerError::TimeoutExceeded {
            budget: Duration::from_secs(1),
            partial: Schedule::new(),
        };
        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "time budget of 1s exceeded with 0 assignment(s) committed"
        );
    }

    #[test]
    fn test_fault_message() {
        let err = SchedulerError::fault("boom");
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "scheduler fault: boom");
    }
}
