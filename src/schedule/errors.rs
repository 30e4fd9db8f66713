use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScheduleError {
    /// A time value was NaN, which is not allowed
    #[error("Time value cannot be NaN")]
    NaNTime,

    /// New execution overlaps with an existing one on the same timeline
    #[error("Task #{new_task} overlaps with task #{existing_task} already on the timeline")]
    OverlapsExisting { new_task: usize, existing_task: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_display() {
        let e = ScheduleError::OverlapsExisting {
            new_task: 3,
            existing_task: 1,
        };
        assert_eq!(
            e.to_string(),
            "Task #3 overlaps with task #1 already on the timeline"
        );
    }
}
