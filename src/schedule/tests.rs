//! Test suite for schedules and platform timelines.

use super::*;
use crate::units::secs;

/// Helper to create intervals more concisely in tests.
fn iv(start: f64, end: f64) -> TimeInterval {
    TimeInterval::from_secs(start, end).unwrap()
}

/// Helper to create a timeline entry whose window equals its execution.
fn entry(task: usize, start: f64, end: f64) -> Entry {
    Entry::new(task, iv(start, end), iv(start, end))
}

#[cfg(test)]
mod schedule_basics {
    use super::*;

    #[test]
    fn test_new_schedule_is_empty() {
        let schedule = Schedule::new();
        assert!(schedule.is_empty());
        assert_eq!(schedule.len(), 0);
    }

    #[test]
    fn test_push_keeps_order() {
        let mut schedule = Schedule::new();
        schedule.push(Assignment::at_window_start("b", "sat-1", iv(50.0, 60.0)));
        schedule.push(Assignment::at_window_start("a", "sat-1", iv(0.0, 10.0)));
        let ids: Vec<&str> = schedule.iter().map(|a| a.task_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_task_ids_are_distinct_and_sorted() {
        let schedule: Schedule = vec![
            Assignment::at_window_start("b", "sat-1", iv(0.0, 10.0)),
            Assignment::at_window_start("a", "sat-2", iv(0.0, 10.0)),
            Assignment::at_window_start("b", "sat-1", iv(20.0, 30.0)),
        ]
        .into();
        let ids: Vec<&str> = schedule.task_ids().into_iter().collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(schedule.contains_task("a"));
        assert!(!schedule.contains_task("c"));
    }

    #[test]
    fn test_on_platform_reports_indices() {
        let schedule: Schedule = vec![
            Assignment::at_window_start("a", "sat-1", iv(0.0, 10.0)),
            Assignment::at_window_start("b", "sat-2", iv(0.0, 10.0)),
            Assignment::at_window_start("c", "sat-1", iv(20.0, 30.0)),
        ]
        .into();
        let idx: Vec<usize> = schedule.on_platform("sat-1").map(|(i, _)| i).collect();
        assert_eq!(idx, vec![0, 2]);
    }

    #[test]
    fn test_sort_canonical() {
        let mut schedule: Schedule = vec![
            Assignment::at_window_start("x", "sat-2", iv(0.0, 10.0)),
            Assignment::at_window_start("y", "sat-1", iv(30.0, 40.0)),
            Assignment::at_window_start("z", "sat-1", iv(0.0, 10.0)),
        ]
        .into();
        schedule.sort_canonical();
        let ids: Vec<&str> = schedule.iter().map(|a| a.task_id.as_str()).collect();
        assert_eq!(ids, vec!["z", "y", "x"]);
    }
}

#[cfg(test)]
mod timeline_overlap_detection {
    use super::*;

    #[test]
    fn test_non_overlapping_entries() {
        let mut timeline = Timeline::new();
        timeline.add(entry(0, 0.0, 10.0)).unwrap();
        timeline.add(entry(1, 10.1, 20.0)).unwrap();
        timeline.add(entry(2, 20.1, 30.0)).unwrap();
        assert_eq!(timeline.len(), 3);
    }

    #[test]
    fn test_overlapping_entry_rejected() {
        let mut timeline = Timeline::new();
        timeline.add(entry(0, 0.0, 10.0)).unwrap();
        let result = timeline.add(entry(1, 5.0, 15.0));
        assert_eq!(
            result,
            Err(ScheduleError::OverlapsExisting {
                new_task: 1,
                existing_task: 0
            })
        );
    }

    #[test]
    fn test_touching_entries_at_boundary() {
        let mut timeline = Timeline::new();
        timeline.add(entry(0, 0.0, 10.0)).unwrap();
        // Half-open: [0, 10) and [10, 20) share no instant.
        assert!(timeline.add(entry(1, 10.0, 20.0)).is_ok());
    }

    #[test]
    fn test_contained_and_containing_rejected() {
        let mut timeline = Timeline::new();
        timeline.add(entry(0, 10.0, 20.0)).unwrap();
        assert!(timeline.add(entry(1, 12.0, 18.0)).is_err());
        assert!(timeline.add(entry(2, 0.0, 100.0)).is_err());
    }
}

#[cfg(test)]
mod timeline_queries {
    use super::*;

    fn sample() -> Timeline {
        let mut timeline = Timeline::new();
        timeline.add(entry(0, 0.0, 10.0)).unwrap();
        timeline.add(entry(1, 20.0, 30.0)).unwrap();
        timeline.add(entry(2, 40.0, 50.0)).unwrap();
        timeline
    }

    #[test]
    fn test_neighbours() {
        let timeline = sample();
        assert_eq!(timeline.before(secs(20.0)).unwrap().task(), 0);
        assert_eq!(timeline.before(secs(21.0)).unwrap().task(), 1);
        assert!(timeline.before(secs(0.0)).is_none());
        assert_eq!(timeline.at_or_after(secs(20.0)).unwrap().task(), 1);
        assert_eq!(timeline.at_or_after(secs(31.0)).unwrap().task(), 2);
        assert!(timeline.at_or_after(secs(41.0)).is_none());
    }

    #[test]
    fn test_remove_at_exact_start() {
        let mut timeline = sample();
        let removed = timeline.remove_at(secs(20.0)).unwrap();
        assert_eq!(removed.task(), 1);
        assert_eq!(timeline.len(), 2);
        assert!(timeline.remove_at(secs(21.0)).is_none());
        assert_eq!(timeline.at_or_after(secs(11.0)).unwrap().task(), 2);
        timeline.add(entry(3, 15.0, 35.0)).unwrap();
        assert_eq!(timeline.before(secs(40.0)).unwrap().task(), 3);
    }
}
