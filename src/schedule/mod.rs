//! Schedules produced by planners.
//!
//! A [`Schedule`] is plain data: an ordered list of [`Assignment`]s that is
//! meaningless until the feasibility engine has judged it. Planners build
//! schedules incrementally on per-platform [`Timeline`]s.

use std::collections::BTreeSet;

mod entry_key;
mod errors;
mod timeline;

pub use entry_key::{Entry, F64Key};
pub use errors::ScheduleError;
pub use timeline::Timeline;

use crate::units::Time;
use crate::window::TimeInterval;
use crate::Id;

#[cfg(test)]
mod tests;

/// One task execution: which task, on which platform, inside which window
/// (or sub-interval of one), starting when.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub task_id: Id,
    pub platform_id: Id,
    pub window: TimeInterval,
    pub start: Time,
}

impl Assignment {
    pub fn new(
        task_id: impl Into<Id>,
        platform_id: impl Into<Id>,
        window: TimeInterval,
        start: Time,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            platform_id: platform_id.into(),
            window,
            start,
        }
    }

    /// Starts at the beginning of `window`.
    pub fn at_window_start(task_id: impl Into<Id>, platform_id: impl Into<Id>, window: TimeInterval) -> Self {
        let start = window.start();
        Self::new(task_id, platform_id, window, start)
    }
}

/// Ordered sequence of assignments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    assignments: Vec<Assignment>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.assignments.iter()
    }

    pub fn contains_task(&self, task_id: &str) -> bool {
        self.assignments.iter().any(|a| a.task_id == task_id)
    }

    /// Distinct task ids, sorted.
    pub fn task_ids(&self) -> BTreeSet<&str> {
        self.assignments.iter().map(|a| a.task_id.as_str()).collect()
    }

    /// Assignments on one platform, with their index in the schedule.
    pub fn on_platform<'a>(&'a self, platform_id: &'a str) -> impl Iterator<Item = (usize, &'a Assignment)> + 'a {
        self.assignments
            .iter()
            .enumerate()
            .filter(move |(_, a)| a.platform_id == platform_id)
    }

    /// Sorts assignments by (platform, start, task) for stable presentation.
    pub fn sort_canonical(&mut self) {
        self.assignments.sort_by(|a, b| {
            a.platform_id
                .cmp(&b.platform_id)
                .then(a.start.value().total_cmp(&b.start.value()))
                .then(a.task_id.cmp(&b.task_id))
        });
    }
}

impl From<Vec<Assignment>> for Schedule {
    fn from(assignments: Vec<Assignment>) -> Self {
        Self { assignments }
    }
}

impl FromIterator<Assignment> for Schedule {
    fn from_iter<I: IntoIterator<Item = Assignment>>(iter: I) -> Self {
        Self {
            assignments: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Schedule {
    type Item = Assignment;
    type IntoIter = std::vec::IntoIter<Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.assignments.into_iter()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.assignments.iter()
    }
}
