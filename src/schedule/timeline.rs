//! Per-platform timeline of non-overlapping executions.

use std::collections::BTreeMap;
use std::ops::Bound;

use super::entry_key::{Entry, F64Key};
use super::errors::ScheduleError;
use crate::units::Time;

/// Executions on one platform, sorted by start time and mutually disjoint.
///
/// Planners use a `Timeline` to find gaps and neighbours while they build a
/// schedule. Agility is not known here; callers account for transition times
/// through [`before`](Self::before) and [`at_or_after`](Self::at_or_after).
///
/// # Complexity
/// - `add`: O(log n) with O(1) neighbour overlap checks
/// - `remove_at`: O(log n)
/// - `before` / `at_or_after`: O(log n)
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    by_start: BTreeMap<F64Key, Entry>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_start.is_empty()
    }

    fn key(q: Time) -> Result<F64Key, ScheduleError> {
        let v = q.value();
        if v.is_nan() {
            Err(ScheduleError::NaNTime)
        } else {
            Ok(F64Key(v))
        }
    }

    /// Inserts an execution.
    ///
    /// Only the predecessor and successor need checking because the timeline
    /// is kept sorted and disjoint.
    pub fn add(&mut self, entry: Entry) -> Result<(), ScheduleError> {
        let start_k = Self::key(entry.interval.start())?;

        if let Some((_k, prev)) = self.by_start.range(..=start_k).next_back() {
            if prev.interval.overlaps(&entry.interval) {
                return Err(ScheduleError::OverlapsExisting {
                    new_task: entry.task,
                    existing_task: prev.task,
                });
            }
        }

        if let Some((_k, next)) = self.by_start.range(start_k..).next() {
            if next.interval.overlaps(&entry.interval) {
                return Err(ScheduleError::OverlapsExisting {
                    new_task: entry.task,
                    existing_task: next.task,
                });
            }
        }

        self.by_start.insert(start_k, entry);
        Ok(())
    }

    /// Removes the execution starting exactly at `start`.
    pub fn remove_at(&mut self, start: Time) -> Option<Entry> {
        let key = Self::key(start).ok()?;
        self.by_start.remove(&key)
    }

    /// Latest execution starting strictly before `at`.
    pub fn before(&self, at: Time) -> Option<&Entry> {
        let key = Self::key(at).ok()?;
        self.by_start
            .range((Bound::Unbounded, Bound::Excluded(key)))
            .next_back()
            .map(|(_k, e)| e)
    }

    /// Earliest execution starting at or after `at`.
    pub fn at_or_after(&self, at: Time) -> Option<&Entry> {
        let key = Self::key(at).ok()?;
        self.by_start.range(key..).next().map(|(_k, e)| e)
    }

    /// Executions in start order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.by_start.values()
    }
}
