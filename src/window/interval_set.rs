//! A canonical container for disjoint, sorted intervals.
//!
//! [`IntervalSet`] wraps a `Vec<TimeInterval>` and keeps it sorted by start
//! with no two members overlapping or touching (touching members are merged).
//! Read access goes through `Deref<Target = [TimeInterval]>`.

use std::ops::Deref;

use qtty::Quantity;

use super::interval::TimeInterval;
use crate::units::Time;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalSet(Vec<TimeInterval>);

impl IntervalSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Sorts by start and merges overlapping / touching intervals in place.
    fn normalize(&mut self) {
        if self.0.len() <= 1 {
            return;
        }
        self.0
            .sort_by(|a, b| a.start().value().total_cmp(&b.start().value()));
        let mut merged: Vec<TimeInterval> = Vec::with_capacity(self.0.len());
        for interval in self.0.drain(..) {
            if let Some(last) = merged.last_mut() {
                // Overlapping or touching: extend the current run.
                if let Some(hull) = last.merge(&interval) {
                    *last = hull;
                    continue;
                }
            }
            merged.push(interval);
        }
        self.0 = merged;
    }

    /// Inserts an interval, maintaining canonical form.
    pub fn push(&mut self, interval: TimeInterval) {
        if let Some(last) = self.0.last_mut() {
            if interval.start().value() > last.end().value() {
                self.0.push(interval);
                return;
            }
            if interval.start().value() >= last.start().value() {
                if let Some(hull) = last.merge(&interval) {
                    *last = hull;
                    return;
                }
            }
            self.0.push(interval);
            self.normalize();
        } else {
            self.0.push(interval);
        }
    }

    /// Total time covered by the set.
    pub fn total_duration(&self) -> Time {
        Quantity::new(self.0.iter().map(|i| i.duration().value()).sum())
    }

    /// Share of `within` covered by the set, in `[0, 1]`.
    pub fn fraction_of(&self, within: &TimeInterval) -> f64 {
        let covered: f64 = self
            .0
            .iter()
            .filter_map(|member| member.intersection(within))
            .map(|common| common.duration().value())
            .sum();
        covered / within.duration().value()
    }
}

impl Deref for IntervalSet {
    type Target = [TimeInterval];

    fn deref(&self) -> &[TimeInterval] {
        &self.0
    }
}

impl From<Vec<TimeInterval>> for IntervalSet {
    /// Creates an `IntervalSet` from an unsorted `Vec`, normalizing on construction.
    fn from(vec: Vec<TimeInterval>) -> Self {
        let mut set = Self(vec);
        set.normalize();
        set
    }
}

impl FromIterator<TimeInterval> for IntervalSet {
    fn from_iter<I: IntoIterator<Item = TimeInterval>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a IntervalSet {
    type Item = &'a TimeInterval;
    type IntoIter = std::slice::Iter<'a, TimeInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
