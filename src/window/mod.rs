//! Interval arithmetic over absolute time.
//!
//! Everything here is pure and deterministic. [`TimeInterval`] is half-open
//! (`[start, end)`), so two intervals that merely touch never overlap.
//! [`IntervalSet`] keeps a canonical, merged collection of intervals and is
//! used for coverage computations.

mod error;
mod interval;
mod interval_set;

pub use error::IntervalError;
pub use interval::TimeInterval;
pub use interval_set::IntervalSet;

use crate::units::Time;

/// Returns `true` iff `a` and `b` share at least one instant.
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.overlaps(b)
}

/// Returns the overlapping sub-interval of `a` and `b`, if any.
pub fn intersect(a: &TimeInterval, b: &TimeInterval) -> Option<TimeInterval> {
    a.intersection(b)
}

/// Returns `a.end - a.start`.
pub fn duration(a: &TimeInterval) -> Time {
    a.duration()
}
