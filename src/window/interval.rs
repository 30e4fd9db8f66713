//! Half-open time interval.

use std::fmt::Display;

use qtty::Quantity;

use super::error::IntervalError;
use crate::units::Time;

/// Half-open range `[start, end)` of absolute time.
///
/// Construction guarantees `start < end` with finite bounds, so every method
/// on a `TimeInterval` can assume a positive duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeInterval {
    start: Time,
    end: Time,
}

impl TimeInterval {
    /// Creates interval `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalError`] if either bound is not finite or `start >= end`.
    pub fn new(start: Time, end: Time) -> Result<Self, IntervalError> {
        let (s, e) = (start.value(), end.value());
        if !s.is_finite() || !e.is_finite() || s >= e {
            return Err(IntervalError { start: s, end: e });
        }
        Ok(Self { start, end })
    }

    /// Creates an interval from raw epoch offsets in seconds.
    pub fn from_secs(start: f64, end: f64) -> Result<Self, IntervalError> {
        Self::new(Quantity::new(start), Quantity::new(end))
    }

    /// Creates the interval `[start, start + length)`.
    pub fn starting_at(start: Time, length: Time) -> Result<Self, IntervalError> {
        Self::new(start, start + length)
    }

    pub const fn start(&self) -> Time {
        self.start
    }

    pub const fn end(&self) -> Time {
        self.end
    }

    pub fn duration(&self) -> Time {
        self.end - self.start
    }

    /// Returns true if `instant` ∈ `[start, end)`.
    pub fn contains(&self, instant: Time) -> bool {
        self.start.value() <= instant.value() && instant.value() < self.end.value()
    }

    /// Returns true if `other` lies entirely inside `self`.
    pub fn contains_interval(&self, other: &TimeInterval) -> bool {
        self.start.value() <= other.start.value() && other.end.value() <= self.end.value()
    }

    /// Checks if this interval shares at least one instant with `other`.
    ///
    /// Touching endpoints (`self.end == other.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start.value() < other.end.value() && other.start.value() < self.end.value()
    }

    /// Returns true if the intervals overlap or share an endpoint.
    pub fn touches(&self, other: &TimeInterval) -> bool {
        self.start.value() <= other.end.value() && other.start.value() <= self.end.value()
    }

    pub fn intersection(&self, other: &TimeInterval) -> Option<TimeInterval> {
        if !self.overlaps(other) {
            return None;
        }
        let start = if self.start.value() > other.start.value() {
            self.start
        } else {
            other.start
        };
        let end = if self.end.value() < other.end.value() {
            self.end
        } else {
            other.end
        };
        Some(TimeInterval { start, end })
    }

    /// Returns the hull of both intervals when they overlap or touch.
    pub fn merge(&self, other: &TimeInterval) -> Option<TimeInterval> {
        if !self.touches(other) {
            return None;
        }
        let start = if self.start.value() < other.start.value() {
            self.start
        } else {
            other.start
        };
        let end = if self.end.value() > other.end.value() {
            self.end
        } else {
            other.end
        };
        Some(TimeInterval { start, end })
    }
}

impl Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.3}, {:.3})", self.start.value(), self.end.value())
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl serde::Serialize for TimeInterval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("TimeInterval", 2)?;
        s.serialize_field("start", &self.start.value())?;
        s.serialize_field("end", &self.end.value())?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TimeInterval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            start: f64,
            end: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::from_secs(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: f64, end: f64) -> TimeInterval {
        TimeInterval::from_secs(start, end).unwrap()
    }

    #[test]
    fn creation_and_duration() {
        let interval = iv(0.0, 100.0);
        assert_eq!(interval.duration().value(), 100.0);
        assert_eq!(interval.start().value(), 0.0);
        assert_eq!(interval.end().value(), 100.0);
    }

    #[test]
    fn rejects_empty_and_reversed() {
        assert!(TimeInterval::from_secs(5.0, 5.0).is_err());
        assert!(TimeInterval::from_secs(6.0, 5.0).is_err());
        assert!(TimeInterval::from_secs(f64::NAN, 5.0).is_err());
        assert!(TimeInterval::from_secs(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn contains_is_half_open() {
        let interval = iv(0.0, 100.0);
        assert!(interval.contains(Quantity::new(0.0)));
        assert!(interval.contains(Quantity::new(99.999)));
        assert!(!interval.contains(Quantity::new(100.0)));
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let a = iv(0.0, 10.0);
        let b = iv(10.0, 20.0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.touches(&b));
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn intersection_of_overlapping() {
        let a = iv(0.0, 100.0);
        let b = iv(50.0, 150.0);
        assert_eq!(a.intersection(&b), Some(iv(50.0, 100.0)));
        assert_eq!(b.intersection(&a), Some(iv(50.0, 100.0)));
    }

    #[test]
    fn merge_produces_hull() {
        assert_eq!(iv(0.0, 10.0).merge(&iv(10.0, 20.0)), Some(iv(0.0, 20.0)));
        assert_eq!(iv(0.0, 15.0).merge(&iv(5.0, 8.0)), Some(iv(0.0, 15.0)));
        assert_eq!(iv(0.0, 10.0).merge(&iv(11.0, 20.0)), None);
    }

    #[test]
    fn containment_of_sub_interval() {
        let outer = iv(0.0, 100.0);
        assert!(outer.contains_interval(&iv(0.0, 100.0)));
        assert!(outer.contains_interval(&iv(10.0, 20.0)));
        assert!(!outer.contains_interval(&iv(90.0, 101.0)));
    }
}
