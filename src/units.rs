//! Time units used across the planner.
//!
//! All absolute instants are offsets from the scenario epoch, expressed in
//! seconds. Durations share the same representation. Callers that naturally
//! think in hours or minutes convert through [`convert`], which only compiles
//! for units of the same physical dimension.

use qtty::{Quantity, Second, Unit};

/// An instant (epoch offset) or a duration, in seconds.
pub type Time = Quantity<Second>;

/// Marker trait for units that share the same physical dimension.
///
/// Automatically implemented for any pair of units where `From::Dim == To::Dim`.
pub trait SameDim<To: Unit>: Unit<Dim = To::Dim> {}

impl<From, To> SameDim<To> for From
where
    From: Unit,
    To: Unit<Dim = From::Dim>,
{
}

/// Converts a quantity from one unit to another unit of the same dimension.
///
/// # Example
///
/// ```
/// use qtty::{Hour, Quantity, Second};
/// use satplan::units::convert;
///
/// let horizon: Quantity<Second> = convert(Quantity::<Hour>::new(24.0));
/// assert!((horizon.value() - 86_400.0).abs() < 1e-9);
/// ```
#[inline]
pub const fn convert<From, To>(q: Quantity<From>) -> Quantity<To>
where
    From: SameDim<To>,
    To: Unit,
{
    q.to_const::<To>()
}

/// Shorthand for a [`Time`] of `value` seconds.
#[inline]
pub const fn secs(value: f64) -> Time {
    Quantity::new(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtty::{Day, Hour, Minute};

    #[test]
    fn hours_to_seconds() {
        let hours = Quantity::<Hour>::new(24.0);
        let seconds: Time = convert(hours);
        assert!((seconds.value() - 86_400.0).abs() < 1e-9);
    }

    #[test]
    fn minutes_to_seconds() {
        let minutes = Quantity::<Minute>::new(1.5);
        let seconds: Time = convert(minutes);
        assert!((seconds.value() - 90.0).abs() < 1e-12);
    }

    #[test]
    fn day_round_trip_through_seconds() {
        let day = Quantity::<Day>::new(1.0);
        let seconds: Time = convert(day);
        let back: Quantity<Day> = convert(seconds);
        assert!((back.value() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn secs_shorthand() {
        assert_eq!(secs(12.5).value(), 12.5);
    }
}
