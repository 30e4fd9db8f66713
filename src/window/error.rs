use thiserror::Error;

/// Raised when an interval is built with `start >= end` or non-finite bounds.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Invalid time interval [{start}, {end}): start must be finite and strictly before end")]
pub struct IntervalError {
    pub start: f64,
    pub end: f64,
}
