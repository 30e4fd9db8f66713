//! Benchmark definitions shared by the generator and the CLI.

use qtty::{Hour, Quantity};

use super::constellation::WalkerConfig;
use crate::units::{convert, Time};

/// Constellation sizes of the benchmark grid.
pub const NUM_SATELLITES: [usize; 7] = [1, 2, 5, 10, 20, 50, 100];

/// Request counts of the benchmark grid.
pub const NUM_REQUESTS: [usize; 7] = [100, 200, 500, 1_000, 2_000, 5_000, 10_000];

pub const SATELLITE_ALTITUDE_KM: f64 = 550.0;
pub const SATELLITE_ECCENTRICITY: f64 = 0.001;
pub const SATELLITE_ARG_PERIGEE_DEG: f64 = 0.0;

/// Inclination of the mid-inclination orbit family, in degrees.
pub const MID_INCLINATION_DEG: f64 = 53.0;

/// Inclusive range request priorities are drawn from.
pub const REWARD_RANGE: (f64, f64) = (1.0, 10.0);

/// Scenario epoch. Every instant in a generated instance is an offset from it.
pub const EPOCH: &str = "2025-01-01T00:00:00Z";

/// Planning horizon length.
pub const PLANNING_HORIZON: Time = convert(Quantity::<Hour>::new(24.0));

/// Walker `t/p/f` configuration used for a benchmark constellation size.
pub fn walker_configuration(num_satellites: usize) -> Option<WalkerConfig> {
    let (planes, phasing) = match num_satellites {
        1 => (1, 0),
        2 => (2, 0),
        5 => (5, 0),
        10 => (5, 0),
        20 => (5, 0),
        50 => (10, 0),
        100 => (25, 0),
        _ => return None,
    };
    Some(WalkerConfig {
        total: num_satellites,
        planes,
        phasing,
    })
}
