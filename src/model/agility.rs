//! Agility: the minimum transition time a platform needs between two
//! consecutive tasks.

use std::collections::BTreeMap;

use qtty::Quantity;

use super::task::Task;
use crate::units::Time;
use crate::Id;

/// Pointing attitude a task requires, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub roll_deg: f64,
    pub pitch_deg: f64,
}

impl Orientation {
    pub const fn new(roll_deg: f64, pitch_deg: f64) -> Self {
        Self {
            roll_deg,
            pitch_deg,
        }
    }

    /// Slew angle to `other`, assuming both axes rotate simultaneously.
    pub fn angle_to(&self, other: &Orientation) -> f64 {
        let roll = (self.roll_deg - other.roll_deg).abs();
        let pitch = (self.pitch_deg - other.pitch_deg).abs();
        roll.max(pitch)
    }
}

/// Transition cost model of a platform.
///
/// Whatever the variant, two tasks sharing the same orientation need no
/// transition time.
#[derive(Debug, Clone, Default)]
pub enum AgilityModel {
    /// Transitions take no time.
    #[default]
    Instant,
    /// Every re-orientation costs the same.
    Constant { transition: Time },
    /// Rest-to-rest slew at a fixed angular rate plus a settling time.
    Slew { rate_deg_per_s: f64, settle: Time },
    /// Explicit cost per ordered pair of task ids.
    Table {
        default: Time,
        pairs: BTreeMap<(Id, Id), Time>,
        /// When set, a missing `(b, a)` entry falls back to `(a, b)`.
        symmetric: bool,
    },
}

impl AgilityModel {
    /// Creates an empty table model with the given fallback cost.
    pub fn table(default: Time, symmetric: bool) -> Self {
        AgilityModel::Table {
            default,
            pairs: BTreeMap::new(),
            symmetric,
        }
    }

    /// Adds an entry to a table model; other variants are returned unchanged.
    pub fn with_pair(mut self, from: impl Into<Id>, to: impl Into<Id>, cost: Time) -> Self {
        if let AgilityModel::Table { pairs, .. } = &mut self {
            pairs.insert((from.into(), to.into()), cost);
        }
        self
    }

    /// Minimum gap required between the end of `from` and the start of `to`.
    pub fn transition(&self, from: &Task, to: &Task) -> Time {
        if from.orientation() == to.orientation() {
            return Quantity::new(0.0);
        }
        match self {
            AgilityModel::Instant => Quantity::new(0.0),
            AgilityModel::Constant { transition } => *transition,
            AgilityModel::Slew {
                rate_deg_per_s,
                settle,
            } => {
                let angle = from.orientation().angle_to(to.orientation());
                Quantity::new(angle / rate_deg_per_s + settle.value())
            }
            AgilityModel::Table {
                default,
                pairs,
                symmetric,
            } => {
                let forward = (from.id().to_string(), to.id().to_string());
                if let Some(cost) = pairs.get(&forward) {
                    return *cost;
                }
                if *symmetric {
                    let backward = (forward.1, forward.0);
                    if let Some(cost) = pairs.get(&backward) {
                        return *cost;
                    }
                }
                *default
            }
        }
    }

    /// Returns `Err(value)` if any configured quantity is negative or not finite.
    pub(crate) fn validate(&self) -> Result<(), f64> {
        let check = |v: f64| if v.is_finite() && v >= 0.0 { Ok(()) } else { Err(v) };
        match self {
            AgilityModel::Instant => Ok(()),
            AgilityModel::Constant { transition } => check(transition.value()),
            AgilityModel::Slew {
                rate_deg_per_s,
                settle,
            } => {
                if !rate_deg_per_s.is_finite() || *rate_deg_per_s <= 0.0 {
                    return Err(*rate_deg_per_s);
                }
                check(settle.value())
            }
            AgilityModel::Table { default, pairs, .. } => {
                check(default.value())?;
                pairs.values().try_for_each(|c| check(c.value()))
            }
        }
    }
}
