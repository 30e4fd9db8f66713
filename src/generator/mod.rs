//! Synthetic benchmark instances.
//!
//! A generated instance places one platform per satellite of a Walker delta
//! constellation and one task per ground request. Visibility windows are
//! derived from two-body pass times: a request is seen whenever the ground
//! track crosses its latitude close enough to its longitude. Every random
//! draw comes from one `StdRng` seeded by [`GeneratorConfig::seed`], so the
//! same configuration always yields the same instance.

pub mod constants;
pub mod constellation;

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::model::{
    AgilityModel, BudgetCurve, InstanceError, ObjectiveKind, ObjectiveSpec, Orientation, Platform,
    ProblemInstance, ResourceCost, Task, TaskDuration,
};
use crate::units::{secs, Time};
use crate::window::TimeInterval;

use constants::{
    walker_configuration, MID_INCLINATION_DEG, NUM_REQUESTS, NUM_SATELLITES, PLANNING_HORIZON,
    REWARD_RANGE, SATELLITE_ALTITUDE_KM, SATELLITE_ARG_PERIGEE_DEG, SATELLITE_ECCENTRICITY,
};
use constellation::{sun_sync_inclination, walker_elements, OrbitalElements, WalkerConfig, OMEGA_EARTH, R_EARTH};

/// Resource name of the onboard battery.
pub const ENERGY: &str = "energy";
/// Resource name of the onboard mass memory.
pub const STORAGE: &str = "storage";

const ENERGY_CAPACITY: f64 = 1_500.0;
const ENERGY_PER_ORBIT: f64 = 900.0;
const ENERGY_PER_SLEW: f64 = 10.0;
const IMAGING_POWER: f64 = 2.0;
const STORAGE_CAPACITY: f64 = 4_000.0;
const DATA_RATE: f64 = 1.0;

const SLEW_RATE_DEG_PER_S: f64 = 1.5;
const SETTLE_SECS: f64 = 5.0;
const MAX_ROLL_DEG: f64 = 30.0;
const MAX_PITCH_DEG: f64 = 20.0;

const MIN_DURATION_SECS: u32 = 10;
const MAX_DURATION_SECS: u32 = 60;

/// Largest ground-track miss, in degrees of arc, at which a target is still
/// visible on a pass.
const ACCESS_HALF_ANGLE_DEG: f64 = 10.0;
const ACCESS_HALF_WINDOW_SECS: f64 = 180.0;

/// Errors raised for invalid generator parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("Walker constellation of {total} satellites cannot be split into {planes} planes")]
    InvalidWalker { total: usize, planes: usize },

    #[error("No Walker configuration defined for {0} satellites")]
    NoWalkerConfiguration(usize),

    #[error("Unknown inclination '{0}' (expected 'mio' or 'sso')")]
    UnknownInclination(String),

    #[error("Invalid generator parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Instance(#[from] InstanceError),
}

/// Orbit family of a benchmark constellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Inclination {
    /// Mid-inclination orbits at 53 degrees.
    Mid,
    /// Sun-synchronous orbits, inclination derived from the altitude.
    SunSynchronous,
}

impl Inclination {
    pub const ALL: [Inclination; 2] = [Inclination::Mid, Inclination::SunSynchronous];

    pub fn name(&self) -> &'static str {
        match self {
            Inclination::Mid => "mio",
            Inclination::SunSynchronous => "sso",
        }
    }

    /// Inclination in degrees at the benchmark altitude.
    pub fn degrees(&self) -> Result<f64, GeneratorError> {
        match self {
            Inclination::Mid => Ok(MID_INCLINATION_DEG),
            Inclination::SunSynchronous => sun_sync_inclination(semi_major_axis(), SATELLITE_ECCENTRICITY),
        }
    }
}

impl fmt::Display for Inclination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Inclination {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mio" => Ok(Inclination::Mid),
            "sso" => Ok(Inclination::SunSynchronous),
            _ => Err(GeneratorError::UnknownInclination(s.to_string())),
        }
    }
}

/// Parameters of one generated instance.
///
/// # Examples
///
/// ```
/// use satplan::generator::{generate, GeneratorConfig, Inclination};
///
/// let config = GeneratorConfig::new(2, 100)
///     .unwrap()
///     .with_inclination(Inclination::SunSynchronous)
///     .with_seed(7);
/// let instance = generate(&config).unwrap();
/// assert_eq!(instance.platforms().len(), 2);
/// assert_eq!(instance.tasks().len(), 100);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub walker: WalkerConfig,
    pub inclination: Inclination,
    pub requests: usize,
    pub seed: u64,
    pub horizon: Time,
    pub objective: ObjectiveKind,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            walker: WalkerConfig {
                total: 1,
                planes: 1,
                phasing: 0,
            },
            inclination: Inclination::Mid,
            requests: NUM_REQUESTS[0],
            seed: 0,
            horizon: PLANNING_HORIZON,
            objective: ObjectiveKind::WeightedReward,
        }
    }
}

impl GeneratorConfig {
    /// Benchmark configuration for a constellation size of the definitions
    /// grid.
    ///
    /// # Errors
    ///
    /// Fails with [`GeneratorError::NoWalkerConfiguration`] when no Walker
    /// pattern is defined for `satellites`.
    pub fn new(satellites: usize, requests: usize) -> Result<Self, GeneratorError> {
        let walker = walker_configuration(satellites).ok_or(GeneratorError::NoWalkerConfiguration(satellites))?;
        Ok(Self {
            walker,
            requests,
            ..Self::default()
        })
    }

    pub fn with_walker(mut self, walker: WalkerConfig) -> Self {
        self.walker = walker;
        self
    }

    pub fn with_inclination(mut self, inclination: Inclination) -> Self {
        self.inclination = inclination;
        self
    }

    pub fn with_requests(mut self, requests: usize) -> Self {
        self.requests = requests;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_horizon(mut self, horizon: Time) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_objective(mut self, objective: ObjectiveKind) -> Self {
        self.objective = objective;
        self
    }

    /// Instance name, unique across the definitions grid for a given seed.
    pub fn name(&self) -> String {
        format!(
            "sat{}-{}-req{}-s{}",
            self.walker.total, self.inclination, self.requests, self.seed
        )
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        WalkerConfig::new(self.walker.total, self.walker.planes, self.walker.phasing)?;
        if self.requests == 0 {
            return Err(GeneratorError::InvalidParameter("requests must be positive".into()));
        }
        let horizon = self.horizon.value();
        if !horizon.is_finite() || horizon <= 0.0 {
            return Err(GeneratorError::InvalidParameter(format!(
                "horizon must be positive and finite, got {horizon} s"
            )));
        }
        Ok(())
    }
}

/// Every (inclination, satellites, requests) combination of the benchmark
/// grid, with seed 0.
pub fn definitions() -> Vec<GeneratorConfig> {
    let mut configs = Vec::with_capacity(Inclination::ALL.len() * NUM_SATELLITES.len() * NUM_REQUESTS.len());
    for inclination in Inclination::ALL {
        for satellites in NUM_SATELLITES {
            let Some(walker) = walker_configuration(satellites) else {
                continue;
            };
            for requests in NUM_REQUESTS {
                configs.push(
                    GeneratorConfig::default()
                        .with_walker(walker)
                        .with_inclination(inclination)
                        .with_requests(requests),
                );
            }
        }
    }
    configs
}

/// Builds the instance described by `config`.
///
/// # Errors
///
/// Fails if the configuration is invalid or the inclination has no
/// solution at the benchmark altitude.
pub fn generate(config: &GeneratorConfig) -> Result<ProblemInstance, GeneratorError> {
    config.validate()?;
    let inclination = config.inclination.degrees()?;
    let horizon = config.horizon.value();
    let elements = walker_elements(
        &config.walker,
        inclination,
        semi_major_axis(),
        SATELLITE_ECCENTRICITY,
        SATELLITE_ARG_PERIGEE_DEG,
    );
    debug!(
        "generating {}: walker {}, inclination {:.3} deg, period {:.1} s",
        config.name(),
        config.walker,
        inclination,
        elements[0].period().value()
    );

    let platforms = elements
        .iter()
        .enumerate()
        .map(|(i, e)| platform(i, e, horizon))
        .collect::<Result<Vec<_>, _>>()?;

    let max_latitude = inclination.min(180.0 - inclination);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut tasks = Vec::with_capacity(config.requests);
    let mut window_count = 0;
    for r in 0..config.requests {
        let target = Target {
            latitude_deg: rng.gen_range(-max_latitude..=max_latitude),
            longitude_deg: rng.gen_range(0.0..360.0),
        };
        let priority = rng.gen_range(REWARD_RANGE.0..=REWARD_RANGE.1);
        let length = f64::from(rng.gen_range(MIN_DURATION_SECS..=MAX_DURATION_SECS));
        let orientation = Orientation::new(
            rng.gen_range(-MAX_ROLL_DEG..=MAX_ROLL_DEG),
            rng.gen_range(-MAX_PITCH_DEG..=MAX_PITCH_DEG),
        );

        let mut task = Task::new(format!("req-{:05}", r + 1), priority, TaskDuration::Fixed(secs(length)))
            .with_orientation(orientation)
            .with_cost(ENERGY, ResourceCost::new(ENERGY_PER_SLEW, IMAGING_POWER))
            .with_cost(STORAGE, ResourceCost::per_execution(length * DATA_RATE));
        for (platform, orbit) in platforms.iter().zip(&elements) {
            for access in accesses(orbit, &target, horizon) {
                if access.interval.duration().value() >= length {
                    task = task.with_window(platform.id(), access.interval, access.quality);
                    window_count += 1;
                }
            }
        }
        tasks.push(task);
    }

    let horizon = TimeInterval::from_secs(0.0, horizon).map_err(InstanceError::from)?;
    let instance = ProblemInstance::builder(config.name(), horizon)
        .objective(ObjectiveSpec::new(config.objective))
        .platforms(platforms)
        .tasks(tasks)
        .build()?;

    info!(
        "generated {}: {} platform(s), {} task(s), {} window(s), {} unschedulable",
        instance.name(),
        instance.platforms().len(),
        instance.tasks().len(),
        window_count,
        instance.unschedulable_tasks().count()
    );
    Ok(instance)
}

fn semi_major_axis() -> f64 {
    R_EARTH + SATELLITE_ALTITUDE_KM * 1e3
}

fn platform(index: usize, orbit: &OrbitalElements, horizon: f64) -> Result<Platform, GeneratorError> {
    let period = orbit.period().value();
    let recharges = (1u32..)
        .map(|k| f64::from(k) * period)
        .take_while(|&t| t < horizon)
        .map(|t| (secs(t), ENERGY_PER_ORBIT));
    Ok(Platform::new(format!("sat-{:03}", index + 1))
        .with_budget(ENERGY, BudgetCurve::replenishing(ENERGY_CAPACITY, recharges)?)
        .with_budget(STORAGE, BudgetCurve::constant(STORAGE_CAPACITY)?)
        .with_agility(AgilityModel::Slew {
            rate_deg_per_s: SLEW_RATE_DEG_PER_S,
            settle: secs(SETTLE_SECS),
        }))
}

struct Target {
    latitude_deg: f64,
    longitude_deg: f64,
}

struct Access {
    interval: TimeInterval,
    quality: f64,
}

/// Passes of `orbit` over `target` within `[0, horizon)`, sorted by start.
///
/// Assumes a near-circular orbit: the satellite reaches the target latitude
/// twice per revolution, once ascending and once descending, and the pass is
/// usable when the ground track at that moment misses the target by at most
/// [`ACCESS_HALF_ANGLE_DEG`]. Quality falls linearly with the miss.
fn accesses(orbit: &OrbitalElements, target: &Target, horizon: f64) -> Vec<Access> {
    let period = orbit.period().value();
    let rate = orbit.mean_motion_deg();
    let inclination = orbit.inclination_deg.to_radians();
    let latitude = target.latitude_deg.to_radians();
    let ratio = (latitude.sin() / inclination.sin()).clamp(-1.0, 1.0);
    let ascending = ratio.asin().to_degrees();

    let mut passes = Vec::new();
    for u in [ascending, 180.0 - ascending] {
        let first = (u - orbit.arg_perigee_deg - orbit.mean_anomaly_deg).rem_euclid(360.0) / rate;
        for k in 0u32.. {
            let t = first + f64::from(k) * period;
            if t >= horizon {
                break;
            }
            let miss = wrap_degrees(ground_longitude(orbit, u, t) - target.longitude_deg).abs() * latitude.cos();
            if miss > ACCESS_HALF_ANGLE_DEG {
                continue;
            }
            let start = (t - ACCESS_HALF_WINDOW_SECS).max(0.0);
            let end = (t + ACCESS_HALF_WINDOW_SECS).min(horizon);
            if let Ok(interval) = TimeInterval::from_secs(start, end) {
                passes.push(Access {
                    interval,
                    quality: (1.0 - miss / ACCESS_HALF_ANGLE_DEG).clamp(0.0, 1.0),
                });
            }
        }
    }
    passes.sort_by(|a, b| a.interval.start().value().total_cmp(&b.interval.start().value()));
    passes
}

/// Earth-fixed longitude of the sub-satellite point at argument of latitude
/// `u` degrees and time `t` seconds after epoch. Greenwich is aligned with the
/// vernal equinox at epoch.
fn ground_longitude(orbit: &OrbitalElements, u: f64, t: f64) -> f64 {
    let i = orbit.inclination_deg.to_radians();
    let u = u.to_radians();
    let in_plane = (i.cos() * u.sin()).atan2(u.cos()).to_degrees();
    orbit.raan_deg + in_plane - OMEGA_EARTH.to_degrees() * t
}

/// Wraps an angle into `[-180, 180)`.
fn wrap_degrees(angle: f64) -> f64 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}
