//! Walker delta constellations and the orbit geometry the generator needs.
//!
//! Only two-body Keplerian quantities plus the J2 nodal drift used to pick a
//! sun-synchronous inclination. Nothing here propagates an orbit.

use std::f64::consts::PI;
use std::fmt;

use qtty::Quantity;

use super::GeneratorError;
use crate::units::Time;

/// Equatorial radius of the Earth, in metres.
pub const R_EARTH: f64 = 6_378_136.3;
/// Gravitational parameter of the Earth, in m³/s².
pub const GM_EARTH: f64 = 3.986_004_415e14;
/// Second zonal harmonic of the Earth's gravity field.
pub const J2_EARTH: f64 = 0.001_082_635_819_196_7;
/// Mean angular rate of the Earth around the Sun, in rad/s.
pub const OMEGA_SUN_SYNC: f64 = 2.0 * PI / (365.242_189_7 * 86_400.0);
/// Sidereal rotation rate of the Earth, in rad/s.
pub const OMEGA_EARTH: f64 = 7.292_115_146_706_979e-5;

/// Walker delta pattern `t/p/f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Total number of satellites.
    pub total: usize,
    /// Number of equally spaced orbital planes.
    pub planes: usize,
    /// Relative phasing between adjacent planes.
    pub phasing: usize,
}

impl WalkerConfig {
    /// # Errors
    ///
    /// Fails unless `planes > 0` and `total` is a positive multiple of it.
    pub fn new(total: usize, planes: usize, phasing: usize) -> Result<Self, GeneratorError> {
        if total == 0 || planes == 0 || total % planes != 0 {
            return Err(GeneratorError::InvalidWalker { total, planes });
        }
        Ok(Self {
            total,
            planes,
            phasing,
        })
    }

    pub fn per_plane(&self) -> usize {
        self.total / self.planes
    }
}

impl fmt::Display for WalkerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.total, self.planes, self.phasing)
    }
}

/// Osculating Keplerian elements. Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrbitalElements {
    /// Semi-major axis, in metres.
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
}

impl OrbitalElements {
    pub fn period(&self) -> Time {
        orbital_period(self.semi_major_axis)
    }

    /// Mean motion, in degrees per second.
    pub fn mean_motion_deg(&self) -> f64 {
        360.0 / self.period().value()
    }
}

/// Keplerian period of an orbit with semi-major axis `sma` metres.
pub fn orbital_period(sma: f64) -> Time {
    Quantity::new(2.0 * PI * (sma.powi(3) / GM_EARTH).sqrt())
}

/// Inclination in degrees at which J2 precession of the node matches the
/// Sun's apparent motion.
///
/// # Errors
///
/// Fails when no such inclination exists, which happens for orbits far above
/// low Earth orbit.
pub fn sun_sync_inclination(sma: f64, eccentricity: f64) -> Result<f64, GeneratorError> {
    let p = (1.0 - eccentricity * eccentricity).powi(2);
    let cos_i = -(2.0 * sma.powf(3.5) * OMEGA_SUN_SYNC * p) / (3.0 * R_EARTH * R_EARTH * J2_EARTH * GM_EARTH.sqrt());
    if !(-1.0..=1.0).contains(&cos_i) {
        return Err(GeneratorError::InvalidParameter(format!(
            "no sun-synchronous inclination for a semi-major axis of {sma} m"
        )));
    }
    Ok(cos_i.acos().to_degrees())
}

/// Elements of every satellite of a Walker delta constellation, plane by
/// plane.
///
/// Planes are spaced `360/p` degrees in RAAN, satellites `360/(t/p)` degrees in
/// mean anomaly within a plane, and each plane is shifted by `f·360/t`
/// degrees of mean anomaly from the previous one.
pub fn walker_elements(
    walker: &WalkerConfig,
    inclination_deg: f64,
    sma: f64,
    eccentricity: f64,
    arg_perigee_deg: f64,
) -> Vec<OrbitalElements> {
    let per_plane = walker.per_plane();
    let raan_spacing = 360.0 / walker.planes as f64;
    let anomaly_spacing = 360.0 / per_plane as f64;
    let phase_offset = walker.phasing as f64 * 360.0 / walker.total as f64;

    let mut elements = Vec::with_capacity(walker.total);
    for plane in 0..walker.planes {
        let raan = plane as f64 * raan_spacing;
        let base = plane as f64 * phase_offset;
        for slot in 0..per_plane {
            elements.push(OrbitalElements {
                semi_major_axis: sma,
                eccentricity,
                inclination_deg,
                raan_deg: raan,
                arg_perigee_deg,
                mean_anomaly_deg: (slot as f64 * anomaly_spacing + base).rem_euclid(360.0),
            });
        }
    }
    elements
}
