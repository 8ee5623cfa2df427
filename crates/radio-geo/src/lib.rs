//! Radio Geodesy Library
//!
//! Spherical-Earth distance and bearing for point-to-point microwave paths,
//! plus cellular timing-advance step conversion for the on-map measuring
//! overlay. The haversine approximation is accepted here: sub-0.5% error over
//! the short terrestrial spans these links cover.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters (spherical model)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Timing-advance step sizes in meters per step
pub const GSM_M_PER_STEP: f64 = 554.0;
pub const UMTS_M_PER_STEP: f64 = 78.125;
pub const LTE_M_PER_STEP: f64 = 78.125;
/// NR at 30 kHz subcarrier spacing
pub const NR_30KHZ_M_PER_STEP: f64 = 39.0625;

/// Haversine distance between two points in meters
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial great-circle bearing from point 1 to point 2, in [0, 360) degrees
pub fn initial_bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let y = dlon.sin() * lat2_rad.cos();
    let x = lat1_rad.cos() * lat2_rad.sin() - lat1_rad.sin() * lat2_rad.cos() * dlon.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Timing-advance step counts for one propagation distance
///
/// Consumed by the map measuring overlay to annotate a drawn path with the TA
/// value each cellular standard would report at that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingAdvance {
    pub gsm: u32,
    pub umts: u32,
    pub lte: u32,
    pub nr_30khz: u32,
}

impl TimingAdvance {
    /// Convert a one-way distance in meters to per-standard step counts.
    ///
    /// Negative distances (defensive input from the overlay) clamp to zero.
    pub fn from_distance_m(distance_m: f64) -> Self {
        let d = distance_m.max(0.0);
        Self {
            gsm: steps(d, GSM_M_PER_STEP),
            umts: steps(d, UMTS_M_PER_STEP),
            lte: steps(d, LTE_M_PER_STEP),
            nr_30khz: steps(d, NR_30KHZ_M_PER_STEP),
        }
    }
}

fn steps(distance_m: f64, m_per_step: f64) -> u32 {
    (distance_m / m_per_step).round() as u32
}
