//! Display offsets for photos captured at the same spot.
//!
//! Several photos taken while standing still land on the same map pixel.
//! Each repeat of a coordinate (rounded to `key_precision` decimals, ~0.1 m
//! at 6) is pushed out along a golden-angle spiral so every point can be
//! picked. The first photo at a coordinate is the cluster anchor and never
//! moves. Stored GPS values are never changed; offsets only affect where a
//! point is drawn.
//!
//! Collisions are counted per route. Two routes passing the same spot do
//! not push each other's points around.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::GpsPoint;

/// Configuration for the spiral offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetConfig {
    /// Spiral step in degrees. Default: 0.00003 (~3 m)
    pub base_distance_deg: f64,
    /// Angle between successive repeats, in degrees. Default: 137.5 (golden angle)
    pub golden_angle_deg: f64,
    /// Decimal places used to decide that two coordinates are the same. Default: 6
    pub key_precision: u32,
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            base_distance_deg: 0.00003,
            golden_angle_deg: 137.5,
            key_precision: 6,
        }
    }
}

/// A displacement applied as `(Δlat, Δlon)` in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub d_lat: f64,
    pub d_lon: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { d_lat: 0.0, d_lon: 0.0 };

    pub fn is_zero(&self) -> bool {
        self.d_lat == 0.0 && self.d_lon == 0.0
    }

    /// Position at which the point should be drawn.
    pub fn apply(&self, point: &GpsPoint) -> GpsPoint {
        GpsPoint::new(point.latitude + self.d_lat, point.longitude + self.d_lon)
    }
}

/// Spiral offset for the `k`-th repeat of a coordinate (0 = anchor).
pub fn spiral_offset(k: u32, config: &OffsetConfig) -> Offset {
    if k == 0 {
        return Offset::ZERO;
    }
    let angle = (k as f64 * config.golden_angle_deg).to_radians();
    let radius = config.base_distance_deg * (k as f64).sqrt();
    Offset {
        d_lat: radius * angle.cos(),
        d_lon: radius * angle.sin(),
    }
}

fn coordinate_key(point: &GpsPoint, scale: f64) -> (i64, i64) {
    (
        (point.latitude * scale).round() as i64,
        (point.longitude * scale).round() as i64,
    )
}

/// Offsets for one time-ordered route. Output is index-aligned with `points`.
///
/// Assignment depends on encounter order, so `points` must already be in
/// capture order.
pub fn resolve_offsets(points: &[GpsPoint], config: &OffsetConfig) -> Vec<Offset> {
    let scale = 10f64.powi(config.key_precision as i32);
    let mut seen: HashMap<(i64, i64), u32> = HashMap::new();

    points
        .iter()
        .map(|p| {
            let count = seen.entry(coordinate_key(p, scale)).or_insert(0);
            let k = *count;
            *count += 1;
            spiral_offset(k, config)
        })
        .collect()
}
