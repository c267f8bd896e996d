//! # Geographic Utilities
//!
//! Small spherical-geometry helpers shared by the route, bearing, offset and
//! spatial modules.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`polyline_length`] | Total length of an ordered route in meters |
//! | [`initial_bearing`] | Compass direction of travel from one point to the next |
//! | [`normalize_degrees`] | Fold any angle into `[0, 360)` |
//! | [`compute_center`] | Arithmetic centroid of a set of points |
//! | [`meters_to_degrees`] | Convert meters to approximate degrees at a latitude |
//!
//! ## Example
//!
//! ```rust
//! use photo_route::{GpsPoint, geo_utils};
//!
//! let walk = vec![
//!     GpsPoint::new(35.6961, 139.8140),
//!     GpsPoint::new(35.6970, 139.8140),
//!     GpsPoint::new(35.6970, 139.8152),
//! ];
//!
//! let length = geo_utils::polyline_length(&walk);
//! println!("Walk length: {:.0}m", length);
//!
//! // First leg heads due north
//! let bearing = geo_utils::initial_bearing(&walk[0], &walk[1]);
//! assert!(bearing.abs() < 1e-9);
//! ```
//!
//! ## Coordinate System
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees).

use geo::{Distance, Haversine, Point};

use crate::GpsPoint;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance between two GPS points in meters (Haversine formula).
///
/// # Example
///
/// ```rust
/// use photo_route::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Total length of an ordered sequence of points in meters.
///
/// Empty or single-point sequences return 0.0.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Convert meters to approximate degrees at a given latitude.
///
/// Uses the longitude scale (`111,320 m · cos(lat)`), which gives the wider
/// span of the two axes, so a square search envelope covers the radius.
#[inline]
pub fn meters_to_degrees(meters: f64, latitude: f64) -> f64 {
    let lat_rad = latitude.to_radians();
    let meters_per_degree = 111_320.0 * lat_rad.cos().max(0.1);
    meters / meters_per_degree
}

// =============================================================================
// Direction Functions
// =============================================================================

/// Fold an angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let folded = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if folded >= 360.0 {
        0.0
    } else {
        folded
    }
}

/// Initial great-circle bearing from `from` to `to`, in degrees clockwise
/// from north, normalized into `[0, 360)`.
///
/// With both points in radians and `Δlon = lon2 − lon1`:
///
/// ```text
/// y = sin(Δlon)·cos(lat2)
/// x = cos(lat1)·sin(lat2) − sin(lat1)·cos(lat2)·cos(Δlon)
/// bearing = atan2(y, x)
/// ```
///
/// Identical points yield 0 (north).
///
/// # Example
///
/// ```rust
/// use photo_route::{GpsPoint, geo_utils};
///
/// let origin = GpsPoint::new(35.0, 139.0);
/// let east = GpsPoint::new(35.0, 139.001);
/// let bearing = geo_utils::initial_bearing(&origin, &east);
/// assert!((bearing - 90.0).abs() < 0.01);
/// ```
pub fn initial_bearing(from: &GpsPoint, to: &GpsPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

// =============================================================================
// Center Functions
// =============================================================================

/// Arithmetic mean of latitudes and longitudes. Returns (0, 0) for empty input.
///
/// Fine for a single neighborhood; not meant for tracks spanning the
/// antimeridian.
pub fn compute_center(points: &[GpsPoint]) -> GpsPoint {
    if points.is_empty() {
        return GpsPoint::new(0.0, 0.0);
    }

    let sum_lat: f64 = points.iter().map(|p| p.latitude).sum();
    let sum_lng: f64 = points.iter().map(|p| p.longitude).sum();
    let n = points.len() as f64;

    GpsPoint::new(sum_lat / n, sum_lng / n)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GpsPoint::new(35.6961, 139.8140);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_polyline_length() {
        assert_eq!(polyline_length(&[]), 0.0);
        assert_eq!(polyline_length(&[GpsPoint::new(35.0, 139.0)]), 0.0);

        // 0.001° of latitude is ~111m
        let track = vec![GpsPoint::new(35.000, 139.0), GpsPoint::new(35.001, 139.0)];
        assert!(approx_eq(polyline_length(&track), 111.0, 1.0));
    }

    #[test]
    fn test_cardinal_bearings() {
        let origin = GpsPoint::new(35.0, 139.0);
        assert!(approx_eq(initial_bearing(&origin, &GpsPoint::new(35.001, 139.0)), 0.0, 1e-9));
        assert!(approx_eq(initial_bearing(&origin, &GpsPoint::new(35.0, 139.001)), 90.0, 0.01));
        assert!(approx_eq(initial_bearing(&origin, &GpsPoint::new(34.999, 139.0)), 180.0, 1e-9));
        assert!(approx_eq(initial_bearing(&origin, &GpsPoint::new(35.0, 138.999)), 270.0, 0.01));
    }

    #[test]
    fn test_bearing_always_in_range() {
        let origin = GpsPoint::new(35.0, 139.0);
        for i in 0..72 {
            let angle = (i as f64 * 5.0).to_radians();
            let target = GpsPoint::new(35.0 + 0.001 * angle.cos(), 139.0 + 0.001 * angle.sin());
            let b = initial_bearing(&origin, &target);
            assert!((0.0..360.0).contains(&b), "bearing {} out of range", b);
        }
        assert_eq!(initial_bearing(&origin, &origin), 0.0);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(450.0), 90.0);
        assert!(normalize_degrees(-1e-15) < 360.0);
    }

    #[test]
    fn test_compute_center() {
        let track = vec![
            GpsPoint::new(35.70, 139.70),
            GpsPoint::new(35.72, 139.72),
        ];
        let center = compute_center(&track);
        assert!(approx_eq(center.latitude, 35.71, 1e-9));
        assert!(approx_eq(center.longitude, 139.71, 1e-9));
        assert_eq!(compute_center(&[]), GpsPoint::new(0.0, 0.0));
    }

    #[test]
    fn test_meters_to_degrees() {
        let deg = meters_to_degrees(111_320.0, 0.0);
        assert!(approx_eq(deg, 1.0, 0.01));
        assert!(meters_to_degrees(111_320.0, 45.0) > 1.0);
    }
}
