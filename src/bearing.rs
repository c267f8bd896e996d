//! Travel-direction bearings along a route.
//!
//! Each photo points toward the next photo in its route. The last photo
//! carries the previous leg's direction forward, and a single-photo route
//! points north (0°). Bearings are reference data for map arrows and the
//! heading UI; they are never stored as a view heading.

use crate::geo_utils::initial_bearing;
use crate::GpsPoint;

/// Bearing for every point of a time-ordered route, in degrees `[0, 360)`.
///
/// Output has the same length as `points`.
pub fn route_bearings(points: &[GpsPoint]) -> Vec<f64> {
    let n = points.len();
    (0..n)
        .map(|i| {
            if i + 1 < n {
                initial_bearing(&points[i], &points[i + 1])
            } else if i > 0 {
                initial_bearing(&points[i - 1], &points[i])
            } else {
                // No neighbor to derive a direction from
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_empty_and_single() {
        assert!(route_bearings(&[]).is_empty());
        assert_eq!(route_bearings(&[GpsPoint::new(35.7, 139.7)]), vec![0.0]);
    }

    #[test]
    fn test_last_photo_carries_previous_leg() {
        // north, then east
        let points = vec![
            GpsPoint::new(35.700, 139.700),
            GpsPoint::new(35.701, 139.700),
            GpsPoint::new(35.701, 139.701),
        ];
        let bearings = route_bearings(&points);
        assert_eq!(bearings.len(), 3);
        assert!(approx_eq(bearings[0], 0.0, 1e-6));
        assert!(approx_eq(bearings[1], 90.0, 0.01));
        assert_eq!(bearings[2], bearings[1]);
    }

    #[test]
    fn test_two_points_share_bearing() {
        let points = vec![GpsPoint::new(35.700, 139.700), GpsPoint::new(35.699, 139.700)];
        let bearings = route_bearings(&points);
        assert!(approx_eq(bearings[0], 180.0, 1e-6));
        assert_eq!(bearings[0], bearings[1]);
    }

    #[test]
    fn test_stationary_photos_point_north() {
        let p = GpsPoint::new(35.7, 139.7);
        assert_eq!(route_bearings(&[p, p]), vec![0.0, 0.0]);
    }
}
