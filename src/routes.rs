//! Route grouping.
//!
//! A route is every photo of a neighborhood that shares one capture-session
//! `folder`, in capture order. Routes are derived on demand and never stored.
//!
//! Route order is the order in which each folder is first seen in the
//! time-sorted input. Color assignment depends on that order, so it is
//! deliberately not a sort by folder name.

use std::collections::HashMap;

use geo::{Coord, LineString};

use crate::filter::PositionedPhoto;
use crate::geo_utils;
use crate::{Bounds, GpsPoint};

/// Time-ordered photos sharing one folder.
#[derive(Debug, Clone, PartialEq)]
pub struct Route<'a> {
    pub folder: &'a str,
    pub photos: Vec<PositionedPhoto<'a>>,
}

impl<'a> Route<'a> {
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// A single-photo route has no line segment.
    pub fn is_degenerate(&self) -> bool {
        self.photos.len() < 2
    }

    /// True (unoffset) positions in route order.
    pub fn points(&self) -> Vec<GpsPoint> {
        self.photos.iter().map(|p| p.position).collect()
    }

    /// Route geometry as a `geo` line string (x = longitude, y = latitude).
    pub fn line(&self) -> LineString<f64> {
        self.photos
            .iter()
            .map(|p| Coord { x: p.position.longitude, y: p.position.latitude })
            .collect::<Vec<_>>()
            .into()
    }

    /// Walked distance along the route in meters.
    pub fn length_meters(&self) -> f64 {
        geo_utils::polyline_length(&self.points())
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points())
    }
}

/// Partition photos into per-folder routes.
///
/// Routes appear in first-occurrence order of their folder. Within a route,
/// photos are stably sorted by capture instant, so grouping already-sorted
/// input leaves the order untouched and regrouping a route's own photos is
/// a no-op.
pub fn group_routes<'a>(photos: &[PositionedPhoto<'a>]) -> Vec<Route<'a>> {
    let mut routes: Vec<Route<'a>> = Vec::new();
    let mut index_by_folder: HashMap<&'a str, usize> = HashMap::new();

    for photo in photos {
        let folder = photo.folder();
        let idx = *index_by_folder.entry(folder).or_insert_with(|| {
            routes.push(Route { folder, photos: Vec::new() });
            routes.len() - 1
        });
        routes[idx].photos.push(*photo);
    }

    for route in &mut routes {
        route.photos.sort_by_key(|p| p.instant);
    }

    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PhotoRecord;

    fn record(path: &str, folder: &str, second: u32, lat: f64) -> PhotoRecord {
        PhotoRecord::new(path, "2025-12-09", &format!("2025-12-09T10:00:{second:02}Z"), folder)
            .with_position(lat, 139.7)
    }

    fn positioned(records: &[PhotoRecord]) -> Vec<PositionedPhoto<'_>> {
        records.iter().filter_map(PositionedPhoto::from_record).collect()
    }

    #[test]
    fn test_first_occurrence_order() {
        let records = vec![
            record("z1.jpg", "Z", 0, 35.700),
            record("a1.jpg", "A", 1, 35.701),
            record("z2.jpg", "Z", 2, 35.702),
            record("m1.jpg", "M", 3, 35.703),
        ];
        let routes = group_routes(&positioned(&records));

        let folders: Vec<&str> = routes.iter().map(|r| r.folder).collect();
        assert_eq!(folders, vec!["Z", "A", "M"]);
        assert_eq!(routes[0].len(), 2);
        assert!(routes[1].is_degenerate());
    }

    #[test]
    fn test_route_time_ordered() {
        let records = vec![
            record("late.jpg", "F1", 30, 35.700),
            record("early.jpg", "F1", 10, 35.701),
        ];
        let routes = group_routes(&positioned(&records));
        let paths: Vec<&str> = routes[0].photos.iter().map(|p| p.path()).collect();
        assert_eq!(paths, vec!["early.jpg", "late.jpg"]);
    }

    #[test]
    fn test_grouping_idempotent() {
        let records = vec![
            record("a.jpg", "F1", 0, 35.700),
            record("b.jpg", "F2", 1, 35.701),
            record("c.jpg", "F1", 1, 35.702),
            record("d.jpg", "F1", 1, 35.703),
        ];
        let routes = group_routes(&positioned(&records));
        for route in &routes {
            let regrouped = group_routes(&route.photos);
            assert_eq!(regrouped.len(), 1);
            assert_eq!(regrouped[0], *route);
        }
    }

    #[test]
    fn test_route_geometry() {
        let records = vec![
            record("a.jpg", "F1", 0, 35.700),
            record("b.jpg", "F1", 1, 35.701),
        ];
        let routes = group_routes(&positioned(&records));
        let line = routes[0].line();
        assert_eq!(line.0.len(), 2);
        assert_eq!(line.0[1], Coord { x: 139.7, y: 35.701 });
        assert!((routes[0].length_meters() - 111.0).abs() < 1.0);

        let bounds = routes[0].bounds().unwrap();
        assert_eq!(bounds.min_lat, 35.700);
        assert_eq!(bounds.max_lat, 35.701);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_routes(&[]).is_empty());
    }
}
