//! # Neighborhood View Engine
//!
//! One canonical pipeline from raw collections to everything the map and
//! panorama renderers need:
//!
//! ```text
//! photos ─► filter ─► group_routes ─► { bearings, offsets, colors } ─► NeighborhoodView
//! ```
//!
//! The engine keeps no state between calls. Per-screen state (which
//! neighborhood is open, which photo is showing) lives in a
//! [`ViewerSession`] owned by the presentation layer.

use log::info;
use serde::{Deserialize, Serialize};

use crate::bearing::route_bearings;
use crate::colors::route_color;
use crate::error::Result;
use crate::filter::{filter_neighborhood, PositionedPhoto};
use crate::geo_utils;
use crate::heading::{resolve_heading, HeadingSource, OverrideMap};
use crate::offset::{resolve_offsets, Offset, OffsetConfig};
use crate::routes::group_routes;
use crate::store::{Neighborhood, NeighborhoodCollection, PhotoCollection, PhotoRecord};
use crate::{Bounds, GpsPoint};

/// Configuration for building neighborhood views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Spiral offset for repeated coordinates
    pub offset: OffsetConfig,
    /// Farthest a map click may land from a photo and still select it.
    /// Default: 25.0 meters
    pub max_pick_distance_m: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            offset: OffsetConfig::default(),
            max_pick_distance_m: 25.0,
        }
    }
}

/// A photo as it appears on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoPlacement<'a> {
    pub photo: PositionedPhoto<'a>,
    /// Where the marker is drawn (true position plus offset)
    pub display_position: GpsPoint,
    pub offset: Offset,
    /// Direction of travel, degrees `[0, 360)`
    pub bearing: f64,
    pub color: &'static str,
    pub route_index: usize,
    pub index_in_route: usize,
}

impl<'a> PhotoPlacement<'a> {
    pub fn record(&self) -> &'a PhotoRecord {
        self.photo.record
    }

    pub fn path(&self) -> &'a str {
        self.photo.path()
    }

    /// Stored GPS position, without the display offset.
    pub fn position(&self) -> GpsPoint {
        self.photo.position
    }
}

/// One route, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteView<'a> {
    pub folder: &'a str,
    pub color: &'static str,
    pub placements: Vec<PhotoPlacement<'a>>,
}

impl<'a> RouteView<'a> {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// True GPS positions in capture order, for the route line.
    pub fn line(&self) -> Vec<GpsPoint> {
        self.placements.iter().map(|p| p.position()).collect()
    }

    pub fn length_meters(&self) -> f64 {
        geo_utils::polyline_length(&self.line())
    }
}

/// Everything derived for one neighborhood.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodView<'a> {
    pub neighborhood: &'a Neighborhood,
    pub routes: Vec<RouteView<'a>>,
    /// Viewing order across all routes as `(route_index, index_in_route)`
    sequence: Vec<(usize, usize)>,
}

impl<'a> NeighborhoodView<'a> {
    /// No qualifying photos. Valid; the caller decides whether that matters.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn photo_count(&self) -> usize {
        self.sequence.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Photo at position `index` of the viewing order.
    pub fn get(&self, index: usize) -> Option<&PhotoPlacement<'a>> {
        let &(r, i) = self.sequence.get(index)?;
        self.routes.get(r)?.placements.get(i)
    }

    /// All photos in viewing order (capture time across routes).
    pub fn sequence(&self) -> impl Iterator<Item = &PhotoPlacement<'a>> + '_ {
        self.sequence
            .iter()
            .map(move |&(r, i)| &self.routes[r].placements[i])
    }

    /// Position of `path` in the viewing order.
    pub fn index_of(&self, path: &str) -> Option<usize> {
        self.sequence().position(|p| p.path() == path)
    }

    pub fn placement(&self, path: &str) -> Option<&PhotoPlacement<'a>> {
        self.sequence().find(|p| p.path() == path)
    }

    /// Bounding box of all true photo positions.
    pub fn bounds(&self) -> Option<Bounds> {
        let points: Vec<GpsPoint> = self.sequence().map(|p| p.position()).collect();
        Bounds::from_points(&points)
    }

    /// Map focus: the neighborhood's configured center, else the photo centroid.
    pub fn center(&self) -> Option<GpsPoint> {
        if let Some(center) = self.neighborhood.center_point() {
            return Some(center);
        }
        if self.is_empty() {
            return None;
        }
        let points: Vec<GpsPoint> = self.sequence().map(|p| p.position()).collect();
        Some(geo_utils::compute_center(&points))
    }
}

/// Build the view for neighborhood `id`.
///
/// An unknown id is an error; a neighborhood with no photos is an empty view.
pub fn build_view<'a>(
    photos: &'a PhotoCollection,
    neighborhoods: &'a NeighborhoodCollection,
    id: &str,
    config: &ViewConfig,
) -> Result<NeighborhoodView<'a>> {
    let neighborhood = neighborhoods.require(id)?;
    Ok(view_for_neighborhood(&photos.photos, neighborhood, config))
}

/// Build the view for an already-resolved neighborhood.
pub fn view_for_neighborhood<'a>(
    photos: &'a [PhotoRecord],
    neighborhood: &'a Neighborhood,
    config: &ViewConfig,
) -> NeighborhoodView<'a> {
    let selected = filter_neighborhood(photos, neighborhood);
    let routes = group_routes(&selected);

    let route_views: Vec<RouteView<'a>> = routes
        .iter()
        .enumerate()
        .map(|(route_index, route)| {
            let points = route.points();
            let bearings = route_bearings(&points);
            let offsets = resolve_offsets(&points, &config.offset);
            let color = route_color(route_index);

            let placements = route
                .photos
                .iter()
                .zip(bearings.into_iter().zip(offsets))
                .enumerate()
                .map(|(index_in_route, (photo, (bearing, offset)))| PhotoPlacement {
                    photo: *photo,
                    display_position: offset.apply(&photo.position),
                    offset,
                    bearing,
                    color,
                    route_index,
                    index_in_route,
                })
                .collect();

            RouteView { folder: route.folder, color, placements }
        })
        .collect();

    // `selected` is time-sorted and grouping is stable, so the n-th photo of a
    // folder in `selected` is the n-th photo of that route.
    let mut next_in_route = vec![0usize; route_views.len()];
    let sequence = selected
        .iter()
        .filter_map(|photo| {
            let r = route_views.iter().position(|rv| rv.folder == photo.folder())?;
            let i = next_in_route[r];
            next_in_route[r] += 1;
            Some((r, i))
        })
        .collect::<Vec<_>>();

    info!(
        "[Engine] '{}': {} photos in {} routes",
        neighborhood.id,
        sequence.len(),
        route_views.len()
    );

    NeighborhoodView { neighborhood, routes: route_views, sequence }
}

// ============================================================================
// Session
// ============================================================================

/// What the panorama renderer needs to open a photo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanoramaRequest {
    pub image_path: String,
    pub yaw: f64,
    pub pitch: f64,
    pub source: HeadingSource,
}

impl PanoramaRequest {
    pub fn for_photo(photo: &PhotoRecord, overrides: &OverrideMap) -> Self {
        let heading = resolve_heading(photo, overrides);
        Self {
            image_path: photo.path.clone(),
            yaw: heading.yaw(),
            pitch: heading.pitch(),
            source: heading.source(),
        }
    }
}

/// Presentation-side state: the open neighborhood and the photo on screen.
///
/// Navigation stops at either end of the viewing order rather than wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerSession {
    pub neighborhood_id: String,
    /// Position in the view's viewing order
    pub index: usize,
}

impl ViewerSession {
    pub fn start(view: &NeighborhoodView<'_>) -> Self {
        Self { neighborhood_id: view.neighborhood.id.clone(), index: 0 }
    }

    pub fn current<'v, 'a>(&self, view: &'v NeighborhoodView<'a>) -> Option<&'v PhotoPlacement<'a>> {
        view.get(self.index)
    }

    /// Move to the next photo. Returns false at the end.
    pub fn next(&mut self, view: &NeighborhoodView<'_>) -> bool {
        if self.index + 1 < view.photo_count() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous photo. Returns false at the start.
    pub fn previous(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Show the photo at `path`. Returns false if it is not in the view.
    pub fn jump_to(&mut self, view: &NeighborhoodView<'_>, path: &str) -> bool {
        match view.index_of(path) {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }

    pub fn panorama_request(
        &self,
        view: &NeighborhoodView<'_>,
        overrides: &OverrideMap,
    ) -> Option<PanoramaRequest> {
        self.current(view)
            .map(|p| PanoramaRequest::for_photo(p.record(), overrides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::ROUTE_PALETTE;
    use crate::error::EngineError;
    use crate::heading::HeadingOverride;

    fn photo(path: &str, folder: &str, second: u32, lat: f64, lon: f64) -> PhotoRecord {
        PhotoRecord::new(path, "2025-12-09", &format!("2025-12-09T10:00:{second:02}Z"), folder)
            .with_position(lat, lon)
    }

    fn fixture() -> (PhotoCollection, NeighborhoodCollection) {
        let photos = PhotoCollection::new(vec![
            photo("f2-a.jpg", "F2", 3, 35.7100, 139.7000),
            photo("f1-a.jpg", "F1", 0, 35.7000, 139.7000),
            photo("f1-b.jpg", "F1", 1, 35.7000, 139.7000),
            photo("f1-c.jpg", "F1", 2, 35.7010, 139.7000),
            photo("f2-b.jpg", "F2", 4, 35.7100, 139.7010),
            PhotoRecord::new("nogps.jpg", "2025-12-09", "2025-12-09T10:00:05Z", "F1"),
        ]);
        let neighborhoods = NeighborhoodCollection::new(vec![
            Neighborhood::new("kinshicho", "2025-12-09"),
            Neighborhood::new("empty", "2024-01-01"),
        ]);
        (photos, neighborhoods)
    }

    #[test]
    fn test_build_view() {
        let (photos, neighborhoods) = fixture();
        let view = build_view(&photos, &neighborhoods, "kinshicho", &ViewConfig::default()).unwrap();

        assert_eq!(view.photo_count(), 5);
        assert_eq!(view.route_count(), 2);
        assert_eq!(view.routes[0].folder, "F1");
        assert_eq!(view.routes[0].color, ROUTE_PALETTE[0]);
        assert_eq!(view.routes[1].color, ROUTE_PALETTE[1]);

        let order: Vec<&str> = view.sequence().map(|p| p.path()).collect();
        assert_eq!(order, vec!["f1-a.jpg", "f1-b.jpg", "f1-c.jpg", "f2-a.jpg", "f2-b.jpg"]);

        // Second photo at the same spot is pushed off the anchor
        let a = view.placement("f1-a.jpg").unwrap();
        let b = view.placement("f1-b.jpg").unwrap();
        assert!(a.offset.is_zero());
        assert!(!b.offset.is_zero());
        assert_ne!(a.display_position, b.display_position);
        assert_eq!(a.position(), b.position());

        // f1-c heads north from f1-b; last photo carries the leg forward
        assert!((b.bearing - 0.0).abs() < 1e-6);
        let c = view.placement("f1-c.jpg").unwrap();
        assert_eq!(c.bearing, b.bearing);

        assert!(view.placement("nogps.jpg").is_none());
    }

    #[test]
    fn test_interleaved_routes_sequence() {
        let photos = PhotoCollection::new(vec![
            photo("a1.jpg", "A", 0, 35.70, 139.70),
            photo("b1.jpg", "B", 1, 35.71, 139.70),
            photo("a2.jpg", "A", 2, 35.72, 139.70),
        ]);
        let nb = Neighborhood::new("n", "2025-12-09");
        let view = view_for_neighborhood(&photos.photos, &nb, &ViewConfig::default());

        let order: Vec<&str> = view.sequence().map(|p| p.path()).collect();
        assert_eq!(order, vec!["a1.jpg", "b1.jpg", "a2.jpg"]);
        assert_eq!(view.get(2).unwrap().route_index, 0);
        assert_eq!(view.get(2).unwrap().index_in_route, 1);
    }

    #[test]
    fn test_routes_do_not_share_offsets() {
        let photos = PhotoCollection::new(vec![
            photo("a.jpg", "A", 0, 35.70, 139.70),
            photo("b.jpg", "B", 1, 35.70, 139.70),
        ]);
        let nb = Neighborhood::new("n", "2025-12-09");
        let view = view_for_neighborhood(&photos.photos, &nb, &ViewConfig::default());
        assert!(view.sequence().all(|p| p.offset.is_zero()));
    }

    #[test]
    fn test_empty_and_missing() {
        let (photos, neighborhoods) = fixture();

        let view = build_view(&photos, &neighborhoods, "empty", &ViewConfig::default()).unwrap();
        assert!(view.is_empty());
        assert!(view.bounds().is_none());
        assert!(view.center().is_none());

        let missing = build_view(&photos, &neighborhoods, "nowhere", &ViewConfig::default());
        assert!(matches!(missing, Err(EngineError::NeighborhoodNotFound(_))));
    }

    #[test]
    fn test_session_navigation() {
        let (photos, neighborhoods) = fixture();
        let view = build_view(&photos, &neighborhoods, "kinshicho", &ViewConfig::default()).unwrap();
        let mut session = ViewerSession::start(&view);

        assert_eq!(session.neighborhood_id, "kinshicho");
        assert!(!session.previous());
        assert!(session.next(&view));
        assert_eq!(session.current(&view).unwrap().path(), "f1-b.jpg");

        assert!(session.jump_to(&view, "f2-b.jpg"));
        assert!(!session.next(&view));
        assert!(!session.jump_to(&view, "nogps.jpg"));
        assert_eq!(session.index, 4);
    }

    #[test]
    fn test_panorama_request() {
        let (photos, neighborhoods) = fixture();
        let view = build_view(&photos, &neighborhoods, "kinshicho", &ViewConfig::default()).unwrap();
        let session = ViewerSession::start(&view);

        let mut overrides = OverrideMap::new();
        let request = session.panorama_request(&view, &overrides).unwrap();
        assert_eq!(request.image_path, "f1-a.jpg");
        assert_eq!(request.source, HeadingSource::Default);

        overrides.insert("f1-a.jpg".to_string(), HeadingOverride::new(33.0, 4.0));
        let request = session.panorama_request(&view, &overrides).unwrap();
        assert_eq!((request.yaw, request.pitch, request.source), (33.0, 4.0, HeadingSource::Local));
    }

    #[test]
    fn test_view_config_defaults_from_partial_json() {
        let config: ViewConfig = serde_json::from_str(r#"{"offset": {"base_distance_deg": 0.0001}}"#).unwrap();
        assert_eq!(config.offset.base_distance_deg, 0.0001);
        assert_eq!(config.offset.golden_angle_deg, 137.5);
        assert_eq!(config.max_pick_distance_m, 25.0);
    }
}
