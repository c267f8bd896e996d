//! # Photo Route
//!
//! Route and heading engine for geotagged 360° street photos grouped into
//! neighborhood walks.
//!
//! This library provides:
//! - Neighborhood filtering by capture date and time window
//! - Route grouping by capture session, with per-photo travel bearing
//! - Spiral display offsets for photos taken at the same spot
//! - Heading resolution with locally saved overrides and an export artifact
//! - Batch tooling: importing exported headings, photo database export (CSV, GeoJSON)
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel neighborhood assignment with rayon
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use photo_route::{build_view, NeighborhoodCollection, PhotoCollection, ViewConfig};
//!
//! let photos = PhotoCollection::from_json(r#"{"photos": [
//!     {"path": "a.jpg", "date": "2025-12-09", "timestamp": "2025-12-09T10:00:00Z",
//!      "lat": 35.6950, "lon": 139.8140, "folder": "F1"},
//!     {"path": "b.jpg", "date": "2025-12-09", "timestamp": "2025-12-09T10:00:30Z",
//!      "lat": 35.6960, "lon": 139.8140, "folder": "F1"}
//! ]}"#).unwrap();
//! let neighborhoods = NeighborhoodCollection::from_json(r#"{"neighborhoods": [
//!     {"id": "kinshicho", "name": "Kinshicho", "date": "2025-12-09"}
//! ]}"#).unwrap();
//!
//! let view = build_view(&photos, &neighborhoods, "kinshicho", &ViewConfig::default()).unwrap();
//! for route in &view.routes {
//!     for placement in &route.placements {
//!         println!("{} heading {:.0}°", placement.path(), placement.bearing);
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{EngineError, Result};

pub mod geo_utils;

// Photo and neighborhood documents
pub mod store;
pub use store::{
    parse_instant, FolderInfo, MapCenter, Neighborhood, NeighborhoodCollection, PhotoCollection,
    PhotoRecord, TimeRange,
};

// Pipeline stages
pub mod filter;
pub use filter::{
    assign_neighborhoods, filter_neighborhood, neighborhood_for_photo, photo_qualifies,
    PositionedPhoto,
};
#[cfg(feature = "parallel")]
pub use filter::assign_neighborhoods_parallel;

pub mod routes;
pub use routes::{group_routes, Route};

pub mod bearing;
pub use bearing::route_bearings;
pub use geo_utils::initial_bearing;

pub mod offset;
pub use offset::{resolve_offsets, spiral_offset, Offset, OffsetConfig};

pub mod colors;
pub use colors::{assign_route_colors, route_color, ROUTE_PALETTE};

// Headings and their persistence
pub mod storage;
pub use storage::{JsonFileBackend, MemoryBackend, OverrideBackend};

pub mod heading;
pub use heading::{
    resolve_heading, Heading, HeadingOverride, HeadingSource, OverrideExport, OverrideMap,
    OverrideStore,
};

pub mod import;
pub use import::{clear_persisted_headings, import_headings, parse_override_file, ImportReport};

// Views and renderer-facing output
pub mod engine;
pub use engine::{
    build_view, view_for_neighborhood, NeighborhoodView, PanoramaRequest, PhotoPlacement,
    RouteView, ViewConfig, ViewerSession,
};

pub mod spatial;
pub use spatial::PhotoIndex;

pub mod geojson;
pub use geojson::view_to_geojson;

pub mod export;
pub use export::{
    build_photo_rows, build_photo_rows_with_snapped, load_snapped_coords, parse_snapped_geojson,
    photo_id, rows_to_csv, rows_to_geojson, PhotoDbRow, RowFilter, SnappedCoords, CSV_COLUMNS,
};

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use photo_route::GpsPoint;
/// let point = GpsPoint::new(35.6961, 139.8145); // Kinshicho
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// `[lon, lat]`, the GeoJSON coordinate order.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// Bounding box of a set of photos.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self { min_lat, max_lat, min_lng, max_lng })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// True if `point` lies inside the box, edges included.
    pub fn contains(&self, point: &GpsPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }
}
