//! # Photo Record Store
//!
//! In-memory shape of the two JSON documents produced by the batch
//! geotagging tools: the photo index (`{photos, folders}`) and the
//! neighborhood list (`{neighborhoods}`).
//!
//! Nothing here computes anything; records are loaded once and treated as
//! immutable for the rest of a viewing session. Fields the engine does not
//! understand are kept in `extra` so a collection can be written back
//! without losing data.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EngineError, Result};
use crate::GpsPoint;

/// Parse an ISO-8601 capture instant.
///
/// Accepts RFC 3339 (with `Z` or a numeric offset). Timestamps without an
/// offset, as written by cameras that record local time only, are read as UTC.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| EngineError::InvalidTimestamp { value: value.to_string() })
}

// ============================================================================
// Photos
// ============================================================================

/// One captured panorama.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Stable location string, also the key for heading overrides
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Capture date, `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    /// Capture instant, ISO-8601
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ele: Option<f64>,
    /// Capture session this photo belongs to
    #[serde(default)]
    pub folder: String,
    /// Permanent heading, written by the import tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PhotoRecord {
    /// Create a record without coordinates or heading.
    pub fn new(path: &str, date: &str, timestamp: &str, folder: &str) -> Self {
        Self {
            path: path.to_string(),
            filename: None,
            date: date.to_string(),
            timestamp: timestamp.to_string(),
            lat: None,
            lon: None,
            ele: None,
            folder: folder.to_string(),
            yaw: None,
            pitch: None,
            extra: Map::new(),
        }
    }

    pub fn with_position(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    pub fn with_heading(mut self, yaw: Option<f64>, pitch: Option<f64>) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }

    /// Coordinates of the photo, if both are present and valid.
    ///
    /// Photos without a position are metadata-only and take no part in any
    /// geospatial computation.
    pub fn position(&self) -> Option<GpsPoint> {
        let point = GpsPoint::new(self.lat?, self.lon?);
        point.is_valid().then_some(point)
    }

    /// Capture instant, or `None` if the timestamp is missing or unreadable.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.timestamp).ok()
    }

    /// True if the record carries a permanent yaw or pitch.
    pub fn has_persisted_heading(&self) -> bool {
        self.yaw.is_some() || self.pitch.is_some()
    }
}

/// Metadata for one capture session folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpx_file: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The full photo index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoCollection {
    #[serde(default)]
    pub photos: Vec<PhotoRecord>,
    #[serde(default)]
    pub folders: Vec<FolderInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PhotoCollection {
    pub fn new(photos: Vec<PhotoRecord>) -> Self {
        Self { photos, folders: Vec::new(), extra: Map::new() }
    }

    /// Parse the photo index document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a photo by its path.
    pub fn photo(&self, path: &str) -> Option<&PhotoRecord> {
        self.photos.iter().find(|p| p.path == path)
    }

    /// Look up folder metadata by name.
    pub fn folder(&self, name: &str) -> Option<&FolderInfo> {
        self.folders.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}

// ============================================================================
// Neighborhoods
// ============================================================================

/// Inclusive window of capture instants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    pub fn new(start: &str, end: &str) -> Self {
        Self { start: start.to_string(), end: end.to_string() }
    }

    /// Parsed `(start, end)` instants.
    pub fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        Ok((parse_instant(&self.start)?, parse_instant(&self.end)?))
    }
}

/// Map focus point, written either as `[lat, lon]` or `{lat, lon}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MapCenter {
    Pair([f64; 2]),
    Object {
        lat: f64,
        #[serde(alias = "lng")]
        lon: f64,
    },
}

impl MapCenter {
    pub fn point(&self) -> GpsPoint {
        match *self {
            MapCenter::Pair([lat, lon]) => GpsPoint::new(lat, lon),
            MapCenter::Object { lat, lon } => GpsPoint::new(lat, lon),
        }
    }
}

/// A named viewing collection: one date, optionally narrowed by a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighborhood {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "nameJa", default)]
    pub name_ja: String,
    #[serde(default)]
    pub description: String,
    /// Capture date, `YYYY-MM-DD`. Empty matches no photo.
    #[serde(default)]
    pub date: String,
    #[serde(rename = "timeRange", default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<MapCenter>,
}

impl Neighborhood {
    pub fn new(id: &str, date: &str) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            name_ja: String::new(),
            description: String::new(),
            date: date.to_string(),
            time_range: None,
            center: None,
        }
    }

    pub fn with_time_range(mut self, start: &str, end: &str) -> Self {
        self.time_range = Some(TimeRange::new(start, end));
        self
    }

    pub fn center_point(&self) -> Option<GpsPoint> {
        self.center.map(|c| c.point())
    }
}

/// The neighborhood list document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodCollection {
    #[serde(default)]
    pub neighborhoods: Vec<Neighborhood>,
}

impl NeighborhoodCollection {
    pub fn new(neighborhoods: Vec<Neighborhood>) -> Self {
        Self { neighborhoods }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn get(&self, id: &str) -> Option<&Neighborhood> {
        self.neighborhoods.iter().find(|n| n.id == id)
    }

    /// Like [`get`](Self::get), but a missing id is an error the caller
    /// must handle (redirect or abort).
    pub fn require(&self, id: &str) -> Result<&Neighborhood> {
        self.get(id)
            .ok_or_else(|| EngineError::NeighborhoodNotFound(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Neighborhood> {
        self.neighborhoods.iter()
    }

    pub fn len(&self) -> usize {
        self.neighborhoods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighborhoods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_instant_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 12, 9, 3, 55, 42).unwrap();
        assert_eq!(parse_instant("2025-12-09T03:55:42Z").unwrap(), expected);
        assert_eq!(parse_instant("2025-12-09T12:55:42+09:00").unwrap(), expected);
        assert_eq!(parse_instant("2025-12-09T03:55:42").unwrap(), expected);
        assert_eq!(parse_instant("2025-12-09 03:55:42").unwrap(), expected);
        assert!(parse_instant("2025-12-09T03:55:42.250").is_ok());
        assert!(matches!(
            parse_instant("not a time"),
            Err(EngineError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_position_requires_both_coordinates() {
        let photo = PhotoRecord::new("a.jpg", "2025-12-09", "2025-12-09T10:00:00Z", "F1");
        assert!(photo.position().is_none());

        let mut half = photo.clone();
        half.lat = Some(35.7);
        assert!(half.position().is_none());

        let full = photo.with_position(35.7, 139.7);
        assert_eq!(full.position(), Some(GpsPoint::new(35.7, 139.7)));
    }

    #[test]
    fn test_parse_photo_collection() {
        let json = r#"{
            "generated": "2026-02-03T10:00:00",
            "photos": [
                {"path": "2025-12-09/F1/IMG_1.jpg", "filename": "IMG_1.jpg",
                 "date": "2025-12-09", "timestamp": "2025-12-09T10:00:00Z",
                 "lat": 35.7, "lon": 139.7, "folder": "F1", "yaw": 12.5, "camera": "X4"},
                {"path": "2025-12-09/F1/IMG_2.jpg", "date": "2025-12-09",
                 "timestamp": "2025-12-09T10:00:05Z", "lat": null, "folder": "F1"}
            ],
            "folders": [{"name": "F1", "gpx_file": "walk.gpx", "photo_count": 2}]
        }"#;

        let collection = PhotoCollection::from_json(json).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.photos[0].yaw, Some(12.5));
        assert_eq!(collection.photos[0].pitch, None);
        assert!(collection.photos[0].has_persisted_heading());
        assert_eq!(collection.photos[0].extra.get("camera"), Some(&Value::from("X4")));
        assert!(collection.photos[1].position().is_none());
        assert_eq!(collection.folder("F1").unwrap().gpx_file.as_deref(), Some("walk.gpx"));
        assert!(collection.extra.contains_key("generated"));

        let written = collection.to_json_pretty().unwrap();
        assert_eq!(PhotoCollection::from_json(&written).unwrap(), collection);
    }

    #[test]
    fn test_parse_neighborhoods() {
        let json = r#"{"neighborhoods": [
            {"id": "kinshicho", "name": "Kinshicho", "nameJa": "錦糸町",
             "description": "", "date": "2025-12-09",
             "timeRange": {"start": "2025-12-09T01:00:00Z", "end": "2025-12-09T03:00:00Z"},
             "center": [35.696, 139.814]},
            {"id": "asakusa", "name": "Asakusa", "date": "2025-12-10",
             "center": {"lat": 35.711, "lng": 139.796}}
        ]}"#;

        let neighborhoods = NeighborhoodCollection::from_json(json).unwrap();
        assert_eq!(neighborhoods.len(), 2);

        let kinshicho = neighborhoods.get("kinshicho").unwrap();
        assert_eq!(kinshicho.name_ja, "錦糸町");
        assert!(kinshicho.time_range.as_ref().unwrap().bounds().is_ok());
        assert_eq!(kinshicho.center_point(), Some(GpsPoint::new(35.696, 139.814)));

        let asakusa = neighborhoods.require("asakusa").unwrap();
        assert_eq!(asakusa.center_point(), Some(GpsPoint::new(35.711, 139.796)));

        assert!(matches!(
            neighborhoods.require("ueno"),
            Err(EngineError::NeighborhoodNotFound(id)) if id == "ueno"
        ));
    }

    #[test]
    fn test_neighborhood_without_date() {
        let json = r#"{"neighborhoods": [
            {"id": "draft", "name": "Draft"},
            {"id": "asakusa", "date": "2025-12-10"}
        ]}"#;

        let neighborhoods = NeighborhoodCollection::from_json(json).unwrap();
        assert_eq!(neighborhoods.len(), 2);
        assert_eq!(neighborhoods.get("draft").unwrap().date, "");
    }
}
