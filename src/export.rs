//! Photo database export.
//!
//! Flattens the photo index into one row per photo, tagged with the
//! neighborhood it falls in, for loading into GIS tools as CSV or GeoJSON.
//! Rows are sorted by `(timestamp, path)` as strings, so the output is
//! stable across runs.
//!
//! Rows can also carry a corrected ("snapped") position next to the
//! recorded one, read from snapped-point GeoJSON files.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{EngineError, Result};
use crate::store::{NeighborhoodCollection, PhotoCollection, PhotoRecord};
use crate::GpsPoint;

/// Identifier of the CRS84 (lon/lat, WGS84) reference system.
const CRS84: &str = "urn:ogc:def:crs:OGC:1.3:CRS84";

/// CSV header, in [`PhotoDbRow`] field order.
pub const CSV_COLUMNS: [&str; 15] = [
    "photo_id",
    "neighborhood_id",
    "neighborhood_name",
    "neighborhood_name_ja",
    "lon",
    "lat",
    "lon_current",
    "lat_current",
    "ele",
    "date",
    "timestamp",
    "filename",
    "folder",
    "path",
    "gpx_file",
];

/// Snapped positions keyed by photo path.
pub type SnappedCoords = HashMap<String, GpsPoint>;

/// Which photos to export. `None` means no restriction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    /// Capture date, `YYYY-MM-DD`
    pub date: Option<String>,
    /// Neighborhood id; must exist in the collection
    pub neighborhood: Option<String>,
    /// Capture session folder name
    pub folder: Option<String>,
}

/// One exported photo. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoDbRow {
    pub photo_id: String,
    pub neighborhood_id: String,
    pub neighborhood_name: String,
    pub neighborhood_name_ja: String,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    /// Snapped longitude, if one is known for this path
    pub lon_current: Option<f64>,
    pub lat_current: Option<f64>,
    pub ele: Option<f64>,
    pub date: String,
    pub timestamp: String,
    pub filename: String,
    pub folder: String,
    pub path: String,
    pub gpx_file: String,
}

/// Short id for a photo: the filename without an `IMG_` prefix or extension.
///
/// `IMG_20251209_125542_00_314.jpg` becomes `20251209_125542_00_314`. Falls
/// back to `date/folder/filename` when nothing is left.
pub fn photo_id(photo: &PhotoRecord) -> String {
    let filename = photo.filename.as_deref().unwrap_or("");
    let mut id = filename;
    if let Some(rest) = id
        .get(..4)
        .filter(|prefix| prefix.eq_ignore_ascii_case("IMG_"))
        .and_then(|_| id.get(4..))
    {
        id = rest;
    }
    if let Some((stem, _)) = id.rsplit_once('.') {
        id = stem;
    }
    if id.is_empty() {
        format!("{}/{}/{}", photo.date, photo.folder, filename)
    } else {
        id.to_string()
    }
}

/// Build export rows for the photos matching `filter`.
///
/// An unknown neighborhood id in the filter is an error.
pub fn build_photo_rows(
    photos: &PhotoCollection,
    neighborhoods: &NeighborhoodCollection,
    filter: &RowFilter,
) -> Result<Vec<PhotoDbRow>> {
    build_photo_rows_with_snapped(photos, neighborhoods, filter, &SnappedCoords::new())
}

/// Like [`build_photo_rows`], filling `lat_current`/`lon_current` from
/// `snapped` where a photo's path has an entry.
pub fn build_photo_rows_with_snapped(
    photos: &PhotoCollection,
    neighborhoods: &NeighborhoodCollection,
    filter: &RowFilter,
    snapped: &SnappedCoords,
) -> Result<Vec<PhotoDbRow>> {
    if let Some(id) = &filter.neighborhood {
        neighborhoods.require(id)?;
    }

    #[cfg(feature = "parallel")]
    let assigned = crate::filter::assign_neighborhoods_parallel(&photos.photos, neighborhoods);
    #[cfg(not(feature = "parallel"))]
    let assigned = crate::filter::assign_neighborhoods(&photos.photos, neighborhoods);

    let mut rows: Vec<PhotoDbRow> = photos
        .photos
        .iter()
        .zip(assigned)
        .filter(|(photo, _)| filter.date.as_ref().map_or(true, |d| &photo.date == d))
        .filter(|(photo, _)| filter.folder.as_ref().map_or(true, |f| &photo.folder == f))
        .filter(|(_, nb)| match &filter.neighborhood {
            None => true,
            Some(id) => nb.map_or(false, |nb| &nb.id == id),
        })
        .map(|(photo, nb)| {
            let current = snapped.get(&photo.path);
            PhotoDbRow {
                photo_id: photo_id(photo),
                neighborhood_id: nb.map(|n| n.id.clone()).unwrap_or_default(),
                neighborhood_name: nb.map(|n| n.name.clone()).unwrap_or_default(),
                neighborhood_name_ja: nb.map(|n| n.name_ja.clone()).unwrap_or_default(),
                lon: photo.lon,
                lat: photo.lat,
                lon_current: current.map(|p| p.longitude),
                lat_current: current.map(|p| p.latitude),
                ele: photo.ele,
                date: photo.date.clone(),
                timestamp: photo.timestamp.clone(),
                filename: photo.filename.clone().unwrap_or_default(),
                folder: photo.folder.clone(),
                path: photo.path.clone(),
                gpx_file: photos
                    .folder(&photo.folder)
                    .and_then(|f| f.gpx_file.clone())
                    .unwrap_or_default(),
            }
        })
        .collect();

    rows.sort_by(|a, b| (&a.timestamp, &a.path).cmp(&(&b.timestamp, &b.path)));

    info!("[Export] {} photo rows", rows.len());
    Ok(rows)
}

/// Read one snapped-point GeoJSON document.
///
/// Every `Point` feature with a `path` (or, failing that, `photo_id`)
/// property contributes an entry. Other features are skipped.
pub fn parse_snapped_geojson(json: &str) -> Result<SnappedCoords> {
    let doc: Value = serde_json::from_str(json)?;
    let mut coords = SnappedCoords::new();

    let features = doc
        .get("features")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    for feature in features {
        let geometry = &feature["geometry"];
        if geometry["type"] != "Point" {
            continue;
        }
        let coordinates = &geometry["coordinates"];
        let (Some(lon), Some(lat)) = (coordinates[0].as_f64(), coordinates[1].as_f64()) else {
            continue;
        };
        let properties = &feature["properties"];
        let key = ["path", "photo_id"]
            .iter()
            .filter_map(|k| properties[*k].as_str())
            .find(|k| !k.is_empty());
        if let Some(key) = key {
            coords.insert(key.to_string(), GpsPoint::new(lat, lon));
        }
    }

    Ok(coords)
}

/// Merge every `*.geojson` file in `dir`, in file-name order; later files
/// win on repeated paths.
///
/// A missing directory gives an empty map. Unreadable files are logged and
/// skipped.
pub fn load_snapped_coords(dir: &Path) -> Result<SnappedCoords> {
    let mut coords = SnappedCoords::new();
    if !dir.is_dir() {
        return Ok(coords);
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map_or(false, |ext| ext == "geojson"))
        .collect();
    files.sort();

    for file in &files {
        let parsed = fs::read_to_string(file)
            .map_err(EngineError::from)
            .and_then(|text| parse_snapped_geojson(&text));
        match parsed {
            Ok(found) => {
                debug!("[Export] {} snapped points from {}", found.len(), file.display());
                coords.extend(found);
            }
            Err(e) => warn!("[Export] Skipping {}: {}", file.display(), e),
        }
    }

    Ok(coords)
}

/// Write `rows` as CSV with a [`CSV_COLUMNS`] header. Missing values are
/// written as empty fields.
pub fn rows_to_csv<W: Write>(rows: &[PhotoDbRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CSV_COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Point features for every row with coordinates, in a CRS84
/// `FeatureCollection`. Empty and missing properties are omitted.
pub fn rows_to_geojson(rows: &[PhotoDbRow]) -> Result<Value> {
    let mut features = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(lat), Some(lon)) = (row.lat, row.lon) else {
            continue;
        };

        let properties: Map<String, Value> = match serde_json::to_value(row)? {
            Value::Object(map) => map
                .into_iter()
                .filter(|(_, v)| !v.is_null() && v.as_str() != Some(""))
                .collect(),
            _ => Map::new(),
        };

        features.push(json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [lon, lat] },
            "properties": properties,
        }));
    }

    Ok(json!({
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": CRS84 } },
        "features": features,
    }))
}
