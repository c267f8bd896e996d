//! Folding exported heading overrides into the photo index.
//!
//! The client exports its local overrides as an [`OverrideExport`]; this
//! module turns such a file into permanent `yaw`/`pitch` values on the photo
//! records. Results are new collections: the input collection is left as-is,
//! and writing the result anywhere is up to the caller.
//!
//! [`OverrideExport`]: crate::heading::OverrideExport

use log::{info, warn};
use serde_json::Value;

use crate::error::Result;
use crate::heading::OverrideMap;
use crate::store::PhotoCollection;

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Paths whose heading was written
    pub updated: Vec<String>,
    /// Paths present in the export but not in the collection
    pub not_found: Vec<String>,
}

/// Read an override file.
///
/// Accepts a full export (`{exportedAt, count, overrides}`), an older file
/// wrapped in `adjustments`, or a bare `{path: {yaw, pitch}}` map.
pub fn parse_override_file(json: &str) -> Result<OverrideMap> {
    let mut doc: Value = serde_json::from_str(json)?;

    for key in ["overrides", "adjustments"] {
        if let Some(inner) = doc.get_mut(key).filter(|v| v.is_object()) {
            return Ok(serde_json::from_value(inner.take())?);
        }
    }

    Ok(serde_json::from_value(doc)?)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Write each override into the matching photo's `yaw`/`pitch`, rounded to
/// two decimals.
pub fn import_headings(
    collection: &PhotoCollection,
    overrides: &OverrideMap,
) -> (PhotoCollection, ImportReport) {
    let mut updated = collection.clone();
    let mut report = ImportReport::default();

    for (path, heading) in overrides {
        match updated.photos.iter_mut().find(|p| &p.path == path) {
            Some(photo) => {
                photo.yaw = Some(round2(heading.yaw));
                photo.pitch = Some(round2(heading.pitch));
                report.updated.push(path.clone());
            }
            None => {
                warn!("[Import] No photo at {}", path);
                report.not_found.push(path.clone());
            }
        }
    }

    info!(
        "[Import] Updated {} photos, {} not found",
        report.updated.len(),
        report.not_found.len()
    );
    (updated, report)
}

/// Remove every persisted heading. Returns the new collection and the number
/// of photos that had one.
pub fn clear_persisted_headings(collection: &PhotoCollection) -> (PhotoCollection, usize) {
    let mut cleared = collection.clone();
    let mut count = 0;

    for photo in cleared.photos.iter_mut().filter(|p| p.has_persisted_heading()) {
        photo.yaw = None;
        photo.pitch = None;
        count += 1;
    }

    info!("[Import] Cleared headings from {} photos", count);
    (cleared, count)
}
