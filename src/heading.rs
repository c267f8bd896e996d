//! # Heading Resolution
//!
//! Decides the yaw/pitch a panorama opens at. Three sources, highest first:
//!
//! 1. **Local override** - saved by the user in this client, keyed by photo path
//! 2. **Persisted value** - `yaw`/`pitch` on the photo record, folded in by the
//!    import tool
//! 3. **Default** - `(0, 0)`
//!
//! Resolution is a pure function of the photo and the override map. The only
//! mutable state is the [`OverrideStore`], which writes the whole map to its
//! backend after every change and reads it once on load.
//!
//! ## Example
//!
//! ```rust
//! use photo_route::{HeadingSource, MemoryBackend, OverrideStore, PhotoRecord};
//!
//! let photo = PhotoRecord::new("2025-12-09/F1/IMG_1.jpg", "2025-12-09", "2025-12-09T10:00:00Z", "F1")
//!     .with_heading(Some(45.0), None);
//!
//! let mut store = OverrideStore::load(MemoryBackend::new());
//! assert_eq!(store.resolve(&photo).source(), HeadingSource::Persisted);
//!
//! store.save_override(&photo.path, 10.0, -5.0);
//! let heading = store.resolve(&photo);
//! assert_eq!((heading.yaw(), heading.pitch(), heading.source()), (10.0, -5.0, HeadingSource::Local));
//!
//! store.clear_override(&photo.path);
//! assert_eq!(store.resolve(&photo).yaw(), 45.0);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::storage::OverrideBackend;
use crate::store::PhotoRecord;

/// A user-authored yaw/pitch correction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadingOverride {
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub pitch: f64,
}

impl HeadingOverride {
    pub fn new(yaw: f64, pitch: f64) -> Self {
        Self { yaw, pitch }
    }
}

/// Photo path -> override. Ordered so serialized output is stable.
pub type OverrideMap = BTreeMap<String, HeadingOverride>;

/// Where a resolved heading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingSource {
    Local,
    Persisted,
    Default,
}

impl HeadingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingSource::Local => "local",
            HeadingSource::Persisted => "persisted",
            HeadingSource::Default => "default",
        }
    }
}

impl fmt::Display for HeadingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved view heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Heading {
    /// From the local override store
    Local(HeadingOverride),
    /// From the photo record; a missing half is 0
    Persisted { yaw: f64, pitch: f64 },
    /// No source had a value
    Default,
}

impl Heading {
    pub fn yaw(&self) -> f64 {
        match *self {
            Heading::Local(o) => o.yaw,
            Heading::Persisted { yaw, .. } => yaw,
            Heading::Default => 0.0,
        }
    }

    pub fn pitch(&self) -> f64 {
        match *self {
            Heading::Local(o) => o.pitch,
            Heading::Persisted { pitch, .. } => pitch,
            Heading::Default => 0.0,
        }
    }

    pub fn source(&self) -> HeadingSource {
        match self {
            Heading::Local(_) => HeadingSource::Local,
            Heading::Persisted { .. } => HeadingSource::Persisted,
            Heading::Default => HeadingSource::Default,
        }
    }
}

/// Resolve the heading for one photo.
pub fn resolve_heading(photo: &PhotoRecord, overrides: &OverrideMap) -> Heading {
    if let Some(o) = overrides.get(&photo.path) {
        return Heading::Local(*o);
    }
    if photo.has_persisted_heading() {
        return Heading::Persisted {
            yaw: photo.yaw.unwrap_or(0.0),
            pitch: photo.pitch.unwrap_or(0.0),
        };
    }
    Heading::Default
}

/// Snapshot handed to the import tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideExport {
    #[serde(rename = "exportedAt")]
    pub exported_at: String,
    pub count: usize,
    pub overrides: OverrideMap,
}

impl OverrideExport {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Read a stored override map, keeping every well-formed entry.
///
/// A document that is not a JSON object gives an empty map. Single entries
/// that fail to parse are dropped with a warning.
fn parse_store(text: &str) -> OverrideMap {
    let entries = match serde_json::from_str::<Map<String, Value>>(text) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("[Headings] Ignoring malformed override store: {}", e);
            return OverrideMap::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|(path, value)| match serde_json::from_value::<HeadingOverride>(value) {
            Ok(o) => Some((path, o)),
            Err(e) => {
                warn!("[Headings] Dropping unreadable override for {}: {}", path, e);
                None
            }
        })
        .collect()
}

/// Local heading overrides backed by durable storage.
///
/// The in-memory map is authoritative for the session. A failed durable
/// write is logged and the change is kept in memory.
#[derive(Debug)]
pub struct OverrideStore<B: OverrideBackend> {
    overrides: OverrideMap,
    backend: B,
}

impl<B: OverrideBackend> OverrideStore<B> {
    /// Load the whole store from `backend`.
    ///
    /// Missing data gives an empty store. Unreadable or malformed data is
    /// logged and also gives an empty store.
    pub fn load(backend: B) -> Self {
        let overrides = match backend.read() {
            Ok(None) => OverrideMap::new(),
            Ok(Some(text)) => parse_store(&text),
            Err(e) => {
                warn!("[Headings] Could not read override store: {}", e);
                OverrideMap::new()
            }
        };

        debug!("[Headings] Loaded {} local overrides", overrides.len());
        Self { overrides, backend }
    }

    pub fn overrides(&self) -> &OverrideMap {
        &self.overrides
    }

    pub fn get(&self, path: &str) -> Option<HeadingOverride> {
        self.overrides.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn resolve(&self, photo: &PhotoRecord) -> Heading {
        resolve_heading(photo, &self.overrides)
    }

    /// Insert or replace the override for `path`, then persist.
    ///
    /// Returns whether the durable write succeeded. Non-finite angles are
    /// rejected and leave the store unchanged.
    pub fn save_override(&mut self, path: &str, yaw: f64, pitch: f64) -> bool {
        if !yaw.is_finite() || !pitch.is_finite() {
            warn!("[Headings] Rejected non-finite heading for {}: yaw {}, pitch {}", path, yaw, pitch);
            return false;
        }
        self.overrides.insert(path.to_string(), HeadingOverride::new(yaw, pitch));
        debug!("[Headings] Saved {} -> yaw {:.1}, pitch {:.1}", path, yaw, pitch);
        self.persist()
    }

    /// Remove the local override for `path`, falling back to the persisted
    /// or default heading. The photo's own `yaw`/`pitch` are untouched.
    pub fn clear_override(&mut self, path: &str) -> Option<HeadingOverride> {
        let removed = self.overrides.remove(path)?;
        debug!("[Headings] Cleared {}", path);
        self.persist();
        Some(removed)
    }

    /// Serialized form written to the backend.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.overrides)?)
    }

    /// Snapshot of every override, stamped with the current time.
    pub fn export_snapshot(&self) -> OverrideExport {
        self.export_snapshot_at(Utc::now())
    }

    pub fn export_snapshot_at(&self, now: DateTime<Utc>) -> OverrideExport {
        OverrideExport {
            exported_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            count: self.overrides.len(),
            overrides: self.overrides.clone(),
        }
    }

    fn persist(&mut self) -> bool {
        let written = self
            .to_json()
            .and_then(|text| self.backend.write(&text));
        match written {
            Ok(()) => true,
            Err(e) => {
                warn!("[Headings] Override store not persisted, keeping in memory: {}", e);
                false
            }
        }
    }
}
