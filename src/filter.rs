//! Neighborhood filtering.
//!
//! A photo belongs to a neighborhood when it was captured on the
//! neighborhood's date, has both coordinates, and (if the neighborhood has a
//! time window) its capture instant lies inside the window, bounds included.
//! Window checks compare parsed instants, never raw strings.

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::store::{Neighborhood, NeighborhoodCollection, PhotoRecord};
use crate::GpsPoint;

/// A photo that passed the coordinate check, with its parsed position and
/// capture instant cached for downstream stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedPhoto<'a> {
    pub record: &'a PhotoRecord,
    pub position: GpsPoint,
    pub instant: Option<DateTime<Utc>>,
}

impl<'a> PositionedPhoto<'a> {
    /// Wrap a record, or `None` if it has no usable coordinates.
    pub fn from_record(record: &'a PhotoRecord) -> Option<Self> {
        Some(Self {
            record,
            position: record.position()?,
            instant: record.instant(),
        })
    }

    pub fn path(&self) -> &'a str {
        &self.record.path
    }

    pub fn folder(&self) -> &'a str {
        &self.record.folder
    }
}

/// Parsed time window of a neighborhood.
///
/// `Ok(None)` means no window; `Err(())` means the window is present but
/// unreadable, in which case nothing qualifies.
fn window(neighborhood: &Neighborhood) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, ()> {
    match &neighborhood.time_range {
        None => Ok(None),
        Some(range) => range.bounds().map(Some).map_err(|e| {
            warn!(
                "[Filter] Neighborhood '{}' has an unreadable time range: {}",
                neighborhood.id, e
            );
        }),
    }
}

fn within(
    photo: &PhotoRecord,
    neighborhood: &Neighborhood,
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> bool {
    if neighborhood.date.is_empty()
        || photo.date != neighborhood.date
        || photo.position().is_none()
    {
        return false;
    }
    match window {
        None => true,
        Some((start, end)) => photo
            .instant()
            .map_or(false, |t| start <= t && t <= end),
    }
}

/// Check whether a single photo qualifies for a neighborhood.
pub fn photo_qualifies(photo: &PhotoRecord, neighborhood: &Neighborhood) -> bool {
    match window(neighborhood) {
        Ok(w) => within(photo, neighborhood, w),
        Err(()) => false,
    }
}

/// Select a neighborhood's photos, ordered by capture instant.
///
/// The sort is stable, so photos with equal instants keep their collection
/// order. Photos with an unreadable timestamp sort first. An empty result is
/// valid and not an error.
pub fn filter_neighborhood<'a>(
    photos: &'a [PhotoRecord],
    neighborhood: &Neighborhood,
) -> Vec<PositionedPhoto<'a>> {
    if neighborhood.date.is_empty() {
        return Vec::new();
    }
    let Ok(window) = window(neighborhood) else {
        return Vec::new();
    };

    let mut missing_coords = 0usize;
    let mut selected: Vec<PositionedPhoto<'a>> = photos
        .iter()
        .filter(|p| p.date == neighborhood.date)
        .filter_map(|p| {
            let positioned = PositionedPhoto::from_record(p);
            if positioned.is_none() {
                missing_coords += 1;
            }
            positioned
        })
        .filter(|p| match window {
            None => true,
            Some((start, end)) => p.instant.map_or(false, |t| start <= t && t <= end),
        })
        .collect();

    if missing_coords > 0 {
        debug!(
            "[Filter] '{}': skipped {} photos without coordinates",
            neighborhood.id, missing_coords
        );
    }

    selected.sort_by_key(|p| p.instant);
    selected
}

/// First neighborhood (in collection order) the photo qualifies for.
pub fn neighborhood_for_photo<'n>(
    photo: &PhotoRecord,
    neighborhoods: &'n NeighborhoodCollection,
) -> Option<&'n Neighborhood> {
    neighborhoods.iter().find(|nb| photo_qualifies(photo, nb))
}

/// Assign every photo to its neighborhood. Output is index-aligned with `photos`.
pub fn assign_neighborhoods<'n>(
    photos: &[PhotoRecord],
    neighborhoods: &'n NeighborhoodCollection,
) -> Vec<Option<&'n Neighborhood>> {
    let windows = windows(neighborhoods);
    photos
        .iter()
        .map(|photo| first_match(photo, neighborhoods, &windows))
        .collect()
}

/// Assign every photo to its neighborhood using parallel processing.
///
/// Same result as [`assign_neighborhoods`]; worthwhile for full collections
/// of several thousand photos.
#[cfg(feature = "parallel")]
pub fn assign_neighborhoods_parallel<'n>(
    photos: &[PhotoRecord],
    neighborhoods: &'n NeighborhoodCollection,
) -> Vec<Option<&'n Neighborhood>> {
    use rayon::prelude::*;

    let windows = windows(neighborhoods);
    photos
        .par_iter()
        .map(|photo| first_match(photo, neighborhoods, &windows))
        .collect()
}

type Window = Result<Option<(DateTime<Utc>, DateTime<Utc>)>, ()>;

fn windows(neighborhoods: &NeighborhoodCollection) -> Vec<Window> {
    neighborhoods.iter().map(window).collect()
}

fn first_match<'n>(
    photo: &PhotoRecord,
    neighborhoods: &'n NeighborhoodCollection,
    windows: &[Window],
) -> Option<&'n Neighborhood> {
    neighborhoods
        .iter()
        .zip(windows)
        .find(|(nb, w)| matches!(w, Ok(w) if within(photo, nb, *w)))
        .map(|(nb, _)| nb)
}
