//! Map-click lookup.
//!
//! Indexes each photo's drawn (offset) position in an R-tree so a click can
//! be resolved to the photo under it. Offsets matter here: two photos taken
//! at the same spot are only separable by their display positions.

use rstar::{RTree, RTreeObject, AABB};

use crate::engine::{NeighborhoodView, PhotoPlacement, ViewConfig};
use crate::geo_utils::{haversine_distance, meters_to_degrees};
use crate::GpsPoint;

/// A photo marker in the R-tree.
#[derive(Debug, Clone)]
struct Marker {
    position: GpsPoint,
    /// Index into the view's viewing order
    sequence_index: usize,
}

impl RTreeObject for Marker {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.position.longitude, self.position.latitude])
    }
}

/// Spatial index over a neighborhood view's markers.
pub struct PhotoIndex {
    tree: RTree<Marker>,
}

impl PhotoIndex {
    pub fn build(view: &NeighborhoodView<'_>) -> Self {
        let markers: Vec<Marker> = view
            .sequence()
            .enumerate()
            .map(|(sequence_index, p)| Marker { position: p.display_position, sequence_index })
            .collect();
        Self { tree: RTree::bulk_load(markers) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Viewing-order indices of every marker within `radius_m` of `point`,
    /// nearest first. Equal distances keep viewing order.
    pub fn within(&self, point: &GpsPoint, radius_m: f64) -> Vec<usize> {
        let deg = meters_to_degrees(radius_m, point.latitude);
        let search = AABB::from_corners(
            [point.longitude - deg, point.latitude - deg],
            [point.longitude + deg, point.latitude + deg],
        );

        let mut hits: Vec<(f64, usize)> = self
            .tree
            .locate_in_envelope(&search)
            .map(|m| (haversine_distance(point, &m.position), m.sequence_index))
            .filter(|(d, _)| *d <= radius_m)
            .collect();

        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, idx)| idx).collect()
    }

    /// Viewing-order index of the marker closest to `point`, if any lies
    /// within `max_distance_m`.
    pub fn nearest(&self, point: &GpsPoint, max_distance_m: f64) -> Option<usize> {
        self.within(point, max_distance_m).into_iter().next()
    }

    /// Resolve a map click against `view`, which must be the view this index
    /// was built from.
    pub fn pick<'v, 'a>(
        &self,
        view: &'v NeighborhoodView<'a>,
        click: &GpsPoint,
        config: &ViewConfig,
    ) -> Option<&'v PhotoPlacement<'a>> {
        self.nearest(click, config.max_pick_distance_m)
            .and_then(|index| view.get(index))
    }
}
