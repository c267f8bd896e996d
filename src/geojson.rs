//! GeoJSON for the map renderer.
//!
//! Route lines are drawn through the stored positions; photo markers sit at
//! their display positions so stacked photos stay clickable. Coordinates are
//! `[lon, lat]`.

use serde_json::{json, Value};

use crate::engine::{NeighborhoodView, PhotoPlacement, RouteView};

fn route_feature(route: &RouteView<'_>) -> Value {
    let coordinates: Vec<[f64; 2]> = route.line().iter().map(|p| p.lon_lat()).collect();
    json!({
        "type": "Feature",
        "geometry": { "type": "LineString", "coordinates": coordinates },
        "properties": { "folder": route.folder, "color": route.color },
    })
}

fn photo_feature(index: usize, placement: &PhotoPlacement<'_>) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": placement.display_position.lon_lat() },
        "properties": {
            "path": placement.path(),
            "folder": placement.photo.folder(),
            "color": placement.color,
            "bearing": placement.bearing,
            "index": index,
        },
    })
}

/// Render a view as one `FeatureCollection`: a `LineString` for every route
/// with at least two photos, then a `Point` per photo in viewing order.
pub fn view_to_geojson(view: &NeighborhoodView<'_>) -> Value {
    let lines = view
        .routes
        .iter()
        .filter(|r| r.len() >= 2)
        .map(route_feature);
    let points = view
        .sequence()
        .enumerate()
        .map(|(i, p)| photo_feature(i, p));

    json!({
        "type": "FeatureCollection",
        "features": lines.chain(points).collect::<Vec<_>>(),
    })
}
