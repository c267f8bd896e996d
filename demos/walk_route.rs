//! Walk through one neighborhood: routes, bearings, offsets, a viewing
//! session with a saved heading, and the resulting export artifact.
//!
//! Run with: RUST_LOG=debug cargo run --example walk_route

use photo_route::{
    build_view, view_to_geojson, MemoryBackend, NeighborhoodCollection, OverrideStore,
    PhotoCollection, PhotoIndex, ViewConfig, ViewerSession,
};

const PHOTOS: &str = r#"{
    "photos": [
        {"path": "2025-12-09/F1/IMG_001.jpg", "date": "2025-12-09", "timestamp": "2025-12-09T10:00:00Z",
         "lat": 35.69610, "lon": 139.81450, "folder": "F1"},
        {"path": "2025-12-09/F1/IMG_002.jpg", "date": "2025-12-09", "timestamp": "2025-12-09T10:00:20Z",
         "lat": 35.69610, "lon": 139.81450, "folder": "F1"},
        {"path": "2025-12-09/F1/IMG_003.jpg", "date": "2025-12-09", "timestamp": "2025-12-09T10:00:40Z",
         "lat": 35.69650, "lon": 139.81450, "folder": "F1", "yaw": 45.0, "pitch": 0.0},
        {"path": "2025-12-09/F2/IMG_004.jpg", "date": "2025-12-09", "timestamp": "2025-12-09T10:05:00Z",
         "lat": 35.69700, "lon": 139.81500, "folder": "F2"},
        {"path": "2025-12-09/F2/IMG_005.jpg", "date": "2025-12-09", "timestamp": "2025-12-09T10:05:30Z",
         "lat": 35.69700, "lon": 139.81560, "folder": "F2"},
        {"path": "2025-12-09/F2/IMG_006.jpg", "date": "2025-12-09", "timestamp": "2025-12-09T10:06:00Z",
         "folder": "F2"}
    ]
}"#;

const NEIGHBORHOODS: &str = r#"{
    "neighborhoods": [
        {"id": "kinshicho", "name": "Kinshicho", "nameJa": "錦糸町", "date": "2025-12-09",
         "center": [35.6965, 139.8150]}
    ]
}"#;

fn main() -> photo_route::Result<()> {
    env_logger::init();

    let photos = PhotoCollection::from_json(PHOTOS)?;
    let neighborhoods = NeighborhoodCollection::from_json(NEIGHBORHOODS)?;
    let config = ViewConfig::default();

    let view = build_view(&photos, &neighborhoods, "kinshicho", &config)?;

    println!("Neighborhood '{}'\n", view.neighborhood.name);
    for route in &view.routes {
        println!("Route {} ({}), {:.0}m:", route.folder, route.color, route.length_meters());
        for p in &route.placements {
            println!(
                "   {}  bearing {:>5.1}°  offset ({:+.6}, {:+.6})",
                p.path(),
                p.bearing,
                p.offset.d_lat,
                p.offset.d_lon
            );
        }
        println!();
    }

    // Click next to the second photo's marker
    let index = PhotoIndex::build(&view);
    if let Some(second) = view.get(1) {
        if let Some(hit) = index.pick(&view, &second.display_position, &config) {
            println!("Map click resolved to {}\n", hit.path());
        }
    }

    // Step through the session, adjusting the heading of one photo
    let mut store = OverrideStore::load(MemoryBackend::new());
    let mut session = ViewerSession::start(&view);
    loop {
        if let Some(request) = session.panorama_request(&view, store.overrides()) {
            println!(
                "{:>2}: {} yaw={} pitch={} ({})",
                session.index, request.image_path, request.yaw, request.pitch, request.source
            );
        }
        if session.index == 1 {
            if let Some(current) = session.current(&view) {
                store.save_override(current.path(), 120.0, -5.0);
            }
        }
        if !session.next(&view) {
            break;
        }
    }

    println!("\nExport artifact:\n{}", store.export_snapshot().to_json_pretty()?);
    println!("\nMap layer:\n{}", serde_json::to_string_pretty(&view_to_geojson(&view))?);
    Ok(())
}
