//! One-time upgrade of older database files.
//!
//! Older files stored regions in absolute coordinates on a fixed 1000-unit
//! canvas, kept the soundtrack as a bare path plus a sibling `audioName`, and
//! named the upload timestamp `uploadDate`. The upgrade rewrites those shapes
//! in the raw JSON before it is deserialized, so the model only ever sees
//! normalized regions.

use serde_json::{Map, Value};

use crate::constants::LEGACY_COORDINATE_SCALE;

const ABSOLUTE_FIELDS: [(&str, &str); 4] = [
    ("x", "relativeX"),
    ("y", "relativeY"),
    ("width", "relativeWidth"),
    ("height", "relativeHeight"),
];

/// Rewrite a raw database document into the current layout.
///
/// Documents already in the current layout pass through unchanged.
pub fn upgrade_database(mut document: Value) -> Value {
    let Some(images) = document.get_mut("images").and_then(Value::as_object_mut) else {
        return document;
    };

    let mut upgraded_regions = 0usize;
    for image in images.values_mut() {
        let Some(image) = image.as_object_mut() else {
            continue;
        };
        upgrade_upload_date(image);
        upgrade_audio(image);

        if let Some(regions) = image.get_mut("regions").and_then(Value::as_array_mut) {
            for region in regions.iter_mut().filter_map(Value::as_object_mut) {
                if upgrade_region(region) {
                    upgraded_regions += 1;
                }
            }
        }
    }

    if upgraded_regions > 0 {
        log::info!(
            "Migrated {} region(s) from absolute coordinates",
            upgraded_regions
        );
    }
    document
}

/// Derive relative fields from absolute ones. Returns whether anything changed.
fn upgrade_region(region: &mut Map<String, Value>) -> bool {
    if region.contains_key("relativeX") {
        return false;
    }
    let mut changed = false;
    for (absolute, relative) in ABSOLUTE_FIELDS {
        if let Some(value) = region.remove(absolute).and_then(|v| v.as_f64()) {
            region.insert(
                relative.to_string(),
                Value::from(value / LEGACY_COORDINATE_SCALE),
            );
            changed = true;
        }
    }
    changed
}

fn upgrade_audio(image: &mut Map<String, Value>) {
    let name = image.remove("audioName");
    let Some(Value::String(path)) = image.get("audio").cloned() else {
        return;
    };
    let name = match name {
        Some(Value::String(name)) => name,
        _ => String::new(),
    };
    let mut track = Map::new();
    track.insert("path".to_string(), Value::String(path));
    track.insert("name".to_string(), Value::String(name));
    image.insert("audio".to_string(), Value::Object(track));
}

fn upgrade_upload_date(image: &mut Map<String, Value>) {
    if image.contains_key("uploadedAt") {
        return;
    }
    if let Some(date) = image.remove("uploadDate") {
        image.insert("uploadedAt".to_string(), date);
    }
}
