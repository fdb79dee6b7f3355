//! CreateML JSON codec.
//!
//! A single JSON file holds an array of per-image entries:
//!
//! ```json
//! [
//!   {
//!     "image": "cat001.jpg",
//!     "annotations": [
//!       { "label": "cat",
//!         "coordinates": { "x": 200, "y": 250, "width": 200, "height": 300 } }
//!     ]
//!   }
//! ]
//! ```
//!
//! Coordinates are absolute pixels with `x`/`y` at the box center, the
//! convention CreateML tooling expects. Because one file can hold several
//! images' annotations, writes merge: only the entry matching the current
//! image is replaced, everything else is preserved. Reads extract only the
//! matching entry; an absent entry is an empty set.
//!
//! Lossy like YOLO: no colors, difficulty, or verified flag, and polygons
//! are coerced to their bounding box.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::format::error::{FormatError, ValidationWarning};
use crate::format::{ImageInfo, LoadedAnnotations, write_atomic};
use crate::model::{AnnotationSet, MIN_POLYGON_VERTICES, Rect, Shape};

/// Read the entry for this image from a CreateML annotation file.
pub fn read(path: &Path, info: &ImageInfo) -> Result<LoadedAnnotations, FormatError> {
    let content = std::fs::read_to_string(path)?;
    decode(&content, info)
}

/// Write an annotation set into a CreateML file, merging with any existing
/// entries for other images.
pub fn write(
    path: &Path,
    set: &AnnotationSet,
    info: &ImageInfo,
) -> Result<Vec<ValidationWarning>, FormatError> {
    let existing = if path.is_file() {
        Some(std::fs::read_to_string(path)?)
    } else {
        None
    };
    let (json, warnings) = encode(existing.as_deref(), set, info)?;
    write_atomic(path, &json)?;
    Ok(warnings)
}

/// Parse CreateML JSON and extract the shapes for this image.
pub fn decode(content: &str, info: &ImageInfo) -> Result<LoadedAnnotations, FormatError> {
    let entries: Vec<CreateMlEntry> = serde_json::from_str(content)?;

    let mut loaded = LoadedAnnotations::default();
    let Some(entry) = entries.iter().find(|e| e.image == info.file_name) else {
        log::warn!(
            "no CreateML entry for image '{}'; treating as empty",
            info.file_name
        );
        return Ok(loaded);
    };

    for ann in &entry.annotations {
        if ann.label.is_empty() {
            return Err(FormatError::missing_field("annotation.label"));
        }
        let c = &ann.coordinates;
        let rect = Rect::new(
            c.x - c.width / 2.0,
            c.y - c.height / 2.0,
            c.width,
            c.height,
        );
        loaded.shapes.push(Shape::from_rect(&ann.label, rect));
    }

    Ok(loaded)
}

/// Serialize an annotation set into CreateML JSON, merged over the existing
/// file content (if any).
pub fn encode(
    existing: Option<&str>,
    set: &AnnotationSet,
    info: &ImageInfo,
) -> Result<(String, Vec<ValidationWarning>), FormatError> {
    let mut entries: Vec<CreateMlEntry> = match existing {
        // Refuse to silently clobber a file we cannot parse
        Some(content) => serde_json::from_str(content)?,
        None => Vec::new(),
    };

    let mut warnings = Vec::new();
    let mut annotations = Vec::new();
    for shape in set.shapes() {
        if shape.points.len() < MIN_POLYGON_VERTICES {
            warnings.push(ValidationWarning::SkippedDegenerateShape {
                label: shape.label.clone(),
            });
            continue;
        }
        let Some(rect) = shape.bounding_rect() else {
            continue;
        };
        if !shape.is_rectangle() {
            warnings.push(ValidationWarning::CoercedToBoundingBox {
                label: shape.label.clone(),
            });
        }
        let center = rect.center();
        annotations.push(CreateMlAnnotation {
            label: shape.label.clone(),
            coordinates: CreateMlCoordinates {
                x: center.x,
                y: center.y,
                width: rect.width,
                height: rect.height,
            },
        });
    }

    let entry = CreateMlEntry {
        image: info.file_name.clone(),
        annotations,
    };
    match entries.iter_mut().find(|e| e.image == info.file_name) {
        Some(slot) => *slot = entry,
        None => entries.push(entry),
    }

    let json = serde_json::to_string_pretty(&entries)?;
    Ok((json, warnings))
}

// ============================================================================
// CreateML JSON Structures
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CreateMlEntry {
    image: String,
    #[serde(default)]
    annotations: Vec<CreateMlAnnotation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CreateMlAnnotation {
    label: String,
    coordinates: CreateMlCoordinates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CreateMlCoordinates {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}
