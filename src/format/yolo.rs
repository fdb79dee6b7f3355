//! YOLO TXT codec.
//!
//! One text file per image, one row per shape:
//!
//! ```text
//! <class_idx> <cx> <cy> <w> <h>
//! ```
//!
//! with center/width/height normalized to the image dimensions, and a
//! `classes.txt` sidecar in the same directory mapping class indices to
//! label strings. Both read and write therefore need the image pixel
//! dimensions.
//!
//! Lossy: colors, difficulty, and the verified flag have no representation,
//! and any non-rectangular shape is coerced to its bounding box on write.

use std::path::Path;

use crate::format::error::{FormatError, ValidationWarning};
use crate::format::{ImageInfo, LoadedAnnotations, write_atomic};
use crate::model::{AnnotationSet, LabelHistory, MIN_POLYGON_VERTICES, Rect, Shape};

/// Read a YOLO annotation file, resolving class indices through the
/// `classes.txt` sidecar next to it.
pub fn read(path: &Path, info: &ImageInfo) -> Result<LoadedAnnotations, FormatError> {
    let classes_path = path
        .parent()
        .unwrap_or(Path::new("."))
        .join("classes.txt");
    if !classes_path.is_file() {
        return Err(FormatError::invalid_format(format!(
            "missing classes.txt next to {:?}",
            path
        )));
    }
    let classes: Vec<String> = std::fs::read_to_string(&classes_path)?
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    let content = std::fs::read_to_string(path)?;
    decode(&content, &classes, info, path)
}

/// Write an annotation set as YOLO rows plus the `classes.txt` sidecar.
pub fn write(
    path: &Path,
    set: &AnnotationSet,
    info: &ImageInfo,
    labels: &LabelHistory,
) -> Result<Vec<ValidationWarning>, FormatError> {
    let (rows, classes, warnings) = encode(set, info, labels)?;
    write_atomic(path, &rows)?;
    let classes_path = path
        .parent()
        .unwrap_or(Path::new("."))
        .join("classes.txt");
    write_atomic(&classes_path, &classes)?;
    Ok(warnings)
}

/// Parse YOLO rows into shapes, denormalizing with the image dimensions.
pub fn decode(
    content: &str,
    classes: &[String],
    info: &ImageInfo,
    path: &Path,
) -> Result<LoadedAnnotations, FormatError> {
    require_dimensions(info)?;

    let mut loaded = LoadedAnnotations::default();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(FormatError::invalid_format(format!(
                "line {}: expected 5 fields, got {}",
                line_no + 1,
                parts.len()
            )));
        }
        let index: usize = parse_field(parts[0], line_no, "class index")?;
        let cx: f32 = parse_field(parts[1], line_no, "cx")?;
        let cy: f32 = parse_field(parts[2], line_no, "cy")?;
        let w: f32 = parse_field(parts[3], line_no, "w")?;
        let h: f32 = parse_field(parts[4], line_no, "h")?;

        let label = classes.get(index).ok_or_else(|| FormatError::UnknownClassIndex {
            index,
            classes: classes.len(),
            path: path.to_path_buf(),
        })?;

        let rect = denormalize(cx, cy, w, h, info.width, info.height);
        loaded.shapes.push(Shape::from_rect(label, rect));
    }

    Ok(loaded)
}

/// Serialize an annotation set to `(rows, classes.txt content, warnings)`.
///
/// Class indices come from the label history, which the canvas keeps in sync
/// with every committed label.
pub fn encode(
    set: &AnnotationSet,
    info: &ImageInfo,
    labels: &LabelHistory,
) -> Result<(String, String, Vec<ValidationWarning>), FormatError> {
    require_dimensions(info)?;

    let mut warnings = Vec::new();
    let mut rows = Vec::new();

    for shape in set.shapes() {
        if shape.points.len() < MIN_POLYGON_VERTICES {
            warnings.push(ValidationWarning::SkippedDegenerateShape {
                label: shape.label.clone(),
            });
            continue;
        }
        // bounding_rect is Some for any non-empty point list
        let Some(rect) = shape.bounding_rect() else {
            continue;
        };
        if !shape.is_rectangle() {
            warnings.push(ValidationWarning::CoercedToBoundingBox {
                label: shape.label.clone(),
            });
        }

        let index = labels.index_of(&shape.label).ok_or_else(|| {
            FormatError::invalid_format(format!(
                "label '{}' missing from the class list",
                shape.label
            ))
        })?;

        let (cx, cy, w, h) = normalize(&rect, info.width, info.height);
        rows.push(format!("{} {:.6} {:.6} {:.6} {:.6}", index, cx, cy, w, h));
    }

    let mut rows = rows.join("\n");
    if !rows.is_empty() {
        rows.push('\n');
    }
    let mut classes = labels.labels().join("\n");
    if !classes.is_empty() {
        classes.push('\n');
    }

    Ok((rows, classes, warnings))
}

/// Convert an absolute-pixel rectangle to normalized YOLO center format.
pub fn normalize(rect: &Rect, img_width: u32, img_height: u32) -> (f32, f32, f32, f32) {
    let cx = (rect.x + rect.width / 2.0) / img_width as f32;
    let cy = (rect.y + rect.height / 2.0) / img_height as f32;
    let w = rect.width / img_width as f32;
    let h = rect.height / img_height as f32;
    (cx, cy, w, h)
}

/// Convert normalized YOLO center format back to an absolute-pixel
/// rectangle, clamping the top-left corner to non-negative coordinates.
pub fn denormalize(cx: f32, cy: f32, w: f32, h: f32, img_width: u32, img_height: u32) -> Rect {
    let width = w * img_width as f32;
    let height = h * img_height as f32;
    let x = (cx * img_width as f32 - width / 2.0).max(0.0);
    let y = (cy * img_height as f32 - height / 2.0).max(0.0);
    Rect::new(x, y, width, height)
}

fn require_dimensions(info: &ImageInfo) -> Result<(), FormatError> {
    if info.width == 0 || info.height == 0 {
        return Err(FormatError::MissingDimensions {
            format: "YOLO".to_string(),
            image: info.file_name.clone(),
        });
    }
    Ok(())
}

fn parse_field<T: std::str::FromStr>(
    raw: &str,
    line_no: usize,
    field: &str,
) -> Result<T, FormatError> {
    raw.parse().map_err(|_| {
        FormatError::invalid_format(format!(
            "line {}: malformed {} '{}'",
            line_no + 1,
            field,
            raw
        ))
    })
}
