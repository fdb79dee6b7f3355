//! Pascal VOC XML codec.
//!
//! One XML file per image. This is the canonical format: it round-trips
//! label, point-for-point geometry, difficulty, per-shape colors, and the
//! per-image verified flag.
//!
//! # Format structure
//!
//! ```xml
//! <annotation verified="yes">
//!   <folder>images</folder>
//!   <filename>cat001.jpg</filename>
//!   <size><width>800</width><height>600</height><depth>3</depth></size>
//!   <object>
//!     <name>cat</name>
//!     <difficult>0</difficult>
//!     <line_color>34,177,76,128</line_color>
//!     <bndbox><xmin>100</xmin><ymin>100</ymin><xmax>300</xmax><ymax>400</ymax></bndbox>
//!   </object>
//! </annotation>
//! ```
//!
//! Rectangular shapes store only the `bndbox`; other shapes additionally
//! carry a `<polygon>` point list with exact float coordinates, since the
//! integer `bndbox` alone cannot reproduce them.

use std::path::Path;

use quick_xml::de::from_str;
use quick_xml::se::to_string;
use serde::{Deserialize, Serialize};

use crate::color_utils::Rgba;
use crate::format::error::{FormatError, ValidationWarning};
use crate::format::{ImageInfo, LoadedAnnotations, write_atomic};
use crate::model::{AnnotationSet, Point, Shape};

/// Read a Pascal VOC annotation file.
pub fn read(path: &Path) -> Result<LoadedAnnotations, FormatError> {
    let content = std::fs::read_to_string(path)?;
    decode(&content)
}

/// Write an annotation set as Pascal VOC XML.
pub fn write(
    path: &Path,
    set: &AnnotationSet,
    info: &ImageInfo,
) -> Result<Vec<ValidationWarning>, FormatError> {
    let (xml, warnings) = encode(set, info)?;
    write_atomic(path, &xml)?;
    Ok(warnings)
}

/// Parse VOC XML content into shapes plus the verified flag.
pub fn decode(content: &str) -> Result<LoadedAnnotations, FormatError> {
    let parsed: VocAnnotation =
        from_str(content).map_err(|e| FormatError::Xml(e.to_string()))?;

    let mut loaded = LoadedAnnotations {
        verified: matches!(parsed.verified.as_deref(), Some("yes" | "1" | "true")),
        ..Default::default()
    };

    for obj in &parsed.objects {
        if obj.name.is_empty() {
            return Err(FormatError::missing_field("object.name"));
        }

        let mut shape = Shape::new();
        match &obj.polygon {
            Some(polygon) if !polygon.points.is_empty() => {
                for pt in &polygon.points {
                    shape.add_point(Point::new(pt.x, pt.y));
                }
            }
            _ => {
                let b = &obj.bndbox;
                if b.xmax < b.xmin || b.ymax < b.ymin {
                    return Err(FormatError::invalid_format(format!(
                        "inverted bndbox for object '{}'",
                        obj.name
                    )));
                }
                shape.add_point(Point::new(b.xmin as f32, b.ymin as f32));
                shape.add_point(Point::new(b.xmax as f32, b.ymin as f32));
                shape.add_point(Point::new(b.xmax as f32, b.ymax as f32));
                shape.add_point(Point::new(b.xmin as f32, b.ymax as f32));
            }
        }
        shape.set_label(&obj.name);
        // Stored colors win over the deterministic per-label ones
        if let Some(color) = obj.line_color.as_deref().and_then(Rgba::from_csv) {
            shape.line_color = color;
        }
        if let Some(color) = obj.fill_color.as_deref().and_then(Rgba::from_csv) {
            shape.fill_color = color;
        }
        shape.difficult = obj.difficult != 0;
        shape.closed = true;
        loaded.shapes.push(shape);
    }

    Ok(loaded)
}

/// Serialize an annotation set to VOC XML content.
pub fn encode(
    set: &AnnotationSet,
    info: &ImageInfo,
) -> Result<(String, Vec<ValidationWarning>), FormatError> {
    let mut warnings = Vec::new();
    let mut objects = Vec::new();

    for shape in set.shapes() {
        if shape.points.len() < crate::model::MIN_POLYGON_VERTICES {
            warnings.push(ValidationWarning::SkippedDegenerateShape {
                label: shape.label.clone(),
            });
            continue;
        }
        // bounding_rect is Some for any non-empty point list
        let Some(rect) = shape.bounding_rect() else {
            continue;
        };

        let polygon = if shape.is_rectangle() {
            None
        } else {
            Some(VocPolygon {
                points: shape
                    .points
                    .iter()
                    .map(|p| VocPt { x: p.x, y: p.y })
                    .collect(),
            })
        };

        objects.push(VocObject {
            name: shape.label.clone(),
            pose: "Unspecified".to_string(),
            truncated: 0,
            difficult: shape.difficult as i32,
            line_color: Some(shape.line_color.to_csv()),
            fill_color: Some(shape.fill_color.to_csv()),
            bndbox: VocBndbox {
                xmin: rect.x.round() as i32,
                ymin: rect.y.round() as i32,
                xmax: (rect.x + rect.width).round() as i32,
                ymax: (rect.y + rect.height).round() as i32,
            },
            polygon,
        });
    }

    let annotation = VocAnnotation {
        verified: set.verified.then(|| "yes".to_string()),
        folder: info.folder.clone(),
        filename: info.file_name.clone(),
        path: info.file_name.clone(),
        source: VocSource {
            database: "Unknown".to_string(),
        },
        size: VocSize {
            width: info.width as i32,
            height: info.height as i32,
            depth: 3,
        },
        segmented: 0,
        objects,
    };

    let body = to_string(&annotation).map_err(|e| FormatError::Xml(e.to_string()))?;
    let xml = format!("<?xml version=\"1.0\" ?>\n{}\n", body);

    Ok((xml, warnings))
}

// ============================================================================
// Pascal VOC XML Structures
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "annotation")]
struct VocAnnotation {
    #[serde(rename = "@verified", skip_serializing_if = "Option::is_none")]
    verified: Option<String>,
    #[serde(default)]
    folder: String,
    #[serde(default)]
    filename: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    source: VocSource,
    #[serde(default)]
    size: VocSize,
    #[serde(default)]
    segmented: i32,
    #[serde(rename = "object", default)]
    objects: Vec<VocObject>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct VocSource {
    #[serde(default)]
    database: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct VocSize {
    #[serde(default)]
    width: i32,
    #[serde(default)]
    height: i32,
    #[serde(default)]
    depth: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VocObject {
    name: String,
    #[serde(default = "default_pose")]
    pose: String,
    #[serde(default)]
    truncated: i32,
    #[serde(default)]
    difficult: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    line_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fill_color: Option<String>,
    bndbox: VocBndbox,
    #[serde(skip_serializing_if = "Option::is_none")]
    polygon: Option<VocPolygon>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct VocBndbox {
    xmin: i32,
    ymin: i32,
    xmax: i32,
    ymax: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VocPolygon {
    #[serde(rename = "pt", default)]
    points: Vec<VocPt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VocPt {
    x: f32,
    y: f32,
}

fn default_pose() -> String {
    "Unspecified".to_string()
}
