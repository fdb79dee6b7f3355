//! Tests for the YOLO codec.

use std::path::Path;

use super::{cat_rect, test_image, triangle};
use crate::format::error::{FormatError, ValidationWarning};
use crate::format::{ImageInfo, yolo};
use crate::model::{AnnotationSet, LabelHistory, Rect, Shape};

fn cat_history() -> LabelHistory {
    LabelHistory::from_classes(["cat"])
}

#[test]
fn test_encode_spec_example() {
    // 800x600 image, rectangle (100,100)-(300,400), label "cat":
    // cx = 200/800, cy = 250/600, w = 200/800, h = 300/600
    let set: AnnotationSet = vec![cat_rect()].into_iter().collect();
    let (rows, classes, warnings) = yolo::encode(&set, &test_image(), &cat_history()).unwrap();

    assert_eq!(rows, "0 0.250000 0.416667 0.250000 0.500000\n");
    assert_eq!(classes, "cat\n");
    assert!(warnings.is_empty());
}

#[test]
fn test_decode_reconstructs_rect_within_tolerance() {
    let classes = vec!["cat".to_string()];
    let loaded = yolo::decode(
        "0 0.250000 0.416667 0.250000 0.500000\n",
        &classes,
        &test_image(),
        Path::new("cat001.txt"),
    )
    .unwrap();

    assert_eq!(loaded.shapes.len(), 1);
    let shape = &loaded.shapes[0];
    assert_eq!(shape.label, "cat");
    assert!(shape.closed);
    assert!(shape.is_rectangle());

    let rect = shape.bounding_rect().unwrap();
    assert!((rect.x - 100.0).abs() < 1.0);
    assert!((rect.y - 100.0).abs() < 1.0);
    assert!((rect.width - 200.0).abs() < 1.0);
    assert!((rect.height - 300.0).abs() < 1.0);
}

#[test]
fn test_normalize_denormalize_idempotent() {
    let rect = Rect::new(100.0, 100.0, 200.0, 300.0);
    let (cx, cy, w, h) = yolo::normalize(&rect, 800, 600);
    let restored = yolo::denormalize(cx, cy, w, h, 800, 600);
    let (cx2, cy2, w2, h2) = yolo::normalize(&restored, 800, 600);

    assert!((cx - cx2).abs() < 1e-5);
    assert!((cy - cy2).abs() < 1e-5);
    assert!((w - w2).abs() < 1e-5);
    assert!((h - h2).abs() < 1e-5);
}

#[test]
fn test_out_of_range_class_index() {
    let classes = vec!["cat".to_string()];
    let result = yolo::decode(
        "3 0.5 0.5 0.2 0.2\n",
        &classes,
        &test_image(),
        Path::new("cat001.txt"),
    );
    assert!(matches!(
        result,
        Err(FormatError::UnknownClassIndex {
            index: 3,
            classes: 1,
            ..
        })
    ));
}

#[test]
fn test_missing_dimensions() {
    let info = ImageInfo::new("cat001.jpg", 0, 0);
    let set: AnnotationSet = vec![cat_rect()].into_iter().collect();
    assert!(matches!(
        yolo::encode(&set, &info, &cat_history()),
        Err(FormatError::MissingDimensions { .. })
    ));
    assert!(matches!(
        yolo::decode("0 0.5 0.5 0.2 0.2\n", &[], &info, Path::new("x.txt")),
        Err(FormatError::MissingDimensions { .. })
    ));
}

#[test]
fn test_malformed_line_is_an_error() {
    let classes = vec!["cat".to_string()];
    let short = yolo::decode("0 0.5 0.5\n", &classes, &test_image(), Path::new("x.txt"));
    assert!(matches!(short, Err(FormatError::InvalidFormat { .. })));

    let garbage = yolo::decode(
        "0 0.5 lots 0.2 0.2\n",
        &classes,
        &test_image(),
        Path::new("x.txt"),
    );
    assert!(matches!(garbage, Err(FormatError::InvalidFormat { .. })));
}

#[test]
fn test_blank_lines_ignored() {
    let classes = vec!["cat".to_string()];
    let loaded = yolo::decode(
        "\n0 0.5 0.5 0.2 0.2\n\n",
        &classes,
        &test_image(),
        Path::new("x.txt"),
    )
    .unwrap();
    assert_eq!(loaded.shapes.len(), 1);
}

#[test]
fn test_saved_rows_survive_later_labels() {
    // Rows written earlier in the session must keep their meaning after new
    // labels enter the history and classes.txt is rewritten.
    let mut labels = LabelHistory::from_classes(["dog"]);
    let set: AnnotationSet = vec![Shape::from_rect("dog", Rect::new(100.0, 100.0, 200.0, 300.0))]
        .into_iter()
        .collect();
    let (rows, classes, _) = yolo::encode(&set, &test_image(), &labels).unwrap();
    assert!(rows.starts_with("0 "));
    assert_eq!(classes, "dog\n");

    labels.record("cat");
    let loaded = yolo::decode(&rows, labels.labels(), &test_image(), Path::new("x.txt")).unwrap();
    assert_eq!(loaded.shapes[0].label, "dog");
}

#[test]
fn test_polygon_coerced_to_bounding_box() {
    let labels = LabelHistory::from_classes(["kite"]);
    let set: AnnotationSet = vec![triangle()].into_iter().collect();
    let (rows, _, warnings) = yolo::encode(&set, &test_image(), &labels).unwrap();

    assert_eq!(
        warnings,
        vec![ValidationWarning::CoercedToBoundingBox {
            label: "kite".to_string()
        }]
    );
    // One row: the triangle's bounding box
    assert_eq!(rows.lines().count(), 1);
    assert!(rows.starts_with("0 "));
}

#[test]
fn test_label_missing_from_class_list() {
    let set: AnnotationSet = vec![cat_rect()].into_iter().collect();
    let labels = LabelHistory::from_classes(["dog"]);
    assert!(matches!(
        yolo::encode(&set, &test_image(), &labels),
        Err(FormatError::InvalidFormat { .. })
    ));
}

#[test]
fn test_empty_set_writes_empty_rows() {
    let set = AnnotationSet::new();
    let (rows, classes, warnings) = yolo::encode(&set, &test_image(), &cat_history()).unwrap();
    assert_eq!(rows, "");
    assert_eq!(classes, "cat\n");
    assert!(warnings.is_empty());
}
