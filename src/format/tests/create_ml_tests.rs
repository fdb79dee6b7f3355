//! Tests for the CreateML codec.

use super::{cat_rect, test_image, triangle};
use crate::format::error::{FormatError, ValidationWarning};
use crate::format::{ImageInfo, create_ml};
use crate::model::AnnotationSet;

#[test]
fn test_encode_center_coordinates() {
    let set: AnnotationSet = vec![cat_rect()].into_iter().collect();
    let (json, warnings) = create_ml::encode(None, &set, &test_image()).unwrap();
    assert!(warnings.is_empty());

    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let entry = &parsed[0];
    assert_eq!(entry["image"], "cat001.jpg");
    let coords = &entry["annotations"][0]["coordinates"];
    // Center of (100,100)-(300,400)
    assert_eq!(coords["x"], 200.0);
    assert_eq!(coords["y"], 250.0);
    assert_eq!(coords["width"], 200.0);
    assert_eq!(coords["height"], 300.0);
}

#[test]
fn test_roundtrip() {
    let set: AnnotationSet = vec![cat_rect()].into_iter().collect();
    let info = test_image();
    let (json, _) = create_ml::encode(None, &set, &info).unwrap();
    let loaded = create_ml::decode(&json, &info).unwrap();

    assert_eq!(loaded.shapes.len(), 1);
    let shape = &loaded.shapes[0];
    assert_eq!(shape.label, "cat");
    assert!(shape.is_rectangle());
    assert_eq!(
        shape.bounding_rect().unwrap(),
        set.shapes()[0].bounding_rect().unwrap()
    );
    // CreateML stores no verified flag
    assert!(!loaded.verified);
}

#[test]
fn test_merge_preserves_other_images() {
    let info_a = ImageInfo::new("a.jpg", 800, 600);
    let info_b = ImageInfo::new("b.jpg", 800, 600);

    let set_a: AnnotationSet = vec![cat_rect()].into_iter().collect();
    let (json, _) = create_ml::encode(None, &set_a, &info_a).unwrap();

    // Write b.jpg's annotations into the same file
    let set_b: AnnotationSet = vec![triangle()].into_iter().collect();
    let (json, _) = create_ml::encode(Some(&json), &set_b, &info_b).unwrap();

    // Both entries present, each readable on its own
    let loaded_a = create_ml::decode(&json, &info_a).unwrap();
    assert_eq!(loaded_a.shapes.len(), 1);
    assert_eq!(loaded_a.shapes[0].label, "cat");

    let loaded_b = create_ml::decode(&json, &info_b).unwrap();
    assert_eq!(loaded_b.shapes.len(), 1);
    assert_eq!(loaded_b.shapes[0].label, "kite");
}

#[test]
fn test_rewrite_replaces_own_entry() {
    let info = test_image();
    let set: AnnotationSet = vec![cat_rect()].into_iter().collect();
    let (json, _) = create_ml::encode(None, &set, &info).unwrap();

    // Save again with an empty set: the entry is replaced, not duplicated
    let empty = AnnotationSet::new();
    let (json, _) = create_ml::encode(Some(&json), &empty, &info).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
    let loaded = create_ml::decode(&json, &info).unwrap();
    assert!(loaded.shapes.is_empty());
}

#[test]
fn test_absent_entry_is_empty_set() {
    let set: AnnotationSet = vec![cat_rect()].into_iter().collect();
    let (json, _) = create_ml::encode(None, &set, &test_image()).unwrap();

    let other = ImageInfo::new("missing.jpg", 800, 600);
    let loaded = create_ml::decode(&json, &other).unwrap();
    assert!(loaded.shapes.is_empty());
}

#[test]
fn test_corrupt_existing_file_blocks_write() {
    let set: AnnotationSet = vec![cat_rect()].into_iter().collect();
    let result = create_ml::encode(Some("not json {"), &set, &test_image());
    assert!(matches!(result, Err(FormatError::Json(_))));
}

#[test]
fn test_polygon_coerced_with_warning() {
    let set: AnnotationSet = vec![triangle()].into_iter().collect();
    let (json, warnings) = create_ml::encode(None, &set, &test_image()).unwrap();

    assert_eq!(
        warnings,
        vec![ValidationWarning::CoercedToBoundingBox {
            label: "kite".to_string()
        }]
    );
    let loaded = create_ml::decode(&json, &test_image()).unwrap();
    assert!(loaded.shapes[0].is_rectangle());
}
