//! Codec tests.

mod create_ml_tests;
mod yolo_tests;

use crate::color_utils::Rgba;
use crate::format::ImageInfo;
use crate::model::{AnnotationSet, Point, Rect, Shape};

/// An 800x600 test image.
pub(super) fn test_image() -> ImageInfo {
    ImageInfo::new("cat001.jpg", 800, 600).with_folder("images")
}

/// A rectangle at pixel corners (100,100)-(300,400) labeled "cat".
pub(super) fn cat_rect() -> Shape {
    Shape::from_rect("cat", Rect::new(100.0, 100.0, 200.0, 300.0))
}

/// A non-rectangular triangle with fractional coordinates.
pub(super) fn triangle() -> Shape {
    let mut shape = Shape::with_label("kite");
    shape.add_point(Point::new(10.5, 20.25));
    shape.add_point(Point::new(110.0, 40.0));
    shape.add_point(Point::new(60.0, 120.75));
    shape.close().unwrap();
    shape
}

/// A set holding one rectangle with hand-picked colors and the difficult
/// flag set, plus a polygon.
pub(super) fn rich_set() -> AnnotationSet {
    let mut rect = cat_rect();
    rect.difficult = true;
    rect.line_color = Rgba::new(10, 20, 30, 40);
    rect.fill_color = Rgba::new(50, 60, 70, 80);

    let mut set: AnnotationSet = vec![rect, triangle()].into_iter().collect();
    set.verified = true;
    set
}
