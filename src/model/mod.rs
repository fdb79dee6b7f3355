//! In-memory annotation model: geometry primitives, shapes, and the
//! per-image annotation set.

pub mod annotation_set;
pub mod geometry;
pub mod label_history;
pub mod shape;

pub use annotation_set::{AnnotationSet, ShapeId};
pub use geometry::{Point, Rect};
pub use label_history::LabelHistory;
pub use shape::{GeometryError, MIN_POLYGON_VERTICES, Shape};
