//! imglabel - image annotation core
//!
//! The engine of an interactive image-annotation tool: a shape/geometry
//! model, the canvas interaction state machine that turns pointer input
//! into shapes, and bidirectional codecs for Pascal VOC XML, YOLO TXT,
//! and CreateML JSON annotation files.
//!
//! The windowing shell (menus, dialogs, directory scanning, theming) is an
//! external collaborator: it feeds pointer events and image metadata in,
//! and answers [`CanvasResponse::LabelNeeded`](canvas::CanvasResponse) by
//! asking the user for a label.

pub mod canvas;
pub mod color_utils;
pub mod config;
pub mod format;
pub mod model;

pub use canvas::{Canvas, CanvasMode, CanvasResponse, DrawMode, PointerButton};
pub use color_utils::Rgba;
pub use config::CanvasConfig;
pub use format::{
    FormatError, ImageInfo, LabelFormat, LoadedAnnotations, ValidationWarning, annotation_path,
    probe_annotation,
};
pub use model::{AnnotationSet, GeometryError, LabelHistory, Point, Rect, Shape, ShapeId};
