//! The shape model: one annotated region as an ordered polygon plus metadata.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color_utils::{Rgba, color_for_label};
use crate::model::geometry::{Point, Rect};

/// Minimum number of vertices for a closed shape to count as a usable polygon.
///
/// Not enforced by [`Shape::close`]; validation is deferred to the canvas and
/// codec layers so in-progress geometry is never rejected under the user.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Errors from shape-level geometry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Vertex index outside `[0, len)`.
    #[error("vertex index {index} out of range (shape has {len} points)")]
    InvalidVertexIndex { index: usize, len: usize },

    /// Shape has too few points for the attempted operation.
    #[error("degenerate shape: has {points} points, needs at least {required}")]
    DegenerateShape { points: usize, required: usize },
}

/// One annotated region: an ordered vertex list plus label and display state.
///
/// While being drawn the vertex list may be an open polyline; once [`closed`]
/// the point count is fixed (vertices may still be dragged) until the shape
/// is deleted.
///
/// [`closed`]: Shape::closed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Label text; non-empty once the shape is finalized.
    pub label: String,
    /// The vertices of the shape in order.
    pub points: Vec<Point>,
    /// Pascal VOC "difficult to classify" flag.
    pub difficult: bool,
    /// Outline color.
    pub line_color: Rgba,
    /// Fill color.
    pub fill_color: Rgba,
    /// Whether the shape has been finalized.
    pub closed: bool,
    /// Transient UI state; not persisted.
    #[serde(skip)]
    pub selected: bool,
    /// Hidden shapes are skipped in hit-testing and rendering but stay in
    /// the annotation set.
    #[serde(skip, default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Shape {
    /// Create an empty, open shape with no label yet.
    pub fn new() -> Self {
        Self {
            label: String::new(),
            points: Vec::new(),
            difficult: false,
            line_color: Rgba::new(0, 255, 0, 128),
            fill_color: Rgba::new(0, 255, 0, 64),
            closed: false,
            selected: false,
            visible: true,
        }
    }

    /// Create an open shape with a label and the label's deterministic colors.
    pub fn with_label(label: impl Into<String>) -> Self {
        let mut shape = Self::new();
        shape.set_label(label);
        shape
    }

    /// Set the label and derive the label's deterministic colors.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
        let color = color_for_label(&self.label);
        self.line_color = color;
        self.fill_color = Rgba::new(color.r, color.g, color.b, 64);
    }

    /// Append a point to the open polyline. No-op if the shape is closed.
    pub fn add_point(&mut self, point: Point) {
        if !self.closed {
            self.points.push(point);
        }
    }

    /// Remove and return the last point of an open polyline.
    pub fn pop_point(&mut self) -> Option<Point> {
        if self.closed { None } else { self.points.pop() }
    }

    /// Mark the shape closed. Requires at least one point.
    ///
    /// Deliberately does not require [`MIN_POLYGON_VERTICES`]; whether the
    /// result is a usable polygon is decided at save time.
    pub fn close(&mut self) -> Result<(), GeometryError> {
        if self.points.is_empty() {
            return Err(GeometryError::DegenerateShape {
                points: 0,
                required: 1,
            });
        }
        self.closed = true;
        Ok(())
    }

    /// Translate every point by an offset vector.
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        for p in &mut self.points {
            *p = p.offset_by(dx, dy);
        }
    }

    /// Reposition a single vertex.
    pub fn move_vertex(&mut self, index: usize, position: Point) -> Result<(), GeometryError> {
        let len = self.points.len();
        let p = self
            .points
            .get_mut(index)
            .ok_or(GeometryError::InvalidVertexIndex { index, len })?;
        *p = position;
        Ok(())
    }

    /// Index of the closest vertex within `epsilon` of `pos`, or `None` if
    /// every vertex is farther away. Ties break toward the lowest index.
    pub fn nearest_vertex(&self, pos: Point, epsilon: f32) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, p) in self.points.iter().enumerate() {
            let d = p.distance_to(&pos);
            if d <= epsilon && best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Point-in-polygon test using ray casting.
    ///
    /// Open or degenerate shapes contain nothing.
    pub fn contains_point(&self, pos: Point) -> bool {
        if !self.closed || self.points.len() < MIN_POLYGON_VERTICES {
            return false;
        }

        let mut inside = false;
        let n = self.points.len();
        let mut j = n - 1;
        for i in 0..n {
            let vi = &self.points[i];
            let vj = &self.points[j];
            if ((vi.y > pos.y) != (vj.y > pos.y))
                && (pos.x < (vj.x - vi.x) * (pos.y - vi.y) / (vj.y - vi.y) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Axis-aligned rectangle enclosing all points, or `None` when empty.
    pub fn bounding_rect(&self) -> Option<Rect> {
        if self.points.is_empty() {
            return None;
        }

        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for p in &self.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Whether the points are exactly the four corners of the bounding
    /// rectangle. Rectangle-only export formats pass such shapes through
    /// unchanged; everything else gets flattened to its bounding rect.
    pub fn is_rectangle(&self) -> bool {
        if self.points.len() != 4 {
            return false;
        }
        let Some(rect) = self.bounding_rect() else {
            return false;
        };
        let corners = rect.corners();
        self.points
            .iter()
            .all(|p| corners.iter().any(|c| c.distance_to(p) < 1e-3))
    }

    /// Build a closed rectangular shape from a rectangle.
    pub fn from_rect(label: impl Into<String>, rect: Rect) -> Self {
        let mut shape = Shape::with_label(label);
        for corner in rect.corners() {
            shape.add_point(corner);
        }
        shape.closed = true;
        shape
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::new()
    }
}
