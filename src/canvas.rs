//! Annotation canvas interaction state machine.
//!
//! Translates pointer/keyboard events into shape creation, vertex editing,
//! selection, move, and deletion over the current image's [`AnnotationSet`].
//! Rendering and dialogs belong to the shell; the canvas reports what it
//! needs through [`CanvasResponse`] (most importantly [`LabelNeeded`], the
//! label-dialog handshake, answered via [`Canvas::commit_pending`]).
//!
//! [`LabelNeeded`]: CanvasResponse::LabelNeeded

use crate::config::CanvasConfig;
use crate::model::{AnnotationSet, LabelHistory, Point, Rect, Shape, ShapeId};

/// Top-level interaction mode, switched by the shell's toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasMode {
    /// Pointer input creates new shapes.
    Create,
    /// Pointer input selects and edits existing shapes.
    #[default]
    Edit,
}

/// What kind of shape create-mode produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// Press-drag-release produces an axis-aligned box.
    #[default]
    Rectangle,
    /// Each click adds a vertex; double-click, right-click, or a click near
    /// the first vertex finalizes.
    Polygon,
}

/// Pointer button for press events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
}

/// Interaction state. `Drawing*` only occurs in create mode, `Moving*` only
/// in edit mode.
#[derive(Debug, Clone, PartialEq)]
enum CanvasState {
    Idle,
    DrawingRect { start: Point, current: Point },
    DrawingPolygon { shape: Shape },
    MovingVertex { id: ShapeId, vertex: usize },
    MovingShape { id: ShapeId, last: Point },
}

/// What the shell should do after feeding an event to the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasResponse {
    /// Nothing changed.
    None,
    /// Geometry changed; repaint.
    Redraw,
    /// A shape was finalized and awaits a label via
    /// [`Canvas::commit_pending`].
    LabelNeeded,
    /// The selected shape changed; the paired label-list UI must follow.
    SelectionChanged(Option<ShapeId>),
}

/// The annotation canvas for one image edit session.
#[derive(Debug)]
pub struct Canvas {
    config: CanvasConfig,
    image_width: u32,
    image_height: u32,
    set: AnnotationSet,
    labels: LabelHistory,
    mode: CanvasMode,
    draw_mode: DrawMode,
    state: CanvasState,
    /// Finalized shape waiting for [`Canvas::commit_pending`].
    pending: Option<Shape>,
}

impl Canvas {
    /// Create a canvas for an image of the given pixel dimensions.
    pub fn new(config: CanvasConfig, image_width: u32, image_height: u32) -> Self {
        Self {
            config,
            image_width,
            image_height,
            set: AnnotationSet::new(),
            labels: LabelHistory::new(),
            mode: CanvasMode::Edit,
            draw_mode: DrawMode::Rectangle,
            state: CanvasState::Idle,
            pending: None,
        }
    }

    // ------------------------------------------------------------------
    // Session boundary
    // ------------------------------------------------------------------

    /// Switch to a new image, discarding the previous annotation set.
    ///
    /// The shell persists or drops the old set before calling this; the
    /// canvas itself never writes files.
    pub fn open_image(&mut self, image_width: u32, image_height: u32) {
        log::debug!(
            "canvas: open image {}x{} (dropping {} shapes)",
            image_width,
            image_height,
            self.set.len()
        );
        self.image_width = image_width;
        self.image_height = image_height;
        self.set = AnnotationSet::new();
        self.state = CanvasState::Idle;
        self.pending = None;
    }

    /// Re-hydrate shapes loaded by a codec, snapping near-border vertices to
    /// the exact border. Snapping silently alters user data, so it marks the
    /// session dirty; an untouched load starts clean.
    pub fn load_shapes(&mut self, shapes: Vec<Shape>, verified: bool) {
        let mut set = AnnotationSet::new();
        let mut snapped_any = false;
        for mut shape in shapes {
            for i in 0..shape.points.len() {
                let (snapped, changed) = self.snap_to_border(shape.points[i]);
                if changed {
                    shape.points[i] = snapped;
                    snapped_any = true;
                }
            }
            self.labels.record(&shape.label);
            set.push(shape);
        }
        set.verified = verified;
        if snapped_any {
            log::info!("canvas: snapped out-of-range vertices while loading");
        } else {
            set.clear_dirty();
        }
        self.set = set;
        self.state = CanvasState::Idle;
        self.pending = None;
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.set
    }

    pub fn annotations_mut(&mut self) -> &mut AnnotationSet {
        &mut self.set
    }

    pub fn labels(&self) -> &LabelHistory {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut LabelHistory {
        &mut self.labels
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    pub fn mode(&self) -> CanvasMode {
        self.mode
    }

    /// Switch interaction mode, cancelling any drawing in progress.
    pub fn set_mode(&mut self, mode: CanvasMode) {
        if self.mode != mode {
            self.cancel_drawing();
            self.mode = mode;
        }
    }

    pub fn set_draw_mode(&mut self, draw_mode: DrawMode) {
        self.draw_mode = draw_mode;
    }

    /// Held-modifier square constraint for rectangle drawing.
    pub fn set_draw_square(&mut self, draw_square: bool) {
        self.config.draw_square = draw_square;
    }

    // ------------------------------------------------------------------
    // Pointer events
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, pos: Point, button: PointerButton) -> CanvasResponse {
        match self.mode {
            CanvasMode::Create => self.create_pointer_down(pos, button),
            CanvasMode::Edit => self.edit_pointer_down(pos, button),
        }
    }

    pub fn pointer_move(&mut self, pos: Point) -> CanvasResponse {
        match &mut self.state {
            CanvasState::DrawingRect { start, current } => {
                let mut pos = pos;
                if self.config.draw_square {
                    pos = square_constrained(*start, pos);
                }
                *current = pos;
                CanvasResponse::Redraw
            }
            CanvasState::DrawingPolygon { .. } => CanvasResponse::None,
            CanvasState::MovingVertex { id, vertex } => {
                let (id, vertex) = (*id, *vertex);
                let (snapped, changed) = self.snap_to_border(pos);
                if let Some(shape) = self.set.get_mut(id) {
                    // Index was valid at press time and point counts of
                    // closed shapes are fixed, so this cannot fail.
                    let _ = shape.move_vertex(vertex, snapped);
                }
                if changed {
                    self.set.mark_dirty();
                }
                CanvasResponse::Redraw
            }
            CanvasState::MovingShape { id, last } => {
                let (dx, dy) = (pos.x - last.x, pos.y - last.y);
                *last = pos;
                let id = *id;
                if let Some(shape) = self.set.get_mut(id) {
                    shape.move_by(dx, dy);
                }
                CanvasResponse::Redraw
            }
            CanvasState::Idle => CanvasResponse::None,
        }
    }

    pub fn pointer_up(&mut self, pos: Point) -> CanvasResponse {
        match std::mem::replace(&mut self.state, CanvasState::Idle) {
            CanvasState::DrawingRect { start, .. } => {
                let current = if self.config.draw_square {
                    square_constrained(start, pos)
                } else {
                    pos
                };
                let (start, _) = self.snap_to_border(start);
                let (current, _) = self.snap_to_border(current);
                let rect = Rect::from_corners(start, current);
                if rect.width < 1.0 || rect.height < 1.0 {
                    // A stray click, not a box
                    return CanvasResponse::Redraw;
                }
                let mut shape = Shape::new();
                for corner in rect.corners() {
                    shape.add_point(corner);
                }
                shape.closed = true;
                self.pending = Some(shape);
                CanvasResponse::LabelNeeded
            }
            CanvasState::MovingVertex { .. } | CanvasState::MovingShape { .. } => {
                self.set.mark_dirty();
                CanvasResponse::Redraw
            }
            other => {
                // Polygon drawing spans multiple presses
                self.state = other;
                CanvasResponse::None
            }
        }
    }

    /// Double-click finalizes an in-progress polygon.
    pub fn double_click(&mut self, _pos: Point) -> CanvasResponse {
        if matches!(self.state, CanvasState::DrawingPolygon { .. }) {
            self.finalize_polygon()
        } else {
            CanvasResponse::None
        }
    }

    /// Escape: discard the in-progress shape without touching the committed
    /// set.
    pub fn cancel_drawing(&mut self) -> CanvasResponse {
        match self.state {
            CanvasState::DrawingRect { .. } | CanvasState::DrawingPolygon { .. } => {
                self.state = CanvasState::Idle;
                CanvasResponse::Redraw
            }
            _ => CanvasResponse::None,
        }
    }

    // ------------------------------------------------------------------
    // Label handshake
    // ------------------------------------------------------------------

    /// Answer a [`CanvasResponse::LabelNeeded`]. `Some(label)` commits the
    /// pending shape; `None` (dialog cancelled) discards it.
    pub fn commit_pending(&mut self, label: Option<&str>) -> Option<ShapeId> {
        let mut shape = self.pending.take()?;
        let label = label?;
        if label.is_empty() {
            return None;
        }
        shape.set_label(label);
        if !shape.closed {
            // Pending shapes always have at least one point
            shape.close().ok()?;
        }
        self.labels.record(label);
        let id = self.set.push(shape);
        self.set.select(Some(id));
        log::debug!("canvas: committed shape {} with label {:?}", id, label);
        Some(id)
    }

    /// Whether a finalized shape is waiting for a label.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    // ------------------------------------------------------------------
    // Selection, deletion, visibility
    // ------------------------------------------------------------------

    /// Programmatic selection from the paired label-list UI.
    pub fn select_shape(&mut self, id: Option<ShapeId>) -> CanvasResponse {
        if self.set.select(id) {
            CanvasResponse::SelectionChanged(self.set.selected())
        } else {
            CanvasResponse::None
        }
    }

    /// Delete the selected shape, clearing the selection.
    pub fn delete_selected(&mut self) -> Option<Shape> {
        let id = self.set.selected()?;
        let removed = self.set.remove(id);
        log::debug!("canvas: deleted shape {}", id);
        removed
    }

    /// Toggle per-shape visibility. Hidden shapes stay in the set but are
    /// skipped by hit-testing and rendering.
    pub fn toggle_visibility(&mut self, id: ShapeId) -> CanvasResponse {
        if let Some(shape) = self.set.get_mut(id) {
            shape.visible = !shape.visible;
            CanvasResponse::Redraw
        } else {
            CanvasResponse::None
        }
    }

    /// The in-progress geometry for the shell to paint, if any.
    pub fn preview(&self) -> Option<Shape> {
        match &self.state {
            CanvasState::DrawingRect { start, current } => {
                let rect = Rect::from_corners(*start, *current);
                let mut shape = Shape::new();
                for corner in rect.corners() {
                    shape.add_point(corner);
                }
                Some(shape)
            }
            CanvasState::DrawingPolygon { shape } => Some(shape.clone()),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn create_pointer_down(&mut self, pos: Point, button: PointerButton) -> CanvasResponse {
        match self.draw_mode {
            DrawMode::Rectangle => {
                if button != PointerButton::Left {
                    return CanvasResponse::None;
                }
                let (start, _) = self.snap_to_border(pos);
                self.state = CanvasState::DrawingRect {
                    start,
                    current: start,
                };
                CanvasResponse::Redraw
            }
            DrawMode::Polygon => match button {
                PointerButton::Right => {
                    if matches!(self.state, CanvasState::DrawingPolygon { .. }) {
                        self.finalize_polygon()
                    } else {
                        CanvasResponse::None
                    }
                }
                PointerButton::Left => self.polygon_add_point(pos),
            },
        }
    }

    fn polygon_add_point(&mut self, pos: Point) -> CanvasResponse {
        // The shape is not in the committed set yet, so snapping here does
        // not dirty anything; commit_pending marks the set dirty on push.
        let (snapped, _) = self.snap_to_border(pos);
        match &mut self.state {
            CanvasState::DrawingPolygon { shape } => {
                let near_first = shape
                    .points
                    .first()
                    .is_some_and(|first| first.distance_to(&pos) <= self.config.close_threshold);
                if near_first {
                    return self.finalize_polygon();
                }
                shape.add_point(snapped);
                CanvasResponse::Redraw
            }
            _ => {
                let mut shape = Shape::new();
                shape.add_point(snapped);
                self.state = CanvasState::DrawingPolygon { shape };
                CanvasResponse::Redraw
            }
        }
    }

    fn finalize_polygon(&mut self) -> CanvasResponse {
        let CanvasState::DrawingPolygon { mut shape } =
            std::mem::replace(&mut self.state, CanvasState::Idle)
        else {
            return CanvasResponse::None;
        };
        // The canvas never rejects in-progress geometry; degenerate shapes
        // are caught at save time.
        if shape.close().is_err() {
            return CanvasResponse::Redraw;
        }
        self.pending = Some(shape);
        CanvasResponse::LabelNeeded
    }

    fn edit_pointer_down(&mut self, pos: Point, button: PointerButton) -> CanvasResponse {
        if button != PointerButton::Left {
            return CanvasResponse::None;
        }

        // Topmost shape first; hidden shapes are transparent to hits. The
        // hit is recorded before any mutation so the iterator borrow ends
        // first.
        let mut hit = None;
        for (id, shape) in self.set.iter().rev() {
            if !shape.visible {
                continue;
            }
            if let Some(vertex) = shape.nearest_vertex(pos, self.config.vertex_epsilon) {
                hit = Some((id, Some(vertex)));
                break;
            }
            if shape.contains_point(pos) {
                hit = Some((id, None));
                break;
            }
        }

        match hit {
            Some((id, Some(vertex))) => {
                self.state = CanvasState::MovingVertex { id, vertex };
                self.select_after_hit(id)
            }
            Some((id, None)) => {
                self.state = CanvasState::MovingShape { id, last: pos };
                self.select_after_hit(id)
            }
            None => {
                if self.set.select(None) {
                    CanvasResponse::SelectionChanged(None)
                } else {
                    CanvasResponse::None
                }
            }
        }
    }

    fn select_after_hit(&mut self, id: ShapeId) -> CanvasResponse {
        if self.set.select(Some(id)) {
            CanvasResponse::SelectionChanged(Some(id))
        } else {
            CanvasResponse::Redraw
        }
    }

    /// Clamp a point into the image and snap near-border coordinates to the
    /// exact border. Returns the point and whether it changed.
    fn snap_to_border(&self, p: Point) -> (Point, bool) {
        let w = self.image_width as f32;
        let h = self.image_height as f32;
        let t = self.config.snap_threshold;

        let snap_axis = |v: f32, max: f32| -> f32 {
            if v <= t {
                0.0
            } else if v >= max - t {
                max
            } else {
                v
            }
        };

        let snapped = Point::new(snap_axis(p.x, w), snap_axis(p.y, h));
        (snapped, snapped != p)
    }
}

fn square_constrained(start: Point, pos: Point) -> Point {
    let dx = pos.x - start.x;
    let dy = pos.y - start.y;
    let side = dx.abs().min(dy.abs());
    Point::new(
        start.x + side * dx.signum(),
        start.y + side * dy.signum(),
    )
}
