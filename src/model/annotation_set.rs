//! Per-image annotation storage.

use serde::{Deserialize, Serialize};

use crate::model::shape::Shape;

/// Stable identifier for a shape within an [`AnnotationSet`].
///
/// Identifiers survive insertion and removal of other shapes, so a paired
/// UI list can key its rows on them instead of on volatile indices.
pub type ShapeId = u64;

/// The ordered collection of shapes bound to exactly one image.
///
/// Owned by the canvas for the lifetime of that image's edit session and
/// replaced wholesale when a new image loads. Shapes live here by value;
/// a parallel id vector maps stable [`ShapeId`]s to row indices, replacing
/// the two manually-synchronized shape↔list-item maps of older designs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationSet {
    shapes: Vec<Shape>,
    ids: Vec<ShapeId>,
    next_id: ShapeId,
    /// At most one shape is selected at a time.
    #[serde(skip)]
    selected: Option<ShapeId>,
    /// Set on any mutation the user would want persisted.
    #[serde(skip)]
    dirty: bool,
    /// Per-image human-reviewed flag.
    pub verified: bool,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            ids: Vec::new(),
            next_id: 1,
            selected: None,
            dirty: false,
            verified: false,
        }
    }

    /// Append a shape and return its stable id.
    pub fn push(&mut self, shape: Shape) -> ShapeId {
        let id = self.next_id;
        self.next_id += 1;
        self.ids.push(id);
        self.shapes.push(shape);
        self.dirty = true;
        id
    }

    /// Remove a shape by id, clearing the selection if it pointed at it.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.index_of(id)?;
        self.ids.remove(index);
        let shape = self.shapes.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.dirty = true;
        Some(shape)
    }

    /// Row index of a shape id, if present.
    pub fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.ids.iter().position(|&i| i == id)
    }

    /// Shape id at a row index, if in range.
    pub fn id_at(&self, index: usize) -> Option<ShapeId> {
        self.ids.get(index).copied()
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.index_of(id).map(|i| &self.shapes[i])
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        let index = self.index_of(id)?;
        Some(&mut self.shapes[index])
    }

    /// Iterate shapes in drawing order with their ids.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (ShapeId, &Shape)> {
        self.ids.iter().copied().zip(self.shapes.iter())
    }

    /// The shapes in drawing order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// `true` when no shapes remain; mirrors the shell's "can save empty"
    /// check.
    pub fn no_shapes(&self) -> bool {
        self.is_empty()
    }

    /// Select a shape (or clear the selection with `None`). Keeps the
    /// per-shape `selected` flags in sync and reports whether the selection
    /// actually changed.
    pub fn select(&mut self, id: Option<ShapeId>) -> bool {
        let id = id.filter(|&i| self.index_of(i).is_some());
        if self.selected == id {
            return false;
        }
        self.selected = id;
        for (shape_id, shape) in self.ids.iter().copied().zip(self.shapes.iter_mut()) {
            shape.selected = Some(shape_id) == id;
        }
        true
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag, e.g. after a successful save.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

impl FromIterator<Shape> for AnnotationSet {
    fn from_iter<T: IntoIterator<Item = Shape>>(iter: T) -> Self {
        let mut set = AnnotationSet::new();
        for shape in iter {
            set.push(shape);
        }
        set.clear_dirty();
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::geometry::Rect;

    fn shape(label: &str) -> Shape {
        Shape::from_rect(label, Rect::new(0.0, 0.0, 10.0, 10.0))
    }

    #[test]
    fn test_push_and_lookup() {
        let mut set = AnnotationSet::new();
        let a = set.push(shape("a"));
        let b = set.push(shape("b"));

        assert_eq!(set.len(), 2);
        assert_eq!(set.index_of(a), Some(0));
        assert_eq!(set.index_of(b), Some(1));
        assert_eq!(set.get(b).unwrap().label, "b");
        assert_eq!(set.id_at(0), Some(a));
    }

    #[test]
    fn test_remove_keeps_ids_stable() {
        let mut set = AnnotationSet::new();
        let a = set.push(shape("a"));
        let b = set.push(shape("b"));
        let c = set.push(shape("c"));

        set.remove(b);
        assert_eq!(set.index_of(a), Some(0));
        assert_eq!(set.index_of(c), Some(1));
        assert_eq!(set.get(b), None);
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut set = AnnotationSet::new();
        let a = set.push(shape("a"));
        set.select(Some(a));
        set.remove(a);
        assert_eq!(set.selected(), None);
        assert!(set.no_shapes());
    }

    #[test]
    fn test_select_syncs_shape_flags() {
        let mut set = AnnotationSet::new();
        let a = set.push(shape("a"));
        let b = set.push(shape("b"));

        assert!(set.select(Some(a)));
        assert!(set.get(a).unwrap().selected);
        assert!(!set.get(b).unwrap().selected);

        assert!(set.select(Some(b)));
        assert!(!set.get(a).unwrap().selected);
        assert!(set.get(b).unwrap().selected);

        // Re-selecting is not a change
        assert!(!set.select(Some(b)));
    }

    #[test]
    fn test_select_unknown_id_clears() {
        let mut set = AnnotationSet::new();
        let a = set.push(shape("a"));
        set.select(Some(a));
        assert!(set.select(Some(999)));
        assert_eq!(set.selected(), None);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut set = AnnotationSet::new();
        assert!(!set.is_dirty());
        let a = set.push(shape("a"));
        assert!(set.is_dirty());
        set.clear_dirty();
        set.remove(a);
        assert!(set.is_dirty());
    }

    #[test]
    fn test_from_iter_starts_clean() {
        let set: AnnotationSet = vec![shape("a"), shape("b")].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(!set.is_dirty());
    }
}
