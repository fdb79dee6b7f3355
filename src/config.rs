//! Canvas configuration.
//!
//! An explicit struct handed to [`Canvas::new`] at startup. The shell owns
//! persistence; no core logic reads ambient global state.
//!
//! [`Canvas::new`]: crate::canvas::Canvas::new

use serde::{Deserialize, Serialize};

/// Tunables for the annotation canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Hit radius in image pixels for vertex selection and drag.
    pub vertex_epsilon: f32,
    /// Clicking within this distance of the first vertex closes a polygon.
    pub close_threshold: f32,
    /// Vertices within this distance of the image border snap to the exact
    /// border coordinate (and out-of-bounds vertices are clamped).
    pub snap_threshold: f32,
    /// Force equal width/height while drawing rectangles.
    pub draw_square: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            vertex_epsilon: 10.0,
            close_threshold: 10.0,
            snap_threshold: 2.0,
            draw_square: false,
        }
    }
}
