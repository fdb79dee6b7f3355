//! Color utilities shared across the shape model and codecs.
//!
//! Formats that do not store colors (YOLO, CreateML) get deterministic
//! per-label colors so the same label always renders the same way.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Render as the `"r,g,b,a"` text form used by the Pascal VOC codec.
    pub fn to_csv(&self) -> String {
        format!("{},{},{},{}", self.r, self.g, self.b, self.a)
    }

    /// Parse the `"r,g,b,a"` text form. Returns `None` on malformed input.
    pub fn from_csv(s: &str) -> Option<Self> {
        let mut parts = s.split(',').map(|p| p.trim().parse::<u8>());
        let r = parts.next()?.ok()?;
        let g = parts.next()?.ok()?;
        let b = parts.next()?.ok()?;
        let a = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { r, g, b, a })
    }
}

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `v` - Value/brightness (0.0-1.0)
///
/// # Returns
/// RGB tuple with values in range 0.0-1.0
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// Deterministic color for a label string.
///
/// The hash uses `DefaultHasher::new()`, which is keyed with fixed constants,
/// so the same label maps to the same color across sessions.
pub fn color_for_label(label: &str) -> Rgba {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    label.hash(&mut hasher);
    let hue = (hasher.finish() % 360) as f32;
    let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.9);
    Rgba::new((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8, 128)
}
