//! Annotation format codecs.
//!
//! Bidirectional mapping between the in-memory [`AnnotationSet`] and three
//! on-disk formats:
//!
//! - **Pascal VOC** (`.xml`) — absolute corner coordinates, inline label
//!   strings, difficulty, per-shape colors, verified flag, polygon point
//!   lists. The canonical format; round-trips everything.
//! - **YOLO** (`.txt`) — normalized center/width/height rows with integer
//!   class indices resolved through a `classes.txt` sidecar. Loses colors,
//!   difficulty, and non-rectangular geometry.
//! - **CreateML** (`.json`) — absolute-pixel center coordinates, one JSON
//!   entry per image in a shared file. Same losses as YOLO.
//!
//! Each format is a [`LabelFormat`] variant carrying its own extension and
//! codec functions, selected explicitly per call — never mutated as shared
//! state.

pub mod create_ml;
pub mod error;
pub mod voc;
pub mod yolo;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

pub use error::{FormatError, ValidationWarning};

use crate::model::{AnnotationSet, LabelHistory, Shape};

/// Metadata about the image an annotation file belongs to.
///
/// Supplied by the image-loading collaborator; the codecs never open the
/// image themselves. YOLO cannot normalize or denormalize without the pixel
/// dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    /// The filename of the image (e.g. "image001.jpg").
    pub file_name: String,
    /// Name of the folder containing the image, for the VOC preamble.
    pub folder: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl ImageInfo {
    pub fn new(file_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            file_name: file_name.into(),
            folder: String::new(),
            width,
            height,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Get the base name (without extension) of the image file.
    pub fn base_name(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(base, _)| base)
            .unwrap_or(&self.file_name)
    }
}

/// Result of reading an annotation file.
#[derive(Debug, Default)]
pub struct LoadedAnnotations {
    /// Closed shapes in file order, ready for canvas re-hydration.
    pub shapes: Vec<Shape>,
    /// Per-image human-reviewed flag (only VOC can store it).
    pub verified: bool,
    /// Non-fatal conditions encountered while reading.
    pub warnings: Vec<ValidationWarning>,
}

/// The three supported annotation file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    PascalVoc,
    Yolo,
    CreateMl,
}

impl LabelFormat {
    /// All formats, in load-probe priority order.
    pub const ALL: [LabelFormat; 3] = [
        LabelFormat::PascalVoc,
        LabelFormat::Yolo,
        LabelFormat::CreateMl,
    ];

    /// The file extension this format uses, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            LabelFormat::PascalVoc => "xml",
            LabelFormat::Yolo => "txt",
            LabelFormat::CreateMl => "json",
        }
    }

    /// Human-readable name for UI display.
    pub fn display_name(&self) -> &'static str {
        match self {
            LabelFormat::PascalVoc => "Pascal VOC (XML)",
            LabelFormat::Yolo => "YOLO (TXT)",
            LabelFormat::CreateMl => "CreateML (JSON)",
        }
    }

    /// Look up a format by its extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<LabelFormat> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }

    /// Read an annotation file into shapes plus the verified flag.
    ///
    /// A failed read leaves the caller's state untouched; the caller decides
    /// whether to surface the error or keep its current annotation set.
    pub fn read(&self, path: &Path, info: &ImageInfo) -> Result<LoadedAnnotations, FormatError> {
        log::info!("reading {} annotations from {:?}", self.display_name(), path);
        match self {
            LabelFormat::PascalVoc => voc::read(path),
            LabelFormat::Yolo => yolo::read(path, info),
            LabelFormat::CreateMl => create_ml::read(path, info),
        }
    }

    /// Write an annotation set, returning any non-fatal warnings (e.g.
    /// polygons coerced to bounding boxes by rectangle-only formats).
    ///
    /// Empty sets are written as valid empty files ("verified, nothing
    /// present"). Writes are atomic: content goes to a temp sibling which
    /// is renamed over the target, so a failure leaves the prior file
    /// intact.
    pub fn write(
        &self,
        path: &Path,
        set: &AnnotationSet,
        info: &ImageInfo,
        labels: &LabelHistory,
    ) -> Result<Vec<ValidationWarning>, FormatError> {
        log::info!(
            "writing {} shapes as {} to {:?}",
            set.len(),
            self.display_name(),
            path
        );
        match self {
            LabelFormat::PascalVoc => voc::write(path, set, info),
            LabelFormat::Yolo => yolo::write(path, set, info, labels),
            LabelFormat::CreateMl => create_ml::write(path, set, info),
        }
    }
}

/// Derive the annotation file path for an image:
/// `{save_dir or image_dir}/{image_basename}.{ext}`.
pub fn annotation_path(
    image_path: &Path,
    save_dir: Option<&Path>,
    format: LabelFormat,
) -> PathBuf {
    let stem = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    let dir = save_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| image_path.parent().unwrap_or(Path::new(".")).to_path_buf());
    dir.join(format!("{}.{}", stem, format.extension()))
}

/// Probe for an existing annotation file at the derived path, trying
/// `.xml`, then `.txt`, then `.json`, and adopt whichever exists first.
pub fn probe_annotation(
    image_path: &Path,
    save_dir: Option<&Path>,
) -> Option<(LabelFormat, PathBuf)> {
    for format in LabelFormat::ALL {
        let path = annotation_path(image_path, save_dir, format);
        if path.is_file() {
            return Some((format, path));
        }
    }
    None
}

/// Write file contents via a temp sibling and rename, so a failed write
/// never clobbers the previous annotation file.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)
}
