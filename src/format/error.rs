//! Error and warning types for annotation format operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing annotation files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML parsing or serialization error
    #[error("XML error: {0}")]
    Xml(String),

    /// Invalid format structure or content
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// Required field is missing
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field
        field: String,
    },

    /// YOLO class index with no entry in the class list
    #[error("Class index {index} out of range ({classes} classes defined) in {path:?}")]
    UnknownClassIndex {
        /// The out-of-range index
        index: usize,
        /// Number of classes available
        classes: usize,
        /// The annotation file being read
        path: PathBuf,
    },

    /// Image dimensions required but not available
    #[error("Image dimensions required for format '{format}' but not available for image '{image}'")]
    MissingDimensions {
        /// The format requiring dimensions
        format: String,
        /// The image missing dimensions
        image: String,
    },
}

impl FormatError {
    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

/// Non-fatal conditions reported alongside a successful codec operation.
///
/// These are never errors: the operation completed, but altered or dropped
/// something the user may want to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// A polygon was flattened to its bounding box by a rectangle-only
    /// format.
    CoercedToBoundingBox {
        /// Label of the affected shape.
        label: String,
    },
    /// A shape had too few points to describe a region and was skipped.
    SkippedDegenerateShape {
        /// Label of the affected shape.
        label: String,
    },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationWarning::CoercedToBoundingBox { label } => {
                write!(f, "shape '{}' flattened to its bounding box", label)
            }
            ValidationWarning::SkippedDegenerateShape { label } => {
                write!(f, "shape '{}' skipped: too few points", label)
            }
        }
    }
}
