//! Error types for sv3d_io operations.
//!
//! Provides specific error variants for array decoding, dataset layout and
//! image loading failures.

use std::fmt;
use std::path::PathBuf;

use sv3d_core::CoreError;

/// Errors that can occur during sv3d_io operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Sv3dIoError {
    /// Invalid file format during deserialization.
    InvalidFormat {
        /// Description of the format error.
        message: String,
    },

    /// The array element type is not one we decode.
    UnsupportedDtype {
        /// The numpy type descriptor found in the header.
        descr: String,
    },

    /// Array shape does not match what the caller requires.
    ShapeMismatch {
        /// Description of the expected shape.
        expected: String,
        /// Shape found in the file.
        got: Vec<usize>,
    },

    /// Data length does not match the element count implied by a shape.
    LengthMismatch {
        /// Element count implied by the shape.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// A required file is absent.
    MissingFile {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Image decoding or encoding failed.
    Image(String),

    /// Geometry construction failed.
    Core(CoreError),

    /// I/O error during serialization/deserialization.
    Io(String),
}

impl fmt::Display for Sv3dIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sv3dIoError::InvalidFormat { message } => {
                write!(f, "invalid file format: {}", message)
            }
            Sv3dIoError::UnsupportedDtype { descr } => {
                write!(f, "unsupported array dtype '{}'", descr)
            }
            Sv3dIoError::ShapeMismatch { expected, got } => {
                write!(f, "array shape mismatch: expected {}, got {:?}", expected, got)
            }
            Sv3dIoError::LengthMismatch { expected, got } => write!(
                f,
                "data length mismatch: shape implies {} values, got {}",
                expected, got
            ),
            Sv3dIoError::MissingFile { path } => {
                write!(f, "missing file: {}", path.display())
            }
            Sv3dIoError::Image(msg) => write!(f, "image error: {}", msg),
            Sv3dIoError::Core(err) => write!(f, "{}", err),
            Sv3dIoError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for Sv3dIoError {}

impl From<std::io::Error> for Sv3dIoError {
    fn from(err: std::io::Error) -> Self {
        Sv3dIoError::Io(err.to_string())
    }
}

impl From<image::ImageError> for Sv3dIoError {
    fn from(err: image::ImageError) -> Self {
        Sv3dIoError::Image(err.to_string())
    }
}

impl From<CoreError> for Sv3dIoError {
    fn from(err: CoreError) -> Self {
        Sv3dIoError::Core(err)
    }
}

/// Result type alias for sv3d_io operations.
pub type Result<T> = std::result::Result<T, Sv3dIoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Sv3dIoError::UnsupportedDtype {
            descr: "<c8".to_string(),
        };
        assert_eq!(format!("{}", err), "unsupported array dtype '<c8'");

        let err = Sv3dIoError::ShapeMismatch {
            expected: "[N, 3]".to_string(),
            got: vec![10, 4],
        };
        assert!(format!("{}", err).contains("[N, 3]"));
        assert!(format!("{}", err).contains("[10, 4]"));
    }

    #[test]
    fn test_from_core_error() {
        let err: Sv3dIoError = CoreError::EmptyGrid.into();
        assert_eq!(err, Sv3dIoError::Core(CoreError::EmptyGrid));
    }
}
