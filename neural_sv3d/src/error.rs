//! Error types for neural_sv3d.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::Representation;

/// Errors raised while resolving the run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A field without a default was not provided by any layer.
    #[error("missing required config field '{0}'")]
    MissingField(&'static str),

    /// A field holds a value outside its valid range.
    #[error("invalid value for '{field}': {message}")]
    Invalid {
        /// Field name.
        field: String,
        /// Description of the problem.
        message: String,
    },

    /// The representation is recognised but cannot be evaluated.
    #[error("representation '{0}' is not supported for evaluation")]
    Unsupported(Representation),

    /// The TOML document or an override could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that can occur during evaluation.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Checkpoint could not be loaded or saved.
    #[error("checkpoint error at {path}: {message}")]
    Checkpoint {
        /// Checkpoint path without the recorder extension.
        path: PathBuf,
        /// Recorder error description.
        message: String,
    },

    /// File format or dataset layout error from sv3d_io.
    #[error("I/O error: {0}")]
    Io(#[from] sv3d_io::Sv3dIoError),

    /// Visualization encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Tensor shape mismatch.
    #[error("tensor shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// Prediction and ground truth use different representations.
    #[error("representation mismatch: expected {expected}, got {got}")]
    RepresentationMismatch {
        /// Representation of the run.
        expected: Representation,
        /// Representation encountered.
        got: Representation,
    },

    /// Invalid or inconsistent sample data.
    #[error("invalid data: {0}")]
    Data(String),

    /// Geometry construction failed.
    #[error("geometry error: {0}")]
    Geometry(#[from] sv3d_core::CoreError),

    /// The loader thread pool could not be built.
    #[error("worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// Tensor data could not be read back from the device.
    #[error("tensor error: {0}")]
    Tensor(String),
}

/// Result type for neural_sv3d operations.
pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingField("data_dir");
        assert_eq!(err.to_string(), "missing required config field 'data_dir'");

        let err = ConfigError::Unsupported(Representation::Mesh);
        assert_eq!(
            err.to_string(),
            "representation 'mesh' is not supported for evaluation"
        );
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: EvalError = ConfigError::MissingField("base_dir").into();
        assert_eq!(err.to_string(), "missing required config field 'base_dir'");
    }

    #[test]
    fn test_mismatch_display() {
        let err = EvalError::RepresentationMismatch {
            expected: Representation::Voxel,
            got: Representation::Point,
        };
        assert_eq!(err.to_string(), "representation mismatch: expected voxel, got point");
    }
}
