//! Error types for sv3d_core operations.
//!
//! A plain enum with a hand-written `Display` so the crate carries no error
//! dependencies.

use std::fmt;

/// Errors that can occur during sv3d_core operations.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A grid was declared with a zero-sized axis.
    EmptyGrid,
    /// Number of grid values does not match the declared dimensions.
    GridSizeMismatch {
        /// Cells implied by the dimensions.
        expected: usize,
        /// Values actually provided.
        got: usize,
    },
    /// A cell index lies outside the grid.
    CellOutOfBounds {
        /// Requested cell.
        cell: [usize; 3],
        /// Grid dimensions.
        dims: [usize; 3],
    },
    /// A flat coordinate buffer is not a multiple of three.
    NotPointTriples {
        /// Length of the buffer.
        len: usize,
    },
    /// A point set required to be non-empty was empty.
    EmptyPointSet,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::EmptyGrid => write!(f, "voxel grid has a zero-sized axis"),
            CoreError::GridSizeMismatch { expected, got } => {
                write!(
                    f,
                    "voxel grid size mismatch: expected {} values, got {}",
                    expected, got
                )
            }
            CoreError::CellOutOfBounds { cell, dims } => {
                write!(f, "cell {:?} is outside grid {:?}", cell, dims)
            }
            CoreError::NotPointTriples { len } => {
                write!(f, "buffer of {} values is not a list of xyz triples", len)
            }
            CoreError::EmptyPointSet => write!(f, "point set is empty"),
        }
    }
}

impl std::error::Error for CoreError {}
