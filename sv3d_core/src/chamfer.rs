//! Brute-force nearest neighbour and chamfer distance on point slices.
//!
//! This is the CPU reference for the tensor implementation in `neural_sv3d`.
//! It is O(N * M) and meant for checking, not for large batches.

use crate::error::CoreError;
use crate::types::Point3;

/// Squared distance from `query` to its nearest neighbour in `set`.
///
/// Returns `None` when `set` is empty.
pub fn nearest_squared_distance(query: Point3, set: &[Point3]) -> Option<f32> {
    set.iter()
        .map(|p| query.distance_squared(*p))
        .fold(None, |best, d| match best {
            Some(b) if b <= d => Some(b),
            _ => Some(d),
        })
}

/// Mean over `from` of the squared distance to the nearest point of `to`.
pub fn directed_chamfer(from: &[Point3], to: &[Point3]) -> Result<f32, CoreError> {
    if from.is_empty() || to.is_empty() {
        return Err(CoreError::EmptyPointSet);
    }
    let sum: f64 = from
        .iter()
        .filter_map(|p| nearest_squared_distance(*p, to))
        .map(f64::from)
        .sum();
    Ok((sum / from.len() as f64) as f32)
}

/// Symmetric chamfer distance: `directed(a, b) + directed(b, a)`.
///
/// The two sets may have different cardinalities.
pub fn chamfer_distance(a: &[Point3], b: &[Point3]) -> Result<f32, CoreError> {
    Ok(directed_chamfer(a, b)? + directed_chamfer(b, a)?)
}
