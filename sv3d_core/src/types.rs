//! Core geometric types for reconstruction evaluation.
//!
//! Provides the point type used for point clouds and the dense occupancy grid
//! used for voxel reconstructions.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::CoreError;

/// Occupancy probability above which a predicted voxel counts as filled.
pub const OCCUPANCY_THRESHOLD: f32 = 0.3;

/// A 3D point with named fields for clarity.
///
/// Provides arithmetic operations and conversions to/from arrays.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Point3 {
    /// Create a new Point3.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Create a Point3 with all components set to the same value.
    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// Convert to an array.
    #[inline]
    pub const fn as_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Dot product with another point (treating both as vectors).
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Squared length of the vector.
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length (magnitude) of the vector.
    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Squared Euclidean distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Self) -> f32 {
        (self - other).length_squared()
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
            z: self.z.min(other.z),
        }
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
            z: self.z.max(other.z),
        }
    }

    /// True when every component is finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f32; 3]> for Point3 {
    #[inline]
    fn from(arr: [f32; 3]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
            z: arr[2],
        }
    }
}

impl From<Point3> for [f32; 3] {
    #[inline]
    fn from(p: Point3) -> Self {
        p.as_array()
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl Div<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn div(self, scalar: f32) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl Neg for Point3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Flatten a point slice into `[x0, y0, z0, x1, ...]`.
pub fn flatten_points(points: &[Point3]) -> Vec<f32> {
    points.iter().flat_map(|p| p.as_array()).collect()
}

/// Build points from a flat `[N * 3]` buffer.
pub fn points_from_flat(values: &[f32]) -> Result<Vec<Point3>, CoreError> {
    if values.len() % 3 != 0 {
        return Err(CoreError::NotPointTriples { len: values.len() });
    }
    Ok(values
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect())
}

/// Axis-aligned bounds of a point set, `None` when empty.
pub fn bounds(points: &[Point3]) -> Option<(Point3, Point3)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
    )
}

/// Dense occupancy grid stored in row-major (C) order.
///
/// The value at `[i, j, k]` lives at `(i * d1 + j) * d2 + k`, which matches
/// the layout of a `[d0, d1, d2]` array written by numpy.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    dims: [usize; 3],
    values: Vec<f32>,
}

impl VoxelGrid {
    /// Create a grid from its dimensions and row-major values.
    pub fn new(dims: [usize; 3], values: Vec<f32>) -> Result<Self, CoreError> {
        let expected = dims[0] * dims[1] * dims[2];
        if expected == 0 {
            return Err(CoreError::EmptyGrid);
        }
        if values.len() != expected {
            return Err(CoreError::GridSizeMismatch {
                expected,
                got: values.len(),
            });
        }
        Ok(Self { dims, values })
    }

    /// An all-empty cubic grid of side `size`.
    pub fn empty(size: usize) -> Result<Self, CoreError> {
        Self::new([size; 3], vec![0.0; size * size * size])
    }

    /// Grid dimensions `[d0, d1, d2]`.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Row-major occupancy values.
    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Consume the grid, returning its values.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; empty grids are rejected on construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat index of `[i, j, k]`.
    #[inline]
    pub fn flat_index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.dims[1] + j) * self.dims[2] + k
    }

    /// Value at `[i, j, k]`, `None` if out of bounds.
    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<f32> {
        if i >= self.dims[0] || j >= self.dims[1] || k >= self.dims[2] {
            return None;
        }
        self.values.get(self.flat_index(i, j, k)).copied()
    }

    /// Set the value at `[i, j, k]`.
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f32) -> Result<(), CoreError> {
        if i >= self.dims[0] || j >= self.dims[1] || k >= self.dims[2] {
            return Err(CoreError::CellOutOfBounds {
                cell: [i, j, k],
                dims: self.dims,
            });
        }
        let idx = self.flat_index(i, j, k);
        self.values[idx] = value;
        Ok(())
    }

    /// Cells whose value is strictly above `threshold`, in row-major order.
    pub fn occupied(&self, threshold: f32) -> Vec<[usize; 3]> {
        let [_, d1, d2] = self.dims;
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > threshold)
            .map(|(idx, _)| [idx / (d1 * d2), (idx / d2) % d1, idx % d2])
            .collect()
    }

    /// A copy with every value mapped to 1.0 above `threshold` and 0.0 otherwise.
    pub fn binarize(&self, threshold: f32) -> Self {
        Self {
            dims: self.dims,
            values: self
                .values
                .iter()
                .map(|v| if *v > threshold { 1.0 } else { 0.0 })
                .collect(),
        }
    }
}
