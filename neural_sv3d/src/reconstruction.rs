//! Batched reconstructions on the device and single shapes on the host.

use burn::prelude::*;
use sv3d_core::{flatten_points, points_from_flat, Point3, VoxelGrid};

use crate::config::Representation;
use crate::error::{EvalError, Result};

/// One shape on the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Occupancy grid.
    Voxel(VoxelGrid),
    /// Point cloud.
    Point(Vec<Point3>),
}

impl Geometry {
    /// Representation of this shape.
    pub fn representation(&self) -> Representation {
        match self {
            Geometry::Voxel(_) => Representation::Voxel,
            Geometry::Point(_) => Representation::Point,
        }
    }

    /// Per-sample tensor shape.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Geometry::Voxel(grid) => grid.dims().to_vec(),
            Geometry::Point(points) => vec![points.len(), 3],
        }
    }

    fn extend_flat(&self, out: &mut Vec<f32>) {
        match self {
            Geometry::Voxel(grid) => out.extend_from_slice(grid.values()),
            Geometry::Point(points) => out.extend(flatten_points(points)),
        }
    }
}

/// A batch of predicted or ground-truth shapes stacked along dimension 0.
#[derive(Debug, Clone)]
pub enum Reconstruction<B: Backend> {
    /// Occupancy values of shape [batch, D, D, D].
    Voxel(Tensor<B, 4>),
    /// Coordinates of shape [batch, N, 3].
    Point(Tensor<B, 3>),
}

impl<B: Backend> Reconstruction<B> {
    /// Representation of this batch.
    pub fn representation(&self) -> Representation {
        match self {
            Reconstruction::Voxel(_) => Representation::Voxel,
            Reconstruction::Point(_) => Representation::Point,
        }
    }

    /// Full tensor shape.
    pub fn dims(&self) -> Vec<usize> {
        match self {
            Reconstruction::Voxel(t) => t.dims().to_vec(),
            Reconstruction::Point(t) => t.dims().to_vec(),
        }
    }

    /// Number of samples in the batch.
    pub fn batch_size(&self) -> usize {
        self.dims()[0]
    }

    /// Stack host shapes into a device batch.
    ///
    /// All shapes must share one representation and one per-sample shape.
    pub fn stack(shapes: &[&Geometry], device: &B::Device) -> Result<Self> {
        let first = shapes
            .first()
            .ok_or_else(|| EvalError::Data("cannot stack an empty batch".to_string()))?;
        let representation = first.representation();
        let sample_shape = first.shape();

        let mut flat = Vec::with_capacity(shapes.len() * sample_shape.iter().product::<usize>());
        for shape in shapes {
            if shape.representation() != representation {
                return Err(EvalError::RepresentationMismatch {
                    expected: representation,
                    got: shape.representation(),
                });
            }
            if shape.shape() != sample_shape {
                return Err(EvalError::ShapeMismatch {
                    expected: sample_shape,
                    got: shape.shape(),
                });
            }
            shape.extend_flat(&mut flat);
        }

        let batch = shapes.len();
        let values = Tensor::<B, 1>::from_floats(flat.as_slice(), device);
        Ok(match representation {
            Representation::Point => {
                Reconstruction::Point(values.reshape([batch, sample_shape[0], 3]))
            }
            _ => Reconstruction::Voxel(values.reshape([
                batch,
                sample_shape[0],
                sample_shape[1],
                sample_shape[2],
            ])),
        })
    }

    /// Copy the batch to the host as `(shape, values)` in C order.
    pub fn to_host(&self) -> Result<(Vec<usize>, Vec<f32>)> {
        let data = match self {
            Reconstruction::Voxel(t) => t.clone().into_data(),
            Reconstruction::Point(t) => t.clone().into_data(),
        };
        let values = data
            .to_vec::<f32>()
            .map_err(|e| EvalError::Tensor(format!("{:?}", e)))?;
        Ok((self.dims(), values))
    }

    /// Copy one sample of the batch to the host.
    pub fn sample(&self, index: usize) -> Result<Geometry> {
        let batch = self.batch_size();
        if index >= batch {
            return Err(EvalError::Data(format!(
                "sample {} out of range for batch of {}",
                index, batch
            )));
        }

        match self {
            Reconstruction::Voxel(t) => {
                let [_, d0, d1, d2] = t.dims();
                let values = t
                    .clone()
                    .slice([index..index + 1, 0..d0, 0..d1, 0..d2])
                    .into_data()
                    .to_vec::<f32>()
                    .map_err(|e| EvalError::Tensor(format!("{:?}", e)))?;
                Ok(Geometry::Voxel(VoxelGrid::new([d0, d1, d2], values)?))
            }
            Reconstruction::Point(t) => {
                let [_, n, _] = t.dims();
                let values = t
                    .clone()
                    .slice([index..index + 1, 0..n, 0..3])
                    .into_data()
                    .to_vec::<f32>()
                    .map_err(|e| EvalError::Tensor(format!("{:?}", e)))?;
                Ok(Geometry::Point(points_from_flat(&values)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn cloud(offset: f32) -> Geometry {
        Geometry::Point(vec![
            Point3::new(offset, 0.0, 0.0),
            Point3::new(0.0, offset, 1.0),
        ])
    }

    #[test]
    fn test_stack_and_sample() {
        let device = Default::default();
        let a = cloud(1.0);
        let b = cloud(2.0);
        let batch = Reconstruction::<TestBackend>::stack(&[&a, &b], &device).unwrap();

        assert_eq!(batch.representation(), Representation::Point);
        assert_eq!(batch.dims(), vec![2, 2, 3]);
        assert_eq!(batch.sample(1).unwrap(), b);
        assert!(batch.sample(2).is_err());

        let (shape, values) = batch.to_host().unwrap();
        assert_eq!(shape, vec![2, 2, 3]);
        assert_eq!(values.len(), 12);
        assert_eq!(values[0], 1.0);
    }

    #[test]
    fn test_stack_voxels() {
        let device = Default::default();
        let mut grid = VoxelGrid::empty(2).unwrap();
        grid.set(1, 0, 1, 1.0).unwrap();
        let g = Geometry::Voxel(grid);

        let batch = Reconstruction::<TestBackend>::stack(&[&g, &g], &device).unwrap();
        assert_eq!(batch.dims(), vec![2, 2, 2, 2]);
        assert_eq!(batch.sample(0).unwrap(), g);
    }

    #[test]
    fn test_stack_rejects_mixed_batches() {
        let device = Default::default();
        let voxel = Geometry::Voxel(VoxelGrid::empty(2).unwrap());
        let points = cloud(0.0);
        let err = Reconstruction::<TestBackend>::stack(&[&voxel, &points], &device).unwrap_err();
        assert!(matches!(err, EvalError::RepresentationMismatch { .. }));

        let small = Geometry::Point(vec![Point3::new(0.0, 0.0, 0.0)]);
        let err = Reconstruction::<TestBackend>::stack(&[&points, &small], &device).unwrap_err();
        assert!(matches!(err, EvalError::ShapeMismatch { .. }));

        assert!(Reconstruction::<TestBackend>::stack(&[], &device).is_err());
    }
}
