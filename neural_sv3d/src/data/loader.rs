//! Batch iteration over a dataset.

use std::sync::Arc;

use burn::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use super::dataset::{ReconstructionDataset, Sample};
use crate::config::Representation;
use crate::error::{EvalError, Result};
use crate::reconstruction::Reconstruction;

/// Batching options.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Samples per batch.
    pub batch_size: usize,
    /// Threads loading the samples of a batch (0 loads on the caller).
    pub num_workers: usize,
    /// Shuffle sample order once at construction.
    pub shuffle: bool,
    /// Seed for the shuffle.
    pub seed: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            batch_size: 1,
            num_workers: 0,
            shuffle: false,
            seed: 0,
        }
    }
}

/// A batch of samples on the host, in load order.
#[derive(Debug, Clone)]
pub struct HostBatch {
    /// Samples of the batch.
    pub samples: Vec<Sample>,
}

/// A batch moved to the execution device.
#[derive(Debug, Clone)]
pub struct DeviceBatch<B: Backend> {
    /// Views of shape [batch, 3, H, W].
    pub images: Tensor<B, 4>,
    /// Ground truth stacked along dimension 0.
    pub targets: Reconstruction<B>,
}

impl HostBatch {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample identifiers in batch order.
    pub fn ids(&self) -> Vec<&str> {
        self.samples.iter().map(|s| s.id.as_str()).collect()
    }

    /// Stack images and targets into device tensors.
    pub fn to_device<B: Backend>(&self, device: &B::Device) -> Result<DeviceBatch<B>> {
        let first = self
            .samples
            .first()
            .ok_or_else(|| EvalError::Data("cannot move an empty batch".to_string()))?;
        let [channels, height, width] = first.image.shape();

        let mut flat = Vec::with_capacity(self.len() * channels * height * width);
        for sample in &self.samples {
            if sample.image.shape() != first.image.shape() {
                return Err(EvalError::ShapeMismatch {
                    expected: first.image.shape().to_vec(),
                    got: sample.image.shape().to_vec(),
                });
            }
            flat.extend_from_slice(&sample.image.data);
        }
        let images = Tensor::<B, 1>::from_floats(flat.as_slice(), device)
            .reshape([self.len(), channels, height, width]);

        let targets: Vec<_> = self.samples.iter().map(|s| &s.target).collect();
        let targets = Reconstruction::stack(&targets, device)?;

        Ok(DeviceBatch { images, targets })
    }
}

/// Fixed-size batches over a dataset.
///
/// Incomplete trailing batches are dropped, so [`DataLoader::len`] is
/// `dataset.len() / batch_size`.
pub struct DataLoader {
    dataset: Arc<dyn ReconstructionDataset>,
    batch_size: usize,
    order: Vec<usize>,
    cursor: usize,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for DataLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLoader")
            .field("samples", &self.order.len())
            .field("batch_size", &self.batch_size)
            .field("cursor", &self.cursor)
            .field("workers", &self.pool.as_ref().map(|p| p.current_num_threads()))
            .finish()
    }
}

impl DataLoader {
    /// Create a loader.
    pub fn new(dataset: Arc<dyn ReconstructionDataset>, options: &LoaderOptions) -> Result<Self> {
        if options.batch_size == 0 {
            return Err(EvalError::Data("batch_size must be positive".to_string()));
        }

        let mut order: Vec<usize> = (0..dataset.len()).collect();
        if options.shuffle {
            let mut rng = StdRng::seed_from_u64(options.seed);
            order.shuffle(&mut rng);
        }

        let pool = match options.num_workers {
            0 => None,
            n => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("sv3d-loader-{}", i))
                    .build()?,
            ),
        };

        Ok(Self {
            dataset,
            batch_size: options.batch_size,
            order,
            cursor: 0,
            pool,
        })
    }

    /// Number of complete batches.
    pub fn len(&self) -> usize {
        self.order.len() / self.batch_size
    }

    /// Whether no complete batch exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples per batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Representation of the underlying dataset.
    pub fn representation(&self) -> Representation {
        self.dataset.representation()
    }

    /// Sample indices in iteration order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Restart from the first batch.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Load the next batch, or `None` when no complete batch remains.
    pub fn next_batch(&mut self) -> Result<Option<HostBatch>> {
        let end = self.cursor + self.batch_size;
        if end > self.order.len() {
            return Ok(None);
        }

        let indices = &self.order[self.cursor..end];
        let dataset = &self.dataset;
        let samples = match &self.pool {
            Some(pool) => pool.install(|| {
                indices
                    .par_iter()
                    .map(|&i| dataset.get(i))
                    .collect::<Result<Vec<_>>>()
            })?,
            None => indices
                .iter()
                .map(|&i| dataset.get(i))
                .collect::<Result<Vec<_>>>()?,
        };

        self.cursor = end;
        Ok(Some(HostBatch { samples }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemoryDataset;
    use crate::reconstruction::Geometry;
    use burn::backend::NdArray;
    use sv3d_core::Point3;
    use sv3d_io::ViewImage;

    type TestBackend = NdArray<f32>;

    fn dataset(n: usize) -> Arc<dyn ReconstructionDataset> {
        let samples = (0..n)
            .map(|i| Sample {
                image: ViewImage {
                    height: 2,
                    width: 2,
                    data: vec![i as f32; 12],
                },
                target: Geometry::Point(vec![Point3::new(i as f32, 0.0, 0.0); 4]),
                id: i.to_string(),
            })
            .collect();
        Arc::new(InMemoryDataset::new(Representation::Point, samples).unwrap())
    }

    fn options(batch_size: usize, num_workers: usize) -> LoaderOptions {
        LoaderOptions {
            batch_size,
            num_workers,
            ..Default::default()
        }
    }

    #[test]
    fn test_drop_last() {
        let mut loader = DataLoader::new(dataset(7), &options(3, 0)).unwrap();
        assert_eq!(loader.len(), 2);

        let first = loader.next_batch().unwrap().unwrap();
        assert_eq!(first.ids(), vec!["0", "1", "2"]);
        let second = loader.next_batch().unwrap().unwrap();
        assert_eq!(second.ids(), vec!["3", "4", "5"]);
        assert!(loader.next_batch().unwrap().is_none());

        loader.reset();
        assert_eq!(loader.next_batch().unwrap().unwrap().ids(), vec!["0", "1", "2"]);
    }

    #[test]
    fn test_workers_keep_order() {
        let mut loader = DataLoader::new(dataset(8), &options(4, 3)).unwrap();
        let batch = loader.next_batch().unwrap().unwrap();
        assert_eq!(batch.ids(), vec!["0", "1", "2", "3"]);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let shuffled = LoaderOptions {
            shuffle: true,
            seed: 7,
            ..options(2, 0)
        };
        let a = DataLoader::new(dataset(16), &shuffled).unwrap();
        let b = DataLoader::new(dataset(16), &shuffled).unwrap();
        assert_eq!(a.order(), b.order());

        let mut sorted = a.order().to_vec();
        sorted.sort();
        assert_eq!(sorted, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_to_device() {
        let device = Default::default();
        let mut loader = DataLoader::new(dataset(4), &options(2, 0)).unwrap();
        let batch = loader.next_batch().unwrap().unwrap();
        let on_device = batch.to_device::<TestBackend>(&device).unwrap();

        assert_eq!(on_device.images.dims(), [2, 3, 2, 2]);
        assert_eq!(on_device.targets.dims(), vec![2, 4, 3]);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(DataLoader::new(dataset(4), &options(0, 0)).is_err());
    }
}
