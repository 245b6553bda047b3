//! Datasets of (view, ground truth) pairs.

use std::path::{Path, PathBuf};

use sv3d_io::{
    index_objects, load_point_cloud, load_view, load_voxel_grid, ObjectEntry, ViewImage,
    POINT_FILE, VIEW_FILE, VOXEL_FILE,
};

use crate::config::Representation;
use crate::error::{ConfigError, EvalError, Result};
use crate::reconstruction::Geometry;

/// One evaluation sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// RGB view, CHW in [0, 1].
    pub image: ViewImage,
    /// Ground-truth shape.
    pub target: Geometry,
    /// Object identifier.
    pub id: String,
}

/// Indexed access to samples of one representation.
///
/// Implementations are shared across loader threads.
pub trait ReconstructionDataset: Send + Sync {
    /// Number of samples.
    fn len(&self) -> usize;

    /// Whether the dataset has no samples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Representation of every sample's target.
    fn representation(&self) -> Representation;

    /// Load one sample.
    fn get(&self, index: usize) -> Result<Sample>;
}

/// ShapeNet-style dataset on disk, one directory per object.
///
/// Only the ground-truth file of the active representation is read.
#[derive(Debug, Clone)]
pub struct ShapeNetDb {
    data_dir: PathBuf,
    representation: Representation,
    image_size: u32,
    entries: Vec<ObjectEntry>,
}

impl ShapeNetDb {
    /// Index `data_dir`.
    ///
    /// Directories missing the view or the ground-truth file are skipped
    /// with a warning.
    pub fn new<P: AsRef<Path>>(
        data_dir: P,
        representation: Representation,
        image_size: u32,
    ) -> Result<Self> {
        let target_file = match representation {
            Representation::Voxel => VOXEL_FILE,
            Representation::Point => POINT_FILE,
            Representation::Mesh => return Err(ConfigError::Unsupported(representation).into()),
        };

        let data_dir = data_dir.as_ref().to_path_buf();
        let index = index_objects(&data_dir, &[VIEW_FILE, target_file])?;
        for skipped in &index.skipped {
            log::warn!(
                "Skipping {}: missing {} or {}",
                skipped.display(),
                VIEW_FILE,
                target_file
            );
        }
        log::info!(
            "Indexed {} {} samples under {}",
            index.entries.len(),
            representation,
            data_dir.display()
        );

        Ok(Self {
            data_dir,
            representation,
            image_size,
            entries: index.entries,
        })
    }

    /// Dataset root.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Identifiers in index order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }
}

impl ReconstructionDataset for ShapeNetDb {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn representation(&self) -> Representation {
        self.representation
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let entry = self.entries.get(index).ok_or_else(|| {
            EvalError::Data(format!(
                "sample {} out of range for dataset of {}",
                index,
                self.entries.len()
            ))
        })?;

        let image = load_view(entry.file(VIEW_FILE), self.image_size)?;
        let target = match self.representation {
            Representation::Voxel => Geometry::Voxel(load_voxel_grid(entry.file(VOXEL_FILE))?),
            _ => Geometry::Point(load_point_cloud(entry.file(POINT_FILE))?),
        };

        Ok(Sample {
            image,
            target,
            id: entry.id.clone(),
        })
    }
}

/// Dataset held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    representation: Representation,
    samples: Vec<Sample>,
}

impl InMemoryDataset {
    /// Create a dataset; every target must match `representation`.
    pub fn new(representation: Representation, samples: Vec<Sample>) -> Result<Self> {
        if let Some(bad) = samples
            .iter()
            .find(|s| s.target.representation() != representation)
        {
            return Err(EvalError::RepresentationMismatch {
                expected: representation,
                got: bad.target.representation(),
            });
        }
        Ok(Self {
            representation,
            samples,
        })
    }
}

impl ReconstructionDataset for InMemoryDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn representation(&self) -> Representation {
        self.representation
    }

    fn get(&self, index: usize) -> Result<Sample> {
        self.samples.get(index).cloned().ok_or_else(|| {
            EvalError::Data(format!(
                "sample {} out of range for dataset of {}",
                index,
                self.samples.len()
            ))
        })
    }
}
