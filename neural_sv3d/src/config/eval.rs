//! Evaluation run configuration.

use std::fmt;
use std::path::PathBuf;

use burn::config::Config;
use serde::{Deserialize, Serialize};

use super::ModelConfig;
use crate::error::ConfigError;

/// Number of training samples encoded in checkpoint file names.
pub const CHECKPOINT_SAMPLES: usize = 4096;

/// Training iteration encoded in checkpoint file names.
pub const CHECKPOINT_ITER: usize = 1000;

/// The 3D representation a run reconstructs.
///
/// Selects the ground-truth files, the model head, the loss and the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// Dense `[D, D, D]` occupancy grid.
    Voxel,
    /// Fixed-size `[N, 3]` point cloud.
    Point,
    /// Triangle mesh. Reserved; rejected at load time.
    Mesh,
}

impl Representation {
    /// Lowercase name used in paths and config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Representation::Voxel => "voxel",
            Representation::Point => "point",
            Representation::Mesh => "mesh",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of one evaluation run.
///
/// Read-only once resolved. Paths derived from it:
///
/// ```text
/// {base_dir}/checkpoints/{dtype}/checkpoint_4096_1000.bin   model weights
/// {base_dir}/{prediction_file}                             latest prediction
/// {base_dir}/vis/{dtype}/{step}.png                        visualizations
/// ```
#[derive(Config, Debug)]
pub struct EvalConfig {
    /// Dataset root, one directory per object.
    pub data_dir: String,

    /// Root for checkpoints and outputs.
    pub base_dir: String,

    /// Representation type.
    #[config(default = "Representation::Voxel")]
    pub dtype: Representation,

    /// Samples per batch.
    #[config(default = 8)]
    pub batch_size: usize,

    /// Loader threads (0 loads on the calling thread).
    #[config(default = 0)]
    pub num_workers: usize,

    /// Visualize every `vis_freq` steps.
    #[config(default = 100)]
    pub vis_freq: usize,

    /// Iteration count shown in progress lines.
    #[config(default = 10000)]
    pub max_iter: usize,

    /// Restore model weights before evaluating.
    #[config(default = true)]
    pub load_eval_checkpoint: bool,

    /// Side length views are resized to.
    #[config(default = 137)]
    pub image_size: u32,

    /// Voxel grid resolution (voxel runs only).
    #[config(default = 32)]
    pub voxel_size: usize,

    /// Points per predicted cloud (point runs only).
    #[config(default = 2048)]
    pub n_points: usize,

    /// Shuffle sample order.
    #[config(default = false)]
    pub shuffle: bool,

    /// Seed for the shuffle.
    #[config(default = 42)]
    pub seed: u64,

    /// File name of the persisted prediction under `base_dir`.
    #[config(default = "String::from(\"pre_point_cloud.npy\")")]
    pub prediction_file: String,

    /// Network configuration.
    #[config(default = "ModelConfig::new()")]
    pub model: ModelConfig,
}

impl EvalConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.is_empty() {
            return Err(ConfigError::MissingField("data_dir"));
        }
        if self.base_dir.is_empty() {
            return Err(ConfigError::MissingField("base_dir"));
        }
        if self.dtype == Representation::Mesh {
            return Err(ConfigError::Unsupported(self.dtype));
        }
        positive("batch_size", self.batch_size)?;
        positive("vis_freq", self.vis_freq)?;
        positive("image_size", self.image_size as usize)?;
        match self.dtype {
            Representation::Voxel => positive("voxel_size", self.voxel_size)?,
            Representation::Point => positive("n_points", self.n_points)?,
            Representation::Mesh => {}
        }
        if self.prediction_file.is_empty() {
            return Err(ConfigError::Invalid {
                field: "prediction_file".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        self.model.validate()
    }

    /// Checkpoint path without the recorder's file extension.
    pub fn checkpoint_path(&self) -> PathBuf {
        PathBuf::from(&self.base_dir)
            .join("checkpoints")
            .join(self.dtype.as_str())
            .join(format!("checkpoint_{}_{}", CHECKPOINT_SAMPLES, CHECKPOINT_ITER))
    }

    /// Where the latest prediction is written.
    pub fn prediction_path(&self) -> PathBuf {
        PathBuf::from(&self.base_dir).join(&self.prediction_file)
    }

    /// Directory receiving visualizations.
    pub fn vis_dir(&self) -> PathBuf {
        PathBuf::from(&self.base_dir)
            .join("vis")
            .join(self.dtype.as_str())
    }
}

fn positive(field: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            field: field.to_string(),
            message: "must be positive".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EvalConfig {
        EvalConfig::new("/data/shapenet".to_string(), "/runs/eval".to_string())
    }

    #[test]
    fn test_defaults_validate() {
        let config = config();
        assert!(config.validate().is_ok());
        assert_eq!(config.dtype, Representation::Voxel);
        assert_eq!(config.prediction_file, "pre_point_cloud.npy");
    }

    #[test]
    fn test_derived_paths() {
        let config = config().with_dtype(Representation::Point);
        assert_eq!(
            config.checkpoint_path(),
            PathBuf::from("/runs/eval/checkpoints/point/checkpoint_4096_1000")
        );
        assert_eq!(
            config.prediction_path(),
            PathBuf::from("/runs/eval/pre_point_cloud.npy")
        );
        assert_eq!(config.vis_dir(), PathBuf::from("/runs/eval/vis/point"));
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(config().with_batch_size(0).validate().is_err());
        assert!(config().with_vis_freq(0).validate().is_err());
        assert!(config().with_image_size(0).validate().is_err());
    }

    #[test]
    fn test_fields_checked_per_representation() {
        // n_points is irrelevant for voxel runs and the other way around.
        assert!(config().with_n_points(0).validate().is_ok());
        assert!(config().with_voxel_size(0).validate().is_err());

        let point = config().with_dtype(Representation::Point);
        assert!(point.clone().with_voxel_size(0).validate().is_ok());
        assert!(point.with_n_points(0).validate().is_err());
    }

    #[test]
    fn test_mesh_is_unsupported() {
        let err = config()
            .with_dtype(Representation::Mesh)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Unsupported(Representation::Mesh)));
    }
}
