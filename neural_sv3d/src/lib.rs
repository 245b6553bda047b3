//! # neural_sv3d
//!
//! Evaluation of single-view 3D reconstruction models with Burn.
//!
//! A run reads one RGB view per object, predicts either a voxel occupancy
//! grid or a point cloud, scores the prediction against the ground truth and
//! periodically renders both side by side.
//!
//! ## Features
//!
//! - **Layered config**: defaults, TOML file, then `key=value` overrides
//! - **Model**: convolutional image encoder with a voxel or point head
//! - **Losses**: clamped binary cross-entropy (voxels), symmetric chamfer (points)
//! - **Data**: ShapeNet-style directories, batched with optional worker threads
//! - **Visualization**: prediction vs ground-truth PNG plots
//!
//! ## Quick Start
//!
//! ```ignore
//! use burn::backend::NdArray;
//! use neural_sv3d::{EvalConfig, Evaluator};
//!
//! let config = EvalConfig::resolve(None, &["dtype=point".to_string()])?;
//! let mut evaluator = Evaluator::<NdArray<f32>>::new(config, Default::default())?;
//! let summary = evaluator.run()?;
//! println!("mean loss: {:?}", summary.mean_loss());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! sv3d_core (geometry, chamfer, projection)
//!     │
//!     ▼
//! sv3d_io (npy, dataset layout, view images)
//!     │
//!     ▼
//! neural_sv3d (model, losses, loader, evaluation loop)
//! ```
//!
//! ## Feature Flags
//!
//! - `wgpu`: GPU backend for the `evaluate` binary (NdArray otherwise)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checkpoint;
pub mod config;
pub mod data;
pub mod error;
pub mod eval;
pub mod loss;
pub mod metrics;
pub mod nn;
pub mod reconstruction;
pub mod visualize;

/// Backend used by the `evaluate` binary.
#[cfg(feature = "wgpu")]
pub type EvalBackend = burn::backend::Wgpu<f32>;
/// Backend used by the `evaluate` binary.
#[cfg(not(feature = "wgpu"))]
pub type EvalBackend = burn::backend::NdArray<f32>;

pub use checkpoint::{load_checkpoint, save_checkpoint};
pub use config::{EvalConfig, ModelConfig, Representation};
pub use data::{DataLoader, InMemoryDataset, LoaderOptions, ReconstructionDataset, ShapeNetDb};
pub use error::{ConfigError, EvalError, Result};
pub use eval::{EvalSummary, Evaluator};
pub use loss::ReconstructionLoss;
pub use nn::SingleViewTo3D;
pub use reconstruction::{Geometry, Reconstruction};
pub use visualize::{PngVisualizer, RecordingVisualizer, Visualizer};
