//! Data loading for evaluation.

mod dataset;
mod loader;

pub use dataset::{InMemoryDataset, ReconstructionDataset, Sample, ShapeNetDb};
pub use loader::{DataLoader, DeviceBatch, HostBatch, LoaderOptions};
