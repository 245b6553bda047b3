//! Model checkpoint save/load.
//!
//! Checkpoints are Burn binary records holding every parameter of a
//! [`SingleViewTo3D`] at full precision. Paths are given without extension;
//! the recorder appends [`CHECKPOINT_EXTENSION`].

use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::prelude::*;
use burn::record::{BinFileRecorder, FullPrecisionSettings};

use crate::error::{EvalError, Result};
use crate::nn::{params, SingleViewTo3D};

/// Extension the binary recorder appends.
pub const CHECKPOINT_EXTENSION: &str = "bin";

/// Path of the file the recorder reads or writes for `path`.
pub fn checkpoint_file(path: &Path) -> PathBuf {
    path.with_extension(CHECKPOINT_EXTENSION)
}

/// Load a checkpoint into `model`, replacing all of its parameters.
///
/// A missing or unreadable file is an error; the model is never returned
/// with fresh weights in its place. The record must hold exactly the
/// parameters of `model` with the same shapes; a record written for another
/// configuration is rejected.
pub fn load_checkpoint<B: Backend>(
    model: SingleViewTo3D<B>,
    path: &Path,
    device: &B::Device,
) -> Result<SingleViewTo3D<B>> {
    let file = checkpoint_file(path);
    if !file.is_file() {
        return Err(EvalError::Checkpoint {
            path: path.to_path_buf(),
            message: format!("{} does not exist", file.display()),
        });
    }

    let expected = params::shapes(&model.parameters());
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    let loaded = model
        .load_file(path, &recorder, device)
        .map_err(|e| EvalError::Checkpoint {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let got = params::shapes(&loaded.parameters());
    if let Some(message) = params::first_mismatch(&expected, &got) {
        return Err(EvalError::Checkpoint {
            path: path.to_path_buf(),
            message,
        });
    }
    Ok(loaded)
}

/// Save `model` so [`load_checkpoint`] can restore it.
pub fn save_checkpoint<B: Backend>(model: &SingleViewTo3D<B>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| EvalError::Checkpoint {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    model
        .clone()
        .save_file(path, &recorder)
        .map_err(|e| EvalError::Checkpoint {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    log::debug!("Saved checkpoint to {}", checkpoint_file(path).display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EvalConfig, ModelConfig, Representation};
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn config() -> EvalConfig {
        EvalConfig::new("data".to_string(), "out".to_string())
            .with_dtype(Representation::Point)
            .with_n_points(8)
            .with_model(ModelConfig::new().with_encoder_channels(vec![4]).with_hidden_dim(8))
    }

    #[test]
    fn test_missing_checkpoint_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model = SingleViewTo3D::<TestBackend>::new(&config(), &device).unwrap();

        let err = load_checkpoint(model, &dir.path().join("nope"), &device).unwrap_err();
        assert!(matches!(err, EvalError::Checkpoint { .. }));
    }

    #[test]
    fn test_corrupt_checkpoint_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint");
        std::fs::write(checkpoint_file(&path), b"not a record").unwrap();

        let device = Default::default();
        let model = SingleViewTo3D::<TestBackend>::new(&config(), &device).unwrap();
        let err = load_checkpoint(model, &path, &device).unwrap_err();
        assert!(matches!(err, EvalError::Checkpoint { .. }));
    }

    #[test]
    fn test_checkpoint_for_other_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint");
        let device = Default::default();

        let wide = config().with_n_points(32).with_model(
            ModelConfig::new().with_encoder_channels(vec![4]).with_hidden_dim(16),
        );
        let saved = SingleViewTo3D::<TestBackend>::new(&wide, &device).unwrap();
        save_checkpoint(&saved, &path).unwrap();

        let model = SingleViewTo3D::<TestBackend>::new(&config(), &device).unwrap();
        match load_checkpoint(model, &path, &device) {
            Err(EvalError::Checkpoint { message, .. }) => {
                assert!(message.contains("shape mismatch"), "{}", message)
            }
            other => panic!("expected a checkpoint error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_round_trip_restores_every_parameter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint");
        let device = Default::default();

        let saved = SingleViewTo3D::<TestBackend>::new(&config(), &device).unwrap();
        save_checkpoint(&saved, &path).unwrap();
        let fresh = SingleViewTo3D::<TestBackend>::new(&config(), &device).unwrap();
        let restored = load_checkpoint(fresh, &path, &device).unwrap();

        let before = saved.parameters();
        let after = restored.parameters();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.to_vec().unwrap(), b.to_vec().unwrap(), "{}", a.name);
        }
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(
            checkpoint_file(Path::new("/runs/checkpoints/voxel/checkpoint_4096_1000")),
            PathBuf::from("/runs/checkpoints/voxel/checkpoint_4096_1000.bin")
        );
    }
}
