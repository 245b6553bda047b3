//! End-to-end evaluation runs over datasets on disk.

use std::path::Path;

use burn::backend::NdArray;
use image::{Rgb, RgbImage};

use neural_sv3d::{
    save_checkpoint, EvalConfig, EvalError, Evaluator, ModelConfig, Representation,
    SingleViewTo3D,
};
use sv3d_io::{load_npy, save_npy, POINT_FILE, VIEW_FILE, VOXEL_FILE};

type TestBackend = NdArray<f32>;

fn write_dataset(root: &Path, count: usize) {
    for i in 0..count {
        let dir = root.join(format!("obj_{:03}", i));
        std::fs::create_dir_all(&dir).unwrap();

        let shade = (i * 40) as u8;
        RgbImage::from_fn(8, 8, |x, y| Rgb([shade, (x * 30) as u8, (y * 30) as u8]))
            .save(dir.join(VIEW_FILE))
            .unwrap();

        let voxels: Vec<f32> = (0..64).map(|v| ((v + i) % 3 == 0) as u8 as f32).collect();
        save_npy(dir.join(VOXEL_FILE), &[4, 4, 4], &voxels).unwrap();

        let points: Vec<f32> = (0..30).map(|v| (v as f32 * 0.07 + i as f32).sin()).collect();
        save_npy(dir.join(POINT_FILE), &[10, 3], &points).unwrap();
    }
}

fn small_config(data_dir: &Path, base_dir: &Path, dtype: Representation) -> EvalConfig {
    EvalConfig::new(
        data_dir.to_string_lossy().into_owned(),
        base_dir.to_string_lossy().into_owned(),
    )
    .with_dtype(dtype)
    .with_batch_size(2)
    .with_vis_freq(2)
    .with_image_size(8)
    .with_voxel_size(4)
    .with_n_points(16)
    .with_model(ModelConfig::new().with_encoder_channels(vec![4, 8]).with_hidden_dim(8))
}

fn store_checkpoint(config: &EvalConfig) {
    let device = Default::default();
    let model = SingleViewTo3D::<TestBackend>::new(config, &device).unwrap();
    save_checkpoint(&model, &config.checkpoint_path()).unwrap();
}

#[test]
fn test_voxel_run() {
    let data = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    write_dataset(data.path(), 6);

    let config = small_config(data.path(), base.path(), Representation::Voxel);
    store_checkpoint(&config);
    std::fs::create_dir_all(config.vis_dir()).unwrap();

    let mut evaluator = Evaluator::<TestBackend>::new(config.clone(), Default::default()).unwrap();
    let summary = evaluator.run().unwrap();

    assert_eq!(summary.steps(), 3);
    assert_eq!(summary.visualized_steps, vec![0, 2]);
    assert!(summary.losses.iter().all(|l| l.is_finite() && *l >= 0.0));

    let expected = summary.losses.iter().sum::<f32>() / 3.0;
    assert!((summary.mean_loss().unwrap() - expected).abs() < 1e-6);

    assert!(config.vis_dir().join("0.png").is_file());
    assert!(!config.vis_dir().join("1.png").exists());
    assert!(config.vis_dir().join("2.png").is_file());

    let prediction = load_npy(config.prediction_path()).unwrap();
    assert_eq!(prediction.shape, vec![2, 4, 4, 4]);
    assert!(prediction.data.iter().all(|p| (0.0..=1.0).contains(p)));
}

#[test]
fn test_point_run_drops_incomplete_batch() {
    let data = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    write_dataset(data.path(), 5);

    let config = small_config(data.path(), base.path(), Representation::Point)
        .with_load_eval_checkpoint(false)
        .with_num_workers(2);
    std::fs::create_dir_all(config.vis_dir()).unwrap();

    let mut evaluator = Evaluator::<TestBackend>::new(config.clone(), Default::default()).unwrap();
    let summary = evaluator.run().unwrap();

    assert_eq!(summary.steps(), 2);
    assert_eq!(summary.visualized_steps, vec![0]);

    let prediction = load_npy(config.prediction_path()).unwrap();
    assert_eq!(prediction.shape, vec![2, 16, 3]);
}

#[test]
fn test_missing_checkpoint_stops_before_running() {
    let data = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    write_dataset(data.path(), 2);

    let config = small_config(data.path(), base.path(), Representation::Voxel);
    let result = Evaluator::<TestBackend>::new(config, Default::default());
    assert!(matches!(result, Err(EvalError::Checkpoint { .. })));
}

#[test]
fn test_missing_vis_dir_is_fatal() {
    let data = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    write_dataset(data.path(), 2);

    let config = small_config(data.path(), base.path(), Representation::Voxel)
        .with_load_eval_checkpoint(false);
    let mut evaluator = Evaluator::<TestBackend>::new(config, Default::default()).unwrap();
    assert!(matches!(evaluator.run(), Err(EvalError::Image(_))));
}

#[test]
fn test_mesh_is_rejected() {
    let data = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();

    let config = small_config(data.path(), base.path(), Representation::Mesh);
    assert!(matches!(
        Evaluator::<TestBackend>::new(config, Default::default()),
        Err(EvalError::Config(_))
    ));
}
