use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use neural_sv3d::{EvalBackend, EvalConfig, Evaluator};

#[derive(Parser, Debug)]
#[command(
    name = "evaluate",
    about = "Evaluate a single-view 3D reconstruction checkpoint (voxel BCE or point chamfer)"
)]
struct Args {
    /// TOML config file (defaults to configs/config.toml when present).
    #[arg(long, env = "SV3D_CONFIG")]
    config: Option<PathBuf>,
    /// Overrides applied on top of the file, e.g. `dtype=point batch_size=4`.
    overrides: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = EvalConfig::resolve(args.config.as_deref(), &args.overrides)
        .context("failed to resolve evaluation config")?;
    log::info!(
        "Evaluating {} reconstructions from {}",
        config.dtype,
        config.data_dir
    );

    let device = <EvalBackend as burn::tensor::backend::Backend>::Device::default();
    let mut evaluator = Evaluator::<EvalBackend>::new(config, device)?;
    let summary = evaluator.run()?;

    if let Some(mean) = summary.mean_loss() {
        log::info!("Mean loss over {} steps: {:.4}", summary.steps(), mean);
    }
    Ok(())
}
