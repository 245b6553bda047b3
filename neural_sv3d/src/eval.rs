//! The evaluation loop.
//!
//! [`Evaluator`] owns the model, the batch loader and the loss. One call to
//! [`Evaluator::run`] walks every complete batch once:
//!
//! ```text
//! next batch -> device -> forward -> persist prediction -> loss
//!            -> visualize (every vis_freq steps) -> progress line
//! ```
//!
//! Any error ends the run.

use std::sync::Arc;

use burn::prelude::*;
use instant::Instant;
use sv3d_io::save_npy;

use crate::checkpoint::load_checkpoint;
use crate::config::EvalConfig;
use crate::data::{DataLoader, LoaderOptions, ShapeNetDb};
use crate::error::{EvalError, Result};
use crate::loss::ReconstructionLoss;
use crate::metrics::{progress_line, LossLog, StepTimes};
use crate::nn::SingleViewTo3D;
use crate::visualize::{PngVisualizer, Visualizer};

/// What a finished run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalSummary {
    /// Loss of every step, in step order.
    pub losses: Vec<f32>,
    /// Steps that were visualized.
    pub visualized_steps: Vec<usize>,
}

impl EvalSummary {
    /// Number of evaluated steps.
    pub fn steps(&self) -> usize {
        self.losses.len()
    }

    /// Mean loss over the run.
    pub fn mean_loss(&self) -> Option<f32> {
        if self.losses.is_empty() {
            return None;
        }
        let sum: f64 = self.losses.iter().map(|v| *v as f64).sum();
        Some((sum / self.losses.len() as f64) as f32)
    }
}

/// Evaluates a reconstruction model over a dataset.
pub struct Evaluator<B: Backend> {
    config: EvalConfig,
    model: SingleViewTo3D<B>,
    loader: DataLoader,
    loss: ReconstructionLoss,
    visualizer: Box<dyn Visualizer>,
    device: B::Device,
}

impl<B: Backend> Evaluator<B> {
    /// Build everything a run needs from `config`.
    ///
    /// Indexes the dataset, builds the model and, when
    /// `load_eval_checkpoint` is set, restores its weights. Visualizations go
    /// to [`EvalConfig::vis_dir`], which must exist.
    pub fn new(config: EvalConfig, device: B::Device) -> Result<Self> {
        config.validate()?;

        let dataset = ShapeNetDb::new(&config.data_dir, config.dtype, config.image_size)?;
        let loader = DataLoader::new(Arc::new(dataset), &loader_options(&config))?;

        let mut model = SingleViewTo3D::new(&config, &device)?;
        if config.load_eval_checkpoint {
            model = load_checkpoint(model, &config.checkpoint_path(), &device)?;
            log::info!("Successfully loaded iter 0");
        }

        let visualizer = Box::new(PngVisualizer::new(config.vis_dir()));
        Self::from_parts(config, model, loader, visualizer, device)
    }

    /// Assemble an evaluator from already built parts.
    ///
    /// The model and the loader must both match `config.dtype`.
    pub fn from_parts(
        config: EvalConfig,
        model: SingleViewTo3D<B>,
        loader: DataLoader,
        visualizer: Box<dyn Visualizer>,
        device: B::Device,
    ) -> Result<Self> {
        config.validate()?;
        for got in [model.representation(), loader.representation()] {
            if got != config.dtype {
                return Err(EvalError::RepresentationMismatch {
                    expected: config.dtype,
                    got,
                });
            }
        }

        Ok(Self {
            loss: ReconstructionLoss::new(config.dtype),
            config,
            model,
            loader,
            visualizer,
            device,
        })
    }

    /// The run configuration.
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// The evaluated model.
    pub fn model(&self) -> &SingleViewTo3D<B> {
        &self.model
    }

    /// Number of steps a run will take.
    pub fn num_steps(&self) -> usize {
        self.loader.len()
    }

    /// Evaluate every complete batch once.
    pub fn run(&mut self) -> Result<EvalSummary> {
        log::info!("Starting evaluating !");

        let start = Instant::now();
        let prediction_path = self.config.prediction_path();
        let mut losses = LossLog::new();
        let mut visualized_steps = Vec::new();

        self.loader.reset();
        for step in 0..self.loader.len() {
            let iter_start = Instant::now();

            let Some(batch) = self.loader.next_batch()? else {
                break;
            };
            let read = iter_start.elapsed().as_secs_f64();

            let on_device = batch.to_device::<B>(&self.device)?;
            let prediction = self.model.forward(on_device.images)?;

            let (shape, values) = prediction.to_host()?;
            save_npy(&prediction_path, &shape, &values)?;

            let loss = self.loss.compute(&prediction, &on_device.targets)?;

            if step % self.config.vis_freq == 0 {
                let ground_truth = batch
                    .samples
                    .first()
                    .map(|s| &s.target)
                    .ok_or_else(|| EvalError::Data("empty batch".to_string()))?;
                self.visualizer
                    .visualize(step, &prediction.sample(0)?, ground_truth)?;
                visualized_steps.push(step);
            }

            losses.push(loss);
            let times = StepTimes {
                total: start.elapsed().as_secs_f64(),
                read,
                iteration: iter_start.elapsed().as_secs_f64(),
            };
            log::info!(
                "{}",
                progress_line(
                    step,
                    self.config.max_iter,
                    times,
                    losses.mean().unwrap_or_default()
                )
            );
        }

        log::info!("Done!");
        Ok(EvalSummary {
            losses: losses.into_values(),
            visualized_steps,
        })
    }
}

fn loader_options(config: &EvalConfig) -> LoaderOptions {
    LoaderOptions {
        batch_size: config.batch_size,
        num_workers: config.num_workers,
        shuffle: config.shuffle,
        seed: config.seed,
    }
}
