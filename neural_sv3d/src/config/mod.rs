//! Configuration types for neural_sv3d.
//!
//! [`EvalConfig`] is a Burn-style config struct resolved from three layers:
//! compiled defaults, an optional TOML file and `key=value` overrides.

mod eval;
mod layers;
mod network;

pub use eval::{EvalConfig, Representation, CHECKPOINT_ITER, CHECKPOINT_SAMPLES};
pub use layers::{apply_override, DEFAULT_CONFIG_PATH};
pub use network::ModelConfig;
