//! Neural network configuration types.

use burn::config::Config;

use crate::error::ConfigError;

/// Configuration for the image encoder and decoder heads.
#[derive(Config, Debug)]
pub struct ModelConfig {
    /// Output channels of each stride-2 convolution in the image encoder.
    #[config(default = "vec![16, 32, 64, 128]")]
    pub encoder_channels: Vec<usize>,

    /// Hidden width of the decoder MLP.
    #[config(default = 256)]
    pub hidden_dim: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelConfig {
    /// Dimension of the latent vector produced by the encoder.
    pub fn latent_dim(&self) -> usize {
        self.encoder_channels.last().copied().unwrap_or(3)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encoder_channels.is_empty() {
            return Err(ConfigError::Invalid {
                field: "model.encoder_channels".to_string(),
                message: "at least one convolution is required".to_string(),
            });
        }
        if self.encoder_channels.contains(&0) {
            return Err(ConfigError::Invalid {
                field: "model.encoder_channels".to_string(),
                message: "channel counts must be positive".to_string(),
            });
        }
        if self.hidden_dim == 0 {
            return Err(ConfigError::Invalid {
                field: "model.hidden_dim".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
