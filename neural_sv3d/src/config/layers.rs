//! Layered configuration: defaults, TOML file, `key=value` overrides.
//!
//! Overrides use dotted keys for nested tables (`model.hidden_dim=128`).
//! Values are read as TOML scalars when they parse as one, otherwise they
//! are taken as strings, so `data_dir=/data/shapenet` and `batch_size=4`
//! both work unquoted. Keys holding paths or names always take the value as
//! a string, so `data_dir=2024` is the directory `2024`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml::{Table, Value};

use super::{EvalConfig, ModelConfig, Representation};
use crate::error::ConfigError;

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "configs/config.toml";

/// Keys whose override values are never reinterpreted as numbers or booleans.
const STRING_KEYS: [&str; 4] = ["data_dir", "base_dir", "prediction_file", "dtype"];

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EvalConfigFile {
    data_dir: Option<String>,
    base_dir: Option<String>,
    dtype: Option<Representation>,
    batch_size: Option<usize>,
    num_workers: Option<usize>,
    vis_freq: Option<usize>,
    max_iter: Option<usize>,
    load_eval_checkpoint: Option<bool>,
    image_size: Option<u32>,
    voxel_size: Option<usize>,
    n_points: Option<usize>,
    shuffle: Option<bool>,
    seed: Option<u64>,
    prediction_file: Option<String>,
    model: Option<ModelConfigFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelConfigFile {
    encoder_channels: Option<Vec<usize>>,
    hidden_dim: Option<usize>,
}

impl EvalConfigFile {
    fn into_config(self) -> Result<EvalConfig, ConfigError> {
        let data_dir = self.data_dir.ok_or(ConfigError::MissingField("data_dir"))?;
        let base_dir = self.base_dir.ok_or(ConfigError::MissingField("base_dir"))?;

        let mut config = EvalConfig::new(data_dir, base_dir);
        if let Some(v) = self.dtype {
            config.dtype = v;
        }
        if let Some(v) = self.batch_size {
            config.batch_size = v;
        }
        if let Some(v) = self.num_workers {
            config.num_workers = v;
        }
        if let Some(v) = self.vis_freq {
            config.vis_freq = v;
        }
        if let Some(v) = self.max_iter {
            config.max_iter = v;
        }
        if let Some(v) = self.load_eval_checkpoint {
            config.load_eval_checkpoint = v;
        }
        if let Some(v) = self.image_size {
            config.image_size = v;
        }
        if let Some(v) = self.voxel_size {
            config.voxel_size = v;
        }
        if let Some(v) = self.n_points {
            config.n_points = v;
        }
        if let Some(v) = self.shuffle {
            config.shuffle = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.prediction_file {
            config.prediction_file = v;
        }
        if let Some(model) = self.model {
            let mut merged = ModelConfig::new();
            if let Some(v) = model.encoder_channels {
                merged.encoder_channels = v;
            }
            if let Some(v) = model.hidden_dim {
                merged.hidden_dim = v;
            }
            config.model = merged;
        }
        Ok(config)
    }
}

/// Merge one `key=value` override into a TOML table.
pub fn apply_override(table: &mut Table, raw: &str) -> Result<(), ConfigError> {
    let (key, value) = raw.split_once('=').ok_or_else(|| ConfigError::Invalid {
        field: raw.to_string(),
        message: "override must have the form key=value".to_string(),
    })?;
    let key = key.trim();
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(ConfigError::Invalid {
            field: raw.to_string(),
            message: "override key is empty".to_string(),
        });
    }

    let mut parts: Vec<&str> = key.split('.').collect();
    let leaf = parts.pop().unwrap_or(key);
    let mut current = table;
    for part in parts {
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        current = match entry {
            Value::Table(t) => t,
            _ => {
                return Err(ConfigError::Invalid {
                    field: key.to_string(),
                    message: format!("'{}' is not a table", part),
                })
            }
        };
    }
    let value = value.trim();
    let parsed = match parse_scalar(value) {
        Value::String(s) => Value::String(s),
        _ if STRING_KEYS.contains(&key) => Value::String(value.to_string()),
        other => other,
    };
    current.insert(leaf.to_string(), parsed);
    Ok(())
}

fn parse_scalar(raw: &str) -> Value {
    format!("v = {}", raw)
        .parse::<Table>()
        .ok()
        .and_then(|mut t| t.remove("v"))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

impl EvalConfig {
    /// Resolve a config from TOML text and command-line overrides.
    pub fn from_toml_str(text: &str, overrides: &[String]) -> Result<Self, ConfigError> {
        let mut table: Table = text.parse()?;
        for raw in overrides {
            apply_override(&mut table, raw)?;
        }

        let file: EvalConfigFile = Value::Table(table).try_into()?;
        let config = file.into_config()?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve a config from an optional file and overrides.
    ///
    /// Without an explicit path, [`DEFAULT_CONFIG_PATH`] is read when it
    /// exists and skipped otherwise. An explicit path must exist.
    pub fn resolve(path: Option<&Path>, overrides: &[String]) -> Result<Self, ConfigError> {
        let path: Option<PathBuf> = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_PATH)).filter(|p| p.is_file()),
        };

        let text = match path {
            Some(path) => std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::Read { path, source })?,
            None => String::new(),
        };
        Self::from_toml_str(&text, overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
data_dir = "/data/shapenet"
base_dir = "/runs/eval"
"#;

    #[test]
    fn test_file_layer_over_defaults() {
        let text = format!("{}\ndtype = \"point\"\nbatch_size = 4\n", BASE);
        let config = EvalConfig::from_toml_str(&text, &[]).unwrap();
        assert_eq!(config.dtype, Representation::Point);
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.vis_freq, 100);
    }

    #[test]
    fn test_overrides_beat_file() {
        let text = format!("{}\nbatch_size = 4\n", BASE);
        let overrides = vec![
            "batch_size=2".to_string(),
            "dtype=point".to_string(),
            "load_eval_checkpoint=false".to_string(),
            "model.hidden_dim=32".to_string(),
        ];
        let config = EvalConfig::from_toml_str(&text, &overrides).unwrap();
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.dtype, Representation::Point);
        assert!(!config.load_eval_checkpoint);
        assert_eq!(config.model.hidden_dim, 32);
        assert_eq!(config.model.encoder_channels, vec![16, 32, 64, 128]);
    }

    #[test]
    fn test_required_fields() {
        let err = EvalConfig::from_toml_str("base_dir = \"/runs\"", &[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("data_dir")));

        let config = EvalConfig::from_toml_str(
            "",
            &["data_dir=/data".to_string(), "base_dir=/runs".to_string()],
        )
        .unwrap();
        assert_eq!(config.data_dir, "/data");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let text = format!("{}\nbatchsize = 4\n", BASE);
        let err = EvalConfig::from_toml_str(&text, &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_dtype_rejected() {
        let err = EvalConfig::from_toml_str(BASE, &["dtype=sdf".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_malformed_override() {
        let mut table = Table::new();
        assert!(apply_override(&mut table, "batch_size").is_err());
        assert!(apply_override(&mut table, "=3").is_err());
        assert!(apply_override(&mut table, "model..hidden_dim=3").is_err());

        table.insert("seed".to_string(), Value::Integer(1));
        assert!(apply_override(&mut table, "seed.inner=3").is_err());
    }

    #[test]
    fn test_scalar_parsing() {
        assert_eq!(parse_scalar("8"), Value::Integer(8));
        assert_eq!(parse_scalar("true"), Value::Boolean(true));
        assert_eq!(parse_scalar("[4, 8]"), Value::Array(vec![Value::Integer(4), Value::Integer(8)]));
        assert_eq!(parse_scalar("/data/x"), Value::String("/data/x".to_string()));
        assert_eq!(parse_scalar("\"quoted\""), Value::String("quoted".to_string()));
    }

    #[test]
    fn test_numeric_looking_paths_stay_strings() {
        let overrides = vec![
            "data_dir=2024".to_string(),
            "base_dir=1.5".to_string(),
            "prediction_file=\"007\"".to_string(),
        ];
        let config = EvalConfig::from_toml_str("", &overrides).unwrap();
        assert_eq!(config.data_dir, "2024");
        assert_eq!(config.base_dir, "1.5");
        assert_eq!(config.prediction_file, "007");

        let mut table = Table::new();
        apply_override(&mut table, "seed=2024").unwrap();
        assert_eq!(table["seed"], Value::Integer(2024));
    }

    #[test]
    fn test_explicit_missing_file() {
        let err = EvalConfig::resolve(Some(Path::new("/nonexistent/config.toml")), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_resolve_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, BASE).unwrap();
        let config = EvalConfig::resolve(Some(&path), &["vis_freq=5".to_string()]).unwrap();
        assert_eq!(config.base_dir, "/runs/eval");
        assert_eq!(config.vis_freq, 5);
    }
}
