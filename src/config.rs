use std::{fs, num::NonZeroUsize, path::Path};

use anyhow::{Context, Result};
use machine_learning::specs::OptimizerSpec;
use serde::{Deserialize, Serialize};

/// The CSV the training flow reads by default.
pub const TRAINING_DATA: &str = "training_data.csv";

/// Where the training flow saves the model by default.
pub const TRAINED_MODEL_DIR: &str = "python_model2";

/// Where the inference flow loads the model from.
///
/// Differs from `TRAINED_MODEL_DIR`, a freshly trained model has to be copied here.
pub const INFERENCE_MODEL_DIR: &str = "./utils/tensor_model";

pub const DEFAULT_EPOCHS: usize = 100;
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// The knobs of the training flow. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Epochs per cross-validation fold.
    pub epochs: usize,
    pub batch_size: NonZeroUsize,
    /// Seeds both the initial weights and the shuffling, `None` draws from the OS.
    pub seed: Option<u64>,
    /// Start every fold from a newly initialized model instead of the previous fold's.
    pub fresh_model_per_fold: bool,
    pub optimizer: OptimizerSpec,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: DEFAULT_EPOCHS,
            batch_size: NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            seed: None,
            fresh_model_per_fold: false,
            optimizer: OptimizerSpec::default(),
        }
    }
}

impl TrainConfig {
    /// Reads a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config '{}'", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("invalid config '{}'", path.display()))
    }
}
