//! Command-line interface.
//!
//! Besides the `train` and `predict` subcommands the binary keeps the calling convention the
//! web application relies on:
//!
//! ```bash
//! waste-predictor -u <usage> <gfa> <volume> <floor>
//! ```
//!
//! which prints the prediction of the model at `./utils/tensor_model` as a single line.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;

use crate::{
    building::{BuildingAttributes, UsageCategory},
    config::{INFERENCE_MODEL_DIR, TRAINED_MODEL_DIR, TRAINING_DATA, TrainConfig},
    predict, train,
};

/// The amount of arguments, after the program name, that trigger the caller mode.
pub const CALLER_ARGS: usize = 5;

/// Trains and queries the demolition waste model.
#[derive(Parser, Debug)]
#[command(name = "waste-predictor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a model with leave-one-out cross-validation and save it
    Train(TrainCommand),

    /// Predict the total waste of a building
    Predict(PredictCommand),
}

impl Commands {
    pub const NAMES: [&'static str; 3] = ["train", "predict", "help"];
}

/// Returns the four feature values when `args` (without the program name) follow the caller
/// convention: at least `CALLER_ARGS` of them, the first one being anything but a subcommand.
pub fn caller_args(args: &[String]) -> Option<&[String]> {
    let first = args.first()?;

    if args.len() < CALLER_ARGS || Commands::NAMES.contains(&first.as_str()) {
        return None;
    }

    Some(&args[1..CALLER_ARGS])
}

#[derive(Args, Debug, Clone)]
pub struct TrainCommand {
    /// CSV with usage, gfa, volume, floor and total_waste columns
    #[arg(long, default_value = TRAINING_DATA)]
    pub data: PathBuf,

    /// Directory to save the trained model to
    #[arg(long, short = 'o', default_value = TRAINED_MODEL_DIR)]
    pub output: PathBuf,

    /// Path to the training configuration file (JSON format)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Epochs per fold, overrides the configuration
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Seed for the initial weights and the shuffling, overrides the configuration
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start every fold from a newly initialized model
    #[arg(long)]
    pub fresh_model_per_fold: bool,
}

impl TrainCommand {
    /// Merges the configuration file, if any, with the flags.
    pub fn config(&self) -> Result<TrainConfig> {
        let mut config = match &self.config {
            Some(path) => TrainConfig::load(path)?,
            None => TrainConfig::default(),
        };

        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }

        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.fresh_model_per_fold |= self.fresh_model_per_fold;
        Ok(config)
    }

    pub fn run(&self) -> Result<()> {
        let config = self.config()?;
        info!("training with {config:?}");

        let mut stdout = std::io::stdout().lock();
        train::run(&self.data, &self.output, &config, &mut stdout)?;
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct PredictCommand {
    /// Directory of the model to predict with
    #[arg(long, short = 'm', default_value = INFERENCE_MODEL_DIR)]
    pub model: PathBuf,

    /// Building usage: education, office, retail, hospital, residential or their code 1-5
    pub usage: UsageCategory,

    /// Gross floor area, in square meters
    pub gfa: f32,

    /// Volume in cubic meters, estimated with a 2.8 m floor height when omitted or 0
    #[arg(long)]
    pub volume: Option<f32>,

    /// Number of floors
    pub floor: f32,
}

impl PredictCommand {
    pub fn building(&self) -> BuildingAttributes {
        BuildingAttributes {
            usage: self.usage,
            gfa: self.gfa,
            volume: self.volume,
            floor: self.floor,
        }
    }

    pub fn run(&self) -> Result<()> {
        let prediction = predict::predict_building(&self.model, &self.building())?;
        predict::print_prediction(prediction)
    }
}
