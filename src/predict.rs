use std::{
    io::{self, Write},
    path::Path,
};

use anyhow::{Context, Result, ensure};
use log::debug;
use machine_learning::training::CompiledModel;
use ndarray::Array2;

use crate::{building::BuildingAttributes, config::INFERENCE_MODEL_DIR, data::FEATURES};

/// Loads the model saved at `model_dir` and predicts the total waste for `features`.
pub fn predict(model_dir: &Path, features: [f32; FEATURES]) -> Result<f32> {
    let mut model = CompiledModel::load(model_dir)
        .with_context(|| format!("cannot load model from '{}'", model_dir.display()))?;

    let x = Array2::from_shape_vec((1, FEATURES), features.to_vec())?;
    let y = model.predict(x.view())?;
    debug!("{features:?} -> {y}");

    let prediction = y.first().copied();
    prediction.context("the model gave no prediction")
}

/// Predicts the total waste of `building` with the model saved at `model_dir`.
pub fn predict_building(model_dir: &Path, building: &BuildingAttributes) -> Result<f32> {
    predict(model_dir, building.features())
}

/// Parses the four positional features of the caller mode.
///
/// `offset` is the position of the first value among the program arguments, used in errors.
pub fn parse_features<S: AsRef<str>>(values: &[S], offset: usize) -> Result<[f32; FEATURES]> {
    ensure!(
        values.len() >= FEATURES,
        "expected {FEATURES} numeric arguments, got {}",
        values.len()
    );

    let mut features = [0.; FEATURES];

    for (i, (feature, value)) in features.iter_mut().zip(values).enumerate() {
        let value = value.as_ref();
        *feature = value
            .trim()
            .parse()
            .with_context(|| format!("argument {} ({value:?}) is not a number", offset + i))?;
    }

    Ok(features)
}

/// Runs one prediction from the inference model directory and prints it as a single line.
pub fn run_caller<S: AsRef<str>>(values: &[S], offset: usize) -> Result<()> {
    let features = parse_features(values, offset)?;
    let prediction = predict(Path::new(INFERENCE_MODEL_DIR), features)?;

    print_prediction(prediction)
}

pub fn print_prediction(prediction: f32) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{prediction}")?;
    stdout.flush()?;
    Ok(())
}
