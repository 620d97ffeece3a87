use std::{io::Write, path::Path};

use anyhow::{Context, Result, bail};
use log::{debug, info};
use machine_learning::{
    dataset::Dataset,
    training::{CompiledModel, LeaveOneOut},
};
use ndarray::Array2;

use crate::{config::TrainConfig, data, model::create_model};

/// Fixed inputs run through the trained model, with what they're expected to be close to.
pub const SANITY_CHECKS: [(&str, [f32; 4]); 2] = [
    ("Prediction for input1 expect 12", [1., 14., 42., 1.]),
    ("Prediction for input2, expect 191", [2., 9526., 33341., 5.]),
];

/// The result of evaluating one held out sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldReport {
    pub test: usize,
    pub loss: f32,
    pub mae: f32,
}

/// Trains a waste model with leave-one-out cross-validation, writing a line per fold to `out`.
///
/// Unless `config.fresh_model_per_fold` is set, a single model is created up front and every
/// fold keeps training it, so fold `k` starts from the weights fold `k - 1` left.
///
/// # Returns
/// The model as the last fold left it, and the report of every fold.
pub fn leave_one_out<W: Write>(
    dataset: &Dataset,
    config: &TrainConfig,
    out: &mut W,
) -> Result<(CompiledModel, Vec<FoldReport>)> {
    if dataset.len() < 2 {
        bail!(
            "leave-one-out needs at least 2 samples, got {}",
            dataset.len()
        );
    }

    info!(
        "running {} folds of {} epochs (fresh model per fold: {})",
        dataset.len(),
        config.epochs,
        config.fresh_model_per_fold
    );

    let mut model = create_model(config)?;
    let mut reports = Vec::with_capacity(dataset.len());

    for fold in LeaveOneOut::new(dataset.len()) {
        if config.fresh_model_per_fold && fold.test > 0 {
            model = create_model(config)?;
        }

        let mut train = dataset.select(&fold.train)?;
        let test = dataset.select(&[fold.test])?;

        let losses = model.fit(&mut train, config.epochs)?;
        debug!(
            "fold {}: final training loss {:?}",
            fold.test,
            losses.last()
        );

        let evaluation = model.evaluate(&test)?;
        let mae = evaluation.metric("mae").unwrap_or_default();
        writeln!(out, "Test Loss: {}, Test MAE: {}", evaluation.loss, mae)?;

        reports.push(FoldReport {
            test: fold.test,
            loss: evaluation.loss,
            mae,
        });
    }

    Ok((model, reports))
}

/// Runs `SANITY_CHECKS` through `model` and writes each prediction to `out`.
pub fn sanity_check<W: Write>(model: &mut CompiledModel, out: &mut W) -> Result<()> {
    for (label, features) in SANITY_CHECKS {
        let x = Array2::from_shape_vec((1, features.len()), features.to_vec())?;
        let y = model.predict(x.view())?;
        writeln!(out, "{label}: {}", y[[0, 0]])?;
    }

    Ok(())
}

/// The whole training flow: load the CSV, cross-validate, smoke test and save.
pub fn run<W: Write>(
    data_path: &Path,
    output_dir: &Path,
    config: &TrainConfig,
    out: &mut W,
) -> Result<CompiledModel> {
    let dataset = data::load_dataset(data_path)?;
    let (mut model, _) = leave_one_out(&dataset, config, out)?;

    sanity_check(&mut model, out)?;

    model
        .save(output_dir)
        .with_context(|| format!("cannot save model to '{}'", output_dir.display()))?;
    info!("model saved to {}", output_dir.display());

    Ok(model)
}
