use std::{cell::RefCell, rc::Rc};

use machine_learning::{
    Result,
    arch::Model,
    initialization::{ChainedParamGen, ConstParamGen, ParamGen, RandParamGen, generate},
    specs::{ActFnSpec, LayerSpec, LossFnSpec, MetricSpec, ModelSpec, TrainerSpec},
    training::CompiledModel,
};
use rand::{SeedableRng, rngs::StdRng};

use crate::{config::TrainConfig, data::FEATURES};

/// The architecture every waste model shares: one softplus unit over the building features.
pub fn model_spec() -> ModelSpec {
    ModelSpec::Sequential {
        layers: vec![LayerSpec::Dense {
            dim: (FEATURES, 1),
            act_fn: Some(ActFnSpec::Softplus),
        }],
    }
}

/// The full training setup for a waste model under `config`.
pub fn trainer_spec(config: &TrainConfig) -> TrainerSpec {
    TrainerSpec {
        model: model_spec(),
        optimizer: config.optimizer,
        loss: LossFnSpec::Mse,
        metrics: vec![MetricSpec::Mae],
        batch_size: config.batch_size,
        seed: config.seed,
    }
}

/// Creates a newly initialized waste model.
///
/// Weights are drawn He normal and biases start at zero, both seeded by `config.seed` when set.
pub fn create_model(config: &TrainConfig) -> Result<CompiledModel> {
    let spec = trainer_spec(config);
    let model = spec.model.build()?;

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let rng = Rc::new(RefCell::new(rng));

    let mut param_gens: Vec<Box<dyn ParamGen>> = Vec::new();

    for layer in model.layers() {
        let (fan_in, fan_out) = (layer.input_size(), layer.output_size());
        param_gens.push(Box::new(RandParamGen::he_normal(
            rng.clone(),
            fan_in * fan_out,
            fan_in,
        )?));
        param_gens.push(Box::new(ConstParamGen::zeros(fan_out)));
    }

    let params = generate(&mut ChainedParamGen::new(param_gens), model.size())?;
    CompiledModel::new(spec, params)
}
