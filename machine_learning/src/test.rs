#![cfg(test)]

use std::{cell::RefCell, num::NonZeroUsize, rc::Rc};

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    arch::{Model, Sequential, activations::ActFn, layers::Layer, loss::Mse, metrics::Mae},
    dataset::Dataset,
    initialization::{ChainedParamGen, ConstParamGen, ParamGen, RandParamGen, generate},
    optimization::{Adam, GradientDescent},
    training::{ModelTrainer, Trainer},
};

/// A 3x3 grid over `[0, 1]^2` labeled with `f`.
fn grid<F: Fn(f32, f32) -> f32>(f: F) -> Dataset {
    let mut data = Vec::new();

    for i in 0..3 {
        for j in 0..3 {
            let (x0, x1) = (i as f32 / 2., j as f32 / 2.);
            data.extend([x0, x1, f(x0, x1)]);
        }
    }

    Dataset::new(data, 2, 1).unwrap()
}

#[test]
fn test_ml_linear_gd_convergence() {
    let mut dataset = grid(|x0, x1| 3. * x0 - x1 + 0.5);

    let model = Sequential::new([Layer::dense((2, 1), None)]).unwrap();
    let params = vec![0.; model.size()];
    let mut trainer = ModelTrainer::new(
        model,
        params,
        GradientDescent::new(0.1),
        Mse,
        vec![Box::new(Mae)],
        NonZeroUsize::new(3).unwrap(),
        StdRng::seed_from_u64(42),
    )
    .unwrap();

    trainer.fit(&mut dataset, 1000).unwrap();

    let expected = [3., -1., 0.5];
    for (got, expected) in trainer.params().iter().zip(expected) {
        assert!((got - expected).abs() < 0.05, "got {got} expected {expected}");
    }

    let evaluation = trainer.evaluate(&dataset).unwrap();
    assert!(evaluation.loss < 1e-3, "loss {}", evaluation.loss);
}

#[test]
fn test_ml_softplus_adam_convergence() {
    let mut dataset = grid(|x0, x1| x0 + 2. * x1 + 1.);

    let model = Sequential::new([Layer::dense((2, 1), Some(ActFn::softplus()))]).unwrap();

    let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(7)));
    let param_gens: Vec<Box<dyn ParamGen>> = vec![
        Box::new(RandParamGen::he_normal(rng, 2, 2).unwrap()),
        Box::new(ConstParamGen::new(0., 1)),
    ];
    let params = generate(&mut ChainedParamGen::new(param_gens), model.size()).unwrap();
    assert_eq!(params[2], 0.);

    let mut trainer = ModelTrainer::new(
        model,
        params,
        Adam::new(3, 0.05, 0.9, 0.999, 1e-7),
        Mse,
        vec![Box::new(Mae)],
        NonZeroUsize::new(9).unwrap(),
        StdRng::seed_from_u64(7),
    )
    .unwrap();

    let initial = trainer.evaluate(&dataset).unwrap().loss;
    trainer.fit(&mut dataset, 2000).unwrap();
    let evaluation = trainer.evaluate(&dataset).unwrap();

    println!("initial loss {initial}, final {evaluation:?}");
    assert!(evaluation.loss < initial / 10.);
    assert!(evaluation.loss < 0.1, "loss {}", evaluation.loss);
    assert!(evaluation.metric("mae").is_some_and(|mae| mae < 0.3));
}
