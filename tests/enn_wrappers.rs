//! Интеграционные тесты для оберток эпистемических сетей.

use enn::indexers::{gaussian_indexer, make_batch_indexer};
use enn::networks::{
    epistemic_network_from_module, make_centered_enn, wrap_enn_as_enn_with_state, wrap_enn_with_state_as_enn,
};
use enn::transform::{EpistemicModule, Initializer, ParamScope};
use enn::{parse_net_output, EpistemicNetwork, Index, Output, OutputWithPrior, Params, Result, RngKey, State};

use ndarray::{Array2, ArrayD, Axis, Ix1, Ix2};
use std::sync::{Arc, Mutex};

const TOLERANCE: f32 = 1e-4;

/// Сравнивает два тензора поэлементно и паникует, если они не близки.
fn assert_close(actual: &ArrayD<f32>, expected: &ArrayD<f32>, tolerance: f32) {
    assert_eq!(actual.shape(), expected.shape(), "Shapes do not match!");
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!((a - e).abs() <= tolerance, "Values do not match! Actual: {:.6}, Expected: {:.6}", a, e);
    }
}

/// Двухслойная сеть с аддитивным prior, зависящим от индекса.
struct TwoLayerEnn {
    hidden: usize,
}

impl EpistemicModule for TwoLayerEnn {
    fn forward(&self, scope: &mut ParamScope<'_>, inputs: &ArrayD<f32>, index: &Index) -> Result<Output> {
        let x = inputs.view().into_dimensionality::<Ix2>()?.to_owned();
        let hidden = scope.scoped("layer_0", |s| dense(s, &x, self.hidden))?.mapv(|v| v.max(0.0));
        let train = scope.scoped("layer_1", |s| dense(s, &hidden, 1))?;

        let z = index.view().into_dimensionality::<Ix1>()?;
        let prior_w = scope.get_parameter("prior_w", &[x.ncols(), z.len()], Initializer::TruncatedNormal { stddev: 1.0 })?;
        let prior_w = prior_w.into_dimensionality::<Ix2>()?;
        let prior = x.dot(&prior_w).dot(&z).insert_axis(Axis(1));

        Ok(OutputWithPrior::new(train.into_dyn(), prior.into_dyn()).into())
    }
}

fn dense(scope: &mut ParamScope<'_>, x: &Array2<f32>, out: usize) -> Result<Array2<f32>> {
    let w = scope.get_parameter("w", &[x.ncols(), out], Initializer::default())?;
    let b = scope.get_parameter("b", &[out], Initializer::Zeros)?;
    let w = w.into_dimensionality::<Ix2>()?;
    let b = b.into_dimensionality::<Ix1>()?;
    Ok(x.dot(&w) + &b)
}

fn two_layer_enn() -> EpistemicNetwork {
    epistemic_network_from_module(|| TwoLayerEnn { hidden: 8 }, gaussian_indexer(3))
}

fn training_inputs() -> ArrayD<f32> {
    Array2::from_shape_fn((100, 3), |(i, j)| {
        let i = i as f32;
        match j {
            0 => i * 0.1 - 3.0,
            1 => (i * 0.7).sin() * 5.0 + 2.0,
            _ => (i % 7.0) * 10.0,
        }
    })
    .into_dyn()
}

#[test]
fn test_with_state_matches_plain_apply() {
    let enn = two_layer_enn();
    let stateful = wrap_enn_as_enn_with_state(enn.clone());
    let x = training_inputs();

    for seed in 0..5 {
        let z = enn.indexer(RngKey::new(seed));
        let params = enn.init(RngKey::new(seed), &x, &z).unwrap();

        let (out, state) = stateful.apply(&params, &State::new(), &x, &z).unwrap();
        assert!(state.is_empty());
        assert_eq!(out, enn.apply(&params, &x, &z).unwrap());
    }
}

#[test]
fn test_state_round_trip_reproduces_network() {
    let enn = two_layer_enn();
    let round_trip = wrap_enn_with_state_as_enn(wrap_enn_as_enn_with_state(enn.clone()), Some(State::new()));
    let x = training_inputs();

    for seed in 0..5 {
        let key = RngKey::new(seed);
        let z = round_trip.indexer(key);
        assert_eq!(z, enn.indexer(key));

        let params = round_trip.init(key, &x, &z).unwrap();
        assert_eq!(params, enn.init(key, &x, &z).unwrap());
        assert_eq!(round_trip.apply(&params, &x, &z).unwrap(), enn.apply(&params, &x, &z).unwrap());
    }
}

#[test]
fn test_distinct_keys_give_distinct_params() {
    let enn = two_layer_enn();
    let x = training_inputs();
    let z = enn.indexer(RngKey::new(0));

    let a: Params = enn.init(RngKey::new(1), &x, &z).unwrap();
    let b: Params = enn.init(RngKey::new(2), &x, &z).unwrap();
    assert_eq!(a.len(), 5);
    assert_ne!(a["layer_0/w"], b["layer_0/w"]);
}

#[test]
fn test_index_changes_prior_only() {
    let enn = two_layer_enn();
    let x = training_inputs();
    let z0 = enn.indexer(RngKey::new(0));
    let z1 = enn.indexer(RngKey::new(1));
    let params = enn.init(RngKey::new(0), &x, &z0).unwrap();

    let (Output::WithPrior(a), Output::WithPrior(b)) =
        (enn.apply(&params, &x, &z0).unwrap(), enn.apply(&params, &x, &z1).unwrap())
    else {
        panic!("expected outputs with prior");
    };
    assert_eq!(a.train, b.train);
    assert_ne!(a.prior, b.prior);
    assert_close(&parse_net_output(&Output::WithPrior(a.clone())), &(&a.train + &a.prior), 0.0);
}

#[test]
fn test_centered_enn_sees_zero_at_column_mean() {
    let x_train = training_inputs();
    let mean = x_train.mean_axis(Axis(0)).unwrap().insert_axis(Axis(0));

    let seen: Arc<Mutex<Option<ArrayD<f32>>>> = Arc::new(Mutex::new(None));
    let recorder = Arc::clone(&seen);
    let probe: EpistemicNetwork = EpistemicNetwork::new(
        move |_params: &Params, x: &ArrayD<f32>, _z: &Index| {
            *recorder.lock().unwrap() = Some(x.clone());
            Ok(Output::Array(x.clone()))
        },
        |_key: RngKey, _x: &ArrayD<f32>, _z: &Index| Ok(Params::new()),
        |_key: RngKey| ArrayD::zeros(ndarray::IxDyn(&[])),
    );

    let centered = make_centered_enn(probe, &x_train);
    let z = centered.indexer(RngKey::new(0));
    centered.apply(&Params::new(), &mean, &z).unwrap();

    let normalized = seen.lock().unwrap().clone().expect("wrapped network was not called");
    assert_close(&normalized, &ArrayD::zeros(ndarray::IxDyn(&[1, 3])), TOLERANCE);

    // Обучающая выборка после нормализации имеет единичный разброс.
    centered.apply(&Params::new(), &x_train, &z).unwrap();
    let normalized = seen.lock().unwrap().clone().unwrap();
    let std = normalized.std_axis(Axis(0), 0.0);
    assert_close(&std, &ArrayD::ones(ndarray::IxDyn(&[3])), TOLERANCE);
}

#[test]
fn test_centered_enn_keeps_init_and_indexer() {
    let enn = two_layer_enn();
    let x = training_inputs();
    let centered = make_centered_enn(enn.clone(), &x);

    let key = RngKey::new(4);
    let z = centered.indexer(key);
    assert_eq!(z, enn.indexer(key));
    assert_eq!(centered.init(key, &x, &z).unwrap(), enn.init(key, &x, &z).unwrap());
}

#[test]
fn test_batch_indexer_is_deterministic() {
    let enn = two_layer_enn();
    let indexer = enn.indexer_fn();
    for batch_size in [1, 4, 16] {
        let indexer = Arc::clone(&indexer);
        let batch = make_batch_indexer(move |key: RngKey| indexer(key), batch_size);
        for seed in 0..3 {
            let a = batch(RngKey::new(seed));
            let b = batch(RngKey::new(seed));
            assert_eq!(a.shape(), &[batch_size, 3]);
            assert_eq!(a, b);
        }
    }
}
