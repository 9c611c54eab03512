// --- Файл: src/networks.rs ---

//! Модуль, содержащий конструкторы эпистемических сетей и обертки,
//! переводящие сети между представлениями с состоянием и без него.

use crate::base::{EpistemicNetwork, EpistemicNetworkWithState, Params, State};
use crate::data::transforms::Standardizer;
use crate::error::Result;
use crate::output::Output;
use crate::rng::RngKey;
use crate::transform::{EpistemicModule, ParamScope, Transformed};
use ndarray::ArrayD;
use std::sync::Arc;
use tracing::debug;

/// Строит эпистемическую сеть из конструктора модуля и индексера.
///
/// `enn_ctor` вызывается заново при каждом `init` и `apply` и должен
/// каждый раз строить структурно одинаковые модули.
pub fn epistemic_network_from_module<Z, M, C, X>(enn_ctor: C, indexer: X) -> EpistemicNetwork<Z>
where
    Z: 'static,
    M: EpistemicModule<Z>,
    C: Fn() -> M + Send + Sync + 'static,
    X: Fn(RngKey) -> Z + Send + Sync + 'static,
{
    let ctor = Arc::new(enn_ctor);
    let init_ctor = Arc::clone(&ctor);
    EpistemicNetwork::new(
        move |params: &Params, inputs: &ArrayD<f32>, index: &Z| {
            let mut scope = ParamScope::for_apply(params, None);
            ctor().forward(&mut scope, inputs, index)
        },
        move |key: RngKey, inputs: &ArrayD<f32>, index: &Z| {
            let mut scope = ParamScope::for_init(key, false);
            init_ctor().forward(&mut scope, inputs, index)?;
            Ok(scope.into_params())
        },
        indexer,
    )
}

/// Вариант [`epistemic_network_from_module`] с состоянием.
///
/// Модуль может вызывать `get_state`/`set_state`; оставленное им состояние
/// возвращается из `init` и `apply`.
pub fn epistemic_network_with_state_from_module<Z, M, C, X>(
    enn_ctor: C,
    indexer: X,
) -> EpistemicNetworkWithState<Z>
where
    Z: 'static,
    M: EpistemicModule<Z>,
    C: Fn() -> M + Send + Sync + 'static,
    X: Fn(RngKey) -> Z + Send + Sync + 'static,
{
    let ctor = Arc::new(enn_ctor);
    let init_ctor = Arc::clone(&ctor);
    EpistemicNetworkWithState::new(
        move |params: &Params, state: &State, inputs: &ArrayD<f32>, index: &Z| {
            let mut scope = ParamScope::for_apply(params, Some(state.clone()));
            let out = ctor().forward(&mut scope, inputs, index)?;
            let (_, new_state) = scope.into_parts();
            Ok((out, new_state))
        },
        move |key: RngKey, inputs: &ArrayD<f32>, index: &Z| {
            let mut scope = ParamScope::for_init(key, true);
            init_ctor().forward(&mut scope, inputs, index)?;
            Ok(scope.into_parts())
        },
        indexer,
    )
}

/// Оборачивает обычную функцию `y = f(x)` в эпистемическую сеть.
///
/// `init` и `apply` игнорируют индекс, а индексер возвращает
/// полученный ключ.
pub fn wrap_transformed_as_enn(transformed: Transformed) -> EpistemicNetwork<RngKey> {
    let init_transformed = transformed.clone();
    EpistemicNetwork::new(
        move |params: &Params, x: &ArrayD<f32>, _z: &RngKey| transformed.apply(params, x),
        move |key: RngKey, x: &ArrayD<f32>, _z: &RngKey| init_transformed.init(key, x),
        |key: RngKey| key,
    )
}

/// Превращает сеть без состояния в сеть с всегда пустым состоянием.
pub fn wrap_enn_as_enn_with_state<Z: 'static>(enn: EpistemicNetwork<Z>) -> EpistemicNetworkWithState<Z> {
    let apply = enn.apply_fn();
    let init = enn.init_fn();
    EpistemicNetworkWithState::from_parts(
        Arc::new(move |params: &Params, _state: &State, inputs: &ArrayD<f32>, index: &Z| -> Result<(Output, State)> {
            Ok((apply(params, inputs, index)?, State::new()))
        }),
        Arc::new(move |key: RngKey, inputs: &ArrayD<f32>, index: &Z| -> Result<(Params, State)> {
            Ok((init(key, inputs, index)?, State::new()))
        }),
        enn.indexer_fn(),
    )
}

/// Превращает сеть с состоянием в сеть без состояния.
///
/// `constant_state` (пустое при `None`) передается в каждый `apply`, а
/// состояние, возвращенное `init` и `apply`, отбрасывается. Имеет смысл
/// только для сетей, чьи выходы не зависят от меняющегося состояния.
pub fn wrap_enn_with_state_as_enn<Z: 'static>(
    enn: EpistemicNetworkWithState<Z>,
    constant_state: Option<State>,
) -> EpistemicNetwork<Z> {
    let constant_state = constant_state.unwrap_or_default();
    let apply = enn.apply_fn();
    let init = enn.init_fn();
    EpistemicNetwork::from_parts(
        Arc::new(move |params: &Params, x: &ArrayD<f32>, z: &Z| -> Result<Output> {
            let (output, _state) = apply(params, &constant_state, x, z)?;
            Ok(output)
        }),
        Arc::new(move |key: RngKey, x: &ArrayD<f32>, z: &Z| -> Result<Params> {
            let (params, _state) = init(key, x, z)?;
            Ok(params)
        }),
        enn.indexer_fn(),
    )
}

/// Возвращает сеть, стандартизующую входы по статистикам `x_train`.
///
/// Вход, чьи признаки не совпадают по форме с `x_train`, дает
/// [`EnnError::ShapeMismatch`](crate::error::EnnError::ShapeMismatch) из `apply`.
///
/// # Паника
///
/// Паникует, если у `x_train` нет batch-оси (`ndim() <= 1`).
pub fn make_centered_enn<Z: 'static>(enn: EpistemicNetwork<Z>, x_train: &ArrayD<f32>) -> EpistemicNetwork<Z> {
    assert!(
        x_train.ndim() > 1,
        "x_train must include a batch dimension, got shape {:?}",
        x_train.shape()
    );
    let standardizer = Standardizer::fit(x_train);
    debug!(
        num_samples = x_train.shape()[0],
        feature_shape = ?standardizer.mean().shape(),
        "centering network inputs"
    );

    let apply = enn.apply_fn();
    let centered_apply = move |params: &Params, x: &ArrayD<f32>, z: &Z| -> Result<Output> {
        let normalized_x = standardizer.transform(x)?;
        apply(params, &normalized_x, z)
    };
    EpistemicNetwork::from_parts(Arc::new(centered_apply), enn.init_fn(), enn.indexer_fn())
}
