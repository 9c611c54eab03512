// --- Файл: src/base.rs ---

//! Модуль, определяющий базовые типы, общие для всех оберток.
//!
//! Эпистемическая сеть - это тройка чистых функций:
//!
//! - `apply(params, inputs, index) -> output`
//! - `init(key, inputs, index) -> params`
//! - `indexer(key) -> index`
//!
//! Вариант с состоянием дополнительно передает [`State`] через `init` и
//! `apply`. Функции хранятся за `Arc`: сеть дешево клонируется и может
//! использоваться из нескольких потоков.

use crate::error::Result;
use crate::output::Output;
use crate::rng::RngKey;
use ndarray::ArrayD;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Обучаемые параметры по пути области (например, `"mlp/linear_0/w"`).
pub type Params = HashMap<String, ArrayD<f32>>;

/// Необучаемое состояние сети (например, скользящие статистики).
pub type State = HashMap<String, ArrayD<f32>>;

/// Тип эпистемического индекса по умолчанию.
pub type Index = ArrayD<f32>;

pub type ApplyFn<Z> = Arc<dyn Fn(&Params, &ArrayD<f32>, &Z) -> Result<Output> + Send + Sync>;
pub type InitFn<Z> = Arc<dyn Fn(RngKey, &ArrayD<f32>, &Z) -> Result<Params> + Send + Sync>;
pub type IndexerFn<Z> = Arc<dyn Fn(RngKey) -> Z + Send + Sync>;

pub type ApplyWithStateFn<Z> =
    Arc<dyn Fn(&Params, &State, &ArrayD<f32>, &Z) -> Result<(Output, State)> + Send + Sync>;
pub type InitWithStateFn<Z> =
    Arc<dyn Fn(RngKey, &ArrayD<f32>, &Z) -> Result<(Params, State)> + Send + Sync>;

/// Сеть, чей выход зависит от эпистемического индекса `Z`.
pub struct EpistemicNetwork<Z = Index> {
    apply: ApplyFn<Z>,
    init: InitFn<Z>,
    indexer: IndexerFn<Z>,
}

impl<Z> EpistemicNetwork<Z> {
    pub fn new<A, I, X>(apply: A, init: I, indexer: X) -> Self
    where
        A: Fn(&Params, &ArrayD<f32>, &Z) -> Result<Output> + Send + Sync + 'static,
        I: Fn(RngKey, &ArrayD<f32>, &Z) -> Result<Params> + Send + Sync + 'static,
        X: Fn(RngKey) -> Z + Send + Sync + 'static,
    {
        Self::from_parts(Arc::new(apply), Arc::new(init), Arc::new(indexer))
    }

    /// Собирает сеть из уже разделяемых функций.
    pub fn from_parts(apply: ApplyFn<Z>, init: InitFn<Z>, indexer: IndexerFn<Z>) -> Self {
        Self { apply, init, indexer }
    }

    pub fn apply(&self, params: &Params, inputs: &ArrayD<f32>, index: &Z) -> Result<Output> {
        (self.apply)(params, inputs, index)
    }

    pub fn init(&self, key: RngKey, inputs: &ArrayD<f32>, index: &Z) -> Result<Params> {
        (self.init)(key, inputs, index)
    }

    /// Сэмплирует эпистемический индекс.
    pub fn indexer(&self, key: RngKey) -> Z {
        (self.indexer)(key)
    }

    pub fn apply_fn(&self) -> ApplyFn<Z> {
        Arc::clone(&self.apply)
    }

    pub fn init_fn(&self) -> InitFn<Z> {
        Arc::clone(&self.init)
    }

    pub fn indexer_fn(&self) -> IndexerFn<Z> {
        Arc::clone(&self.indexer)
    }
}

impl<Z> Clone for EpistemicNetwork<Z> {
    fn clone(&self) -> Self {
        Self::from_parts(self.apply_fn(), self.init_fn(), self.indexer_fn())
    }
}

impl<Z> fmt::Debug for EpistemicNetwork<Z> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EpistemicNetwork").finish_non_exhaustive()
    }
}

/// Эпистемическая сеть, передающая [`State`] через `init` и `apply`.
pub struct EpistemicNetworkWithState<Z = Index> {
    apply: ApplyWithStateFn<Z>,
    init: InitWithStateFn<Z>,
    indexer: IndexerFn<Z>,
}

impl<Z> EpistemicNetworkWithState<Z> {
    pub fn new<A, I, X>(apply: A, init: I, indexer: X) -> Self
    where
        A: Fn(&Params, &State, &ArrayD<f32>, &Z) -> Result<(Output, State)> + Send + Sync + 'static,
        I: Fn(RngKey, &ArrayD<f32>, &Z) -> Result<(Params, State)> + Send + Sync + 'static,
        X: Fn(RngKey) -> Z + Send + Sync + 'static,
    {
        Self::from_parts(Arc::new(apply), Arc::new(init), Arc::new(indexer))
    }

    pub fn from_parts(
        apply: ApplyWithStateFn<Z>,
        init: InitWithStateFn<Z>,
        indexer: IndexerFn<Z>,
    ) -> Self {
        Self { apply, init, indexer }
    }

    pub fn apply(
        &self,
        params: &Params,
        state: &State,
        inputs: &ArrayD<f32>,
        index: &Z,
    ) -> Result<(Output, State)> {
        (self.apply)(params, state, inputs, index)
    }

    pub fn init(&self, key: RngKey, inputs: &ArrayD<f32>, index: &Z) -> Result<(Params, State)> {
        (self.init)(key, inputs, index)
    }

    pub fn indexer(&self, key: RngKey) -> Z {
        (self.indexer)(key)
    }

    pub fn apply_fn(&self) -> ApplyWithStateFn<Z> {
        Arc::clone(&self.apply)
    }

    pub fn init_fn(&self) -> InitWithStateFn<Z> {
        Arc::clone(&self.init)
    }

    pub fn indexer_fn(&self) -> IndexerFn<Z> {
        Arc::clone(&self.indexer)
    }
}

impl<Z> Clone for EpistemicNetworkWithState<Z> {
    fn clone(&self) -> Self {
        Self::from_parts(self.apply_fn(), self.init_fn(), self.indexer_fn())
    }
}

impl<Z> fmt::Debug for EpistemicNetworkWithState<Z> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EpistemicNetworkWithState").finish_non_exhaustive()
    }
}
