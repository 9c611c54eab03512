// --- Файл: src/transform/mod.rs ---

//! Модуль, превращающий функции, которые *запрашивают* свои параметры,
//! в пары чистых функций `init`/`apply` с явной передачей параметров.
//!
//! Прямой проход получает [`ParamScope`] и запрашивает у него именованные
//! параметры через [`ParamScope::get_parameter`]:
//!
//! - при `init` каждый параметр создается своим [`Initializer`] из генератора,
//!   засеянного ключом, и запоминается;
//! - при `apply` параметр берется из переданных [`Params`], случайные числа
//!   не используются.
//!
//! ## Пример
//!
//! ```ignore
//! use enn::transform::{transform, Initializer};
//!
//! let linear = transform(|scope, x| {
//!     let w = scope.get_parameter("w", &[2, 1], Initializer::default())?;
//!     let x = x.view().into_dimensionality::<ndarray::Ix2>()?;
//!     let w = w.view().into_dimensionality::<ndarray::Ix2>()?;
//!     Ok(x.dot(&w).into_dyn().into())
//! });
//! let params = linear.init(RngKey::new(0), &x)?;
//! let y = linear.apply(&params, &x)?;
//! ```

pub mod initializers;

pub use initializers::Initializer;

use crate::base::{Index, Params, State};
use crate::error::{EnnError, Result};
use crate::output::Output;
use crate::rng::RngKey;
use ndarray::ArrayD;
use rand::rngs::StdRng;
use std::borrow::Cow;
use std::sync::Arc;

/// Реестр параметров и состояния, передаваемый в прямой проход.
pub struct ParamScope<'a> {
    params: Cow<'a, Params>,
    /// `None` для преобразований без состояния.
    state: Option<State>,
    /// `Some` только во время инициализации.
    rng: Option<StdRng>,
    path: Vec<String>,
}

impl ParamScope<'static> {
    /// Область, создающая параметры (и состояние при `stateful`) по запросу.
    pub fn for_init(key: RngKey, stateful: bool) -> Self {
        Self {
            params: Cow::Owned(Params::new()),
            state: stateful.then(State::new),
            rng: Some(key.rng()),
            path: Vec::new(),
        }
    }
}

impl<'a> ParamScope<'a> {
    /// Область, которая только читает переданные параметры.
    ///
    /// `state` равно `None` для прямого прохода без состояния.
    pub fn for_apply(params: &'a Params, state: Option<State>) -> Self {
        Self {
            params: Cow::Borrowed(params),
            state,
            rng: None,
            path: Vec::new(),
        }
    }

    pub fn is_initializing(&self) -> bool {
        self.rng.is_some()
    }

    fn full_name(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.path.join("/"), name)
        }
    }

    /// Выполняет `f`, добавив `name` к пути параметров.
    pub fn scoped<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.path.push(name.to_string());
        let out = f(self);
        self.path.pop();
        out
    }

    /// Возвращает параметр `name`; при инициализации создает его.
    pub fn get_parameter(
        &mut self,
        name: &str,
        shape: &[usize],
        init: Initializer,
    ) -> Result<ArrayD<f32>> {
        let full = self.full_name(name);
        if let Some(value) = self.params.get(&full) {
            check_shape(&full, shape, value)?;
            return Ok(value.clone());
        }
        match self.rng.as_mut() {
            Some(rng) => {
                let value = init.init(shape, rng);
                self.params.to_mut().insert(full, value.clone());
                Ok(value)
            }
            None => Err(EnnError::MissingParameter(full)),
        }
    }

    /// Возвращает текущее значение состояния `name`; при инициализации создает его.
    pub fn get_state(
        &mut self,
        name: &str,
        shape: &[usize],
        init: Initializer,
    ) -> Result<ArrayD<f32>> {
        let full = self.full_name(name);
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| EnnError::StateUnavailable(full.clone()))?;
        if let Some(value) = state.get(&full) {
            check_shape(&full, shape, value)?;
            return Ok(value.clone());
        }
        match self.rng.as_mut() {
            Some(rng) => {
                let value = init.init(shape, rng);
                state.insert(full, value.clone());
                Ok(value)
            }
            None => Err(EnnError::MissingState(full)),
        }
    }

    /// Перезаписывает состояние `name`.
    pub fn set_state(&mut self, name: &str, value: ArrayD<f32>) -> Result<()> {
        let full = self.full_name(name);
        match self.state.as_mut() {
            Some(state) => {
                state.insert(full, value);
                Ok(())
            }
            None => Err(EnnError::StateUnavailable(full)),
        }
    }

    pub fn into_params(self) -> Params {
        self.params.into_owned()
    }

    /// Параметры и состояние, накопленные прямым проходом.
    pub fn into_parts(self) -> (Params, State) {
        (self.params.into_owned(), self.state.unwrap_or_default())
    }
}

fn check_shape(name: &str, expected: &[usize], value: &ArrayD<f32>) -> Result<()> {
    if value.shape() == expected {
        Ok(())
    } else {
        Err(EnnError::ShapeMismatch {
            name: name.to_string(),
            expected: expected.to_vec(),
            actual: value.shape().to_vec(),
        })
    }
}

/// Модуль, чей прямой проход зависит от эпистемического индекса.
///
/// Реализации не владеют параметрами, а запрашивают их у области, поэтому
/// одно определение модуля обслуживает и `init`, и `apply`.
pub trait EpistemicModule<Z = Index> {
    fn forward(&self, scope: &mut ParamScope<'_>, inputs: &ArrayD<f32>, index: &Z) -> Result<Output>;
}

impl<Z, F> EpistemicModule<Z> for F
where
    F: Fn(&mut ParamScope<'_>, &ArrayD<f32>, &Z) -> Result<Output>,
{
    fn forward(&self, scope: &mut ParamScope<'_>, inputs: &ArrayD<f32>, index: &Z) -> Result<Output> {
        self(scope, inputs, index)
    }
}

type PlainInitFn = Arc<dyn Fn(RngKey, &ArrayD<f32>) -> Result<Params> + Send + Sync>;
type PlainApplyFn = Arc<dyn Fn(&Params, &ArrayD<f32>) -> Result<Output> + Send + Sync>;

/// Пара чистых функций `init`/`apply` для `y = f(x)`.
#[derive(Clone)]
pub struct Transformed {
    init: PlainInitFn,
    apply: PlainApplyFn,
}

impl Transformed {
    pub fn new<I, A>(init: I, apply: A) -> Self
    where
        I: Fn(RngKey, &ArrayD<f32>) -> Result<Params> + Send + Sync + 'static,
        A: Fn(&Params, &ArrayD<f32>) -> Result<Output> + Send + Sync + 'static,
    {
        Self {
            init: Arc::new(init),
            apply: Arc::new(apply),
        }
    }

    pub fn init(&self, key: RngKey, inputs: &ArrayD<f32>) -> Result<Params> {
        (self.init)(key, inputs)
    }

    pub fn apply(&self, params: &Params, inputs: &ArrayD<f32>) -> Result<Output> {
        (self.apply)(params, inputs)
    }
}

/// Превращает функцию, запрашивающую параметры, в пару [`Transformed`].
pub fn transform<F>(f: F) -> Transformed
where
    F: Fn(&mut ParamScope<'_>, &ArrayD<f32>) -> Result<Output> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let init_f = Arc::clone(&f);
    Transformed::new(
        move |key, inputs| {
            let mut scope = ParamScope::for_init(key, false);
            init_f(&mut scope, inputs)?;
            Ok(scope.into_params())
        },
        move |params, inputs| {
            let mut scope = ParamScope::for_apply(params, None);
            f(&mut scope, inputs)
        },
    )
}

type PlainInitWithStateFn = Arc<dyn Fn(RngKey, &ArrayD<f32>) -> Result<(Params, State)> + Send + Sync>;
type PlainApplyWithStateFn =
    Arc<dyn Fn(&Params, &State, &ArrayD<f32>) -> Result<(Output, State)> + Send + Sync>;

/// Пара чистых функций `init`/`apply` для функции с изменяемым состоянием.
#[derive(Clone)]
pub struct TransformedWithState {
    init: PlainInitWithStateFn,
    apply: PlainApplyWithStateFn,
}

impl TransformedWithState {
    pub fn init(&self, key: RngKey, inputs: &ArrayD<f32>) -> Result<(Params, State)> {
        (self.init)(key, inputs)
    }

    pub fn apply(&self, params: &Params, state: &State, inputs: &ArrayD<f32>) -> Result<(Output, State)> {
        (self.apply)(params, state, inputs)
    }
}

/// Как [`transform`], но область также поддерживает `get_state`/`set_state`.
pub fn transform_with_state<F>(f: F) -> TransformedWithState
where
    F: Fn(&mut ParamScope<'_>, &ArrayD<f32>) -> Result<Output> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let init_f = Arc::clone(&f);
    TransformedWithState {
        init: Arc::new(move |key: RngKey, inputs: &ArrayD<f32>| -> Result<(Params, State)> {
            let mut scope = ParamScope::for_init(key, true);
            init_f(&mut scope, inputs)?;
            Ok(scope.into_parts())
        }),
        apply: Arc::new(move |params: &Params, state: &State, inputs: &ArrayD<f32>| -> Result<(Output, State)> {
            let mut scope = ParamScope::for_apply(params, Some(state.clone()));
            let out = f(&mut scope, inputs)?;
            let (_, new_state) = scope.into_parts();
            Ok((out, new_state))
        }),
    }
}
