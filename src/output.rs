// --- Файл: src/output.rs ---

//! Модуль, определяющий выходы эпистемических сетей.
//!
//! Прямой проход возвращает либо массив предсказаний, либо выход с отдельной
//! фиксированной prior-компонентой. Если нужны только предсказания,
//! используйте [`parse_net_output`].

use ndarray::ArrayD;
use std::collections::HashMap;

/// Выход с аддитивной prior-компонентой.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputWithPrior {
    /// Обучаемая часть предсказания.
    pub train: ArrayD<f32>,
    /// Фиксированная prior-часть предсказания.
    pub prior: ArrayD<f32>,
    /// Дополнительные именованные выходы.
    pub extra: HashMap<String, ArrayD<f32>>,
}

impl OutputWithPrior {
    /// Создает выход из обучаемой и prior-частей без дополнительных выходов.
    pub fn new(train: ArrayD<f32>, prior: ArrayD<f32>) -> Self {
        Self {
            train,
            prior,
            extra: HashMap::new(),
        }
    }

    /// Выход с нулевым prior.
    pub fn without_prior(train: ArrayD<f32>) -> Self {
        let prior = ArrayD::zeros(train.raw_dim());
        Self::new(train, prior)
    }

    /// Добавляет именованный дополнительный выход.
    pub fn with_extra(mut self, name: &str, value: ArrayD<f32>) -> Self {
        self.extra.insert(name.to_string(), value);
        self
    }

    /// Предсказания: `train + prior`.
    pub fn preds(&self) -> ArrayD<f32> {
        &self.train + &self.prior
    }
}

/// Значение, возвращаемое `apply` сети.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Массив предсказаний.
    Array(ArrayD<f32>),
    /// Предсказание, разделенное на обучаемую и prior-части.
    WithPrior(OutputWithPrior),
}

impl Output {
    /// Забирает выход и возвращает массив предсказаний.
    pub fn into_preds(self) -> ArrayD<f32> {
        match self {
            Output::Array(preds) => preds,
            Output::WithPrior(out) => out.preds(),
        }
    }

    /// Форма предсказаний.
    pub fn shape(&self) -> &[usize] {
        match self {
            Output::Array(preds) => preds.shape(),
            Output::WithPrior(out) => out.train.shape(),
        }
    }
}

impl From<ArrayD<f32>> for Output {
    fn from(preds: ArrayD<f32>) -> Self {
        Output::Array(preds)
    }
}

impl From<OutputWithPrior> for Output {
    fn from(out: OutputWithPrior) -> Self {
        Output::WithPrior(out)
    }
}

/// Извлекает массив предсказаний из выхода сети.
pub fn parse_net_output(net_out: &Output) -> ArrayD<f32> {
    match net_out {
        Output::Array(preds) => preds.clone(),
        Output::WithPrior(out) => out.preds(),
    }
}
