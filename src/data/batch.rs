// --- Файл: src/data/batch.rs ---

//! Батч данных и приведение его к каноническому виду.

use ndarray::{ArrayD, Axis, IxDyn};
use std::collections::HashMap;
use tracing::trace;

/// Батч данных: выровненные по первой оси массивы примеров.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Входы формы [N, ...]
    pub x: ArrayD<f32>,
    /// Цели формы [N] или [N, ...]
    pub y: ArrayD<f32>,
    /// Идентификаторы примеров
    pub data_index: Option<ArrayD<i64>>,
    /// Веса примеров
    pub weights: Option<ArrayD<f32>>,
    /// Дополнительные поля, по одной строке на пример
    pub extra: HashMap<String, ArrayD<f32>>,
}

impl Batch {
    /// Создает батч только из входов и целей.
    pub fn new(x: ArrayD<f32>, y: ArrayD<f32>) -> Self {
        Self {
            x,
            y,
            data_index: None,
            weights: None,
            extra: HashMap::new(),
        }
    }

    /// Устанавливает идентификаторы примеров.
    pub fn with_data_index(mut self, data_index: ArrayD<i64>) -> Self {
        self.data_index = Some(data_index);
        self
    }

    /// Устанавливает веса примеров.
    pub fn with_weights(mut self, weights: ArrayD<f32>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Добавляет дополнительное поле.
    pub fn with_extra(mut self, name: &str, value: ArrayD<f32>) -> Self {
        self.extra.insert(name.to_string(), value);
        self
    }

    /// Количество примеров (длина первой оси `y`).
    pub fn len(&self) -> usize {
        self.y.shape().first().copied().unwrap_or(0)
    }

    /// Проверяет, пуст ли батч.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Приводит батч к каноническому виду.
///
/// - одномерные `y` превращаются в столбец [N, 1];
/// - отсутствующий `data_index` заполняется числами 0..N формы [N, 1];
/// - отсутствующие `weights` заполняются единицами формы [N, 1].
///
/// Повторный вызов ничего не меняет.
pub fn clean_batch_data(mut data: Batch) -> Batch {
    if data.y.ndim() == 1 {
        data.y = data.y.insert_axis(Axis(1));
    }

    let n = data.len();

    if data.data_index.is_none() {
        trace!(n, "synthesizing data_index");
        let index = ArrayD::from_shape_fn(IxDyn(&[n, 1]), |idx| idx[0] as i64);
        data.data_index = Some(index);
    }

    if data.weights.is_none() {
        trace!(n, "synthesizing uniform weights");
        data.weights = Some(ArrayD::ones(IxDyn(&[n, 1])));
    }

    data
}
