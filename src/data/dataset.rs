// --- Файл: src/data/dataset.rs ---

//! Кэшированный в памяти датасет, из которого нарезаются мини-батчи.

use super::batch::{clean_batch_data, Batch};
use crate::error::{EnnError, Result};
use ndarray::Axis;
use std::sync::Arc;

/// Датасет, хранящий все массивы батча в памяти.
///
/// Массивы приводятся к каноническому виду один раз при создании и
/// разделяются между клонами через `Arc`.
#[derive(Debug, Clone)]
pub struct CachedDataset {
    data: Arc<Batch>,
    num_samples: usize,
}

impl CachedDataset {
    /// Создает датасет из батча.
    ///
    /// Возвращает ошибку, если датасет пуст или длины полей по первой
    /// оси не совпадают.
    pub fn new(data: Batch) -> Result<Self> {
        let data = clean_batch_data(data);
        let num_samples = data.len();
        if num_samples == 0 {
            return Err(EnnError::EmptyDataset);
        }

        check_len("x", data.x.shape(), num_samples)?;
        if let Some(index) = &data.data_index {
            check_len("data_index", index.shape(), num_samples)?;
        }
        if let Some(weights) = &data.weights {
            check_len("weights", weights.shape(), num_samples)?;
        }
        for (name, value) in &data.extra {
            check_len(name, value.shape(), num_samples)?;
        }

        Ok(Self {
            data: Arc::new(data),
            num_samples,
        })
    }

    /// Возвращает количество примеров.
    pub fn len(&self) -> usize {
        self.num_samples
    }

    /// Всегда `false`: пустой датасет отклоняется в [`CachedDataset::new`].
    pub fn is_empty(&self) -> bool {
        self.num_samples == 0
    }

    /// Канонический батч со всеми примерами.
    pub fn as_batch(&self) -> &Batch {
        &self.data
    }

    /// Собирает батч из примеров с указанными индексами.
    ///
    /// # Паника
    ///
    /// Паникует, если какой-либо индекс выходит за пределы датасета.
    pub fn select(&self, indices: &[usize]) -> Batch {
        Batch {
            x: self.data.x.select(Axis(0), indices),
            y: self.data.y.select(Axis(0), indices),
            data_index: self.data.data_index.as_ref().map(|a| a.select(Axis(0), indices)),
            weights: self.data.weights.as_ref().map(|a| a.select(Axis(0), indices)),
            extra: self
                .data
                .extra
                .iter()
                .map(|(name, value)| (name.clone(), value.select(Axis(0), indices)))
                .collect(),
        }
    }
}

fn check_len(field: &str, shape: &[usize], expected: usize) -> Result<()> {
    let actual = shape.first().copied().unwrap_or(0);
    if actual == expected {
        Ok(())
    } else {
        Err(EnnError::LengthMismatch {
            field: field.to_string(),
            expected,
            actual,
        })
    }
}
