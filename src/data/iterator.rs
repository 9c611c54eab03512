// --- Файл: src/data/iterator.rs ---

//! Бесконечный итератор мини-батчей для SGD.

use super::batch::Batch;
use super::dataset::CachedDataset;
use super::sampler::{BatchSampler, ShuffleBufferSampler};
use crate::error::{EnnError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Буфер перемешивания по умолчанию вмещает столько батчей.
pub const DEFAULT_SHUFFLE_BUFFER_MULTIPLIER: usize = 50;

/// Настройки итератора батчей.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchIteratorConfig {
    /// Размер мини-батча; `None` - весь датасет.
    pub batch_size: Option<usize>,
    /// Seed перемешивания.
    pub seed: u64,
    /// Буфер перемешивания = min(n, multiplier * batch_size).
    pub shuffle_buffer_multiplier: usize,
}

impl Default for BatchIteratorConfig {
    fn default() -> Self {
        Self {
            batch_size: None,
            seed: 0,
            shuffle_buffer_multiplier: DEFAULT_SHUFFLE_BUFFER_MULTIPLIER,
        }
    }
}

impl BatchIteratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Загружает настройки из JSON; отсутствующие поля берутся по умолчанию.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn shuffle_buffer_multiplier(mut self, multiplier: usize) -> Self {
        self.shuffle_buffer_multiplier = multiplier;
        self
    }

    /// Строит итератор по данным.
    pub fn build(&self, data: Batch) -> Result<BatchIterator> {
        let dataset = CachedDataset::new(data)?;
        let n_data = dataset.len();

        let batch_size = self.batch_size.unwrap_or(n_data);
        if batch_size == 0 {
            return Err(EnnError::InvalidBatchSize(batch_size));
        }
        let buffer_size = n_data.min(self.shuffle_buffer_multiplier.saturating_mul(batch_size)).max(1);

        debug!(n_data, batch_size, buffer_size, seed = self.seed, "building batch iterator");

        let sampler = ShuffleBufferSampler::new(n_data, buffer_size, self.seed);
        Ok(BatchIterator {
            dataset,
            batch_sampler: BatchSampler::new(sampler, batch_size),
        })
    }
}

/// Бесконечный поток перемешанных мини-батчей фиксированного размера.
///
/// Никогда не возвращает `None`: после исчерпания эпохи данные
/// перемешиваются заново, а батчи могут пересекать границу эпох.
pub struct BatchIterator {
    dataset: CachedDataset,
    batch_sampler: BatchSampler<ShuffleBufferSampler>,
}

impl BatchIterator {
    /// Размер батча.
    pub fn batch_size(&self) -> usize {
        self.batch_sampler.batch_size()
    }

    /// Количество примеров в датасете.
    pub fn num_examples(&self) -> usize {
        self.dataset.len()
    }

    /// Начинает поток заново с первой эпохи.
    pub fn reset(&mut self) {
        self.batch_sampler.reset();
    }
}

impl Iterator for BatchIterator {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        let indices = self.batch_sampler.next()?;
        Some(self.dataset.select(&indices))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

/// Превращает игрушечные данные в бесконечный итератор батчей.
///
/// `batch_size = None` означает батч из всего датасета.
pub fn make_batch_iterator(data: Batch, batch_size: Option<usize>, seed: u64) -> Result<BatchIterator> {
    let mut config = BatchIteratorConfig::new().seed(seed);
    config.batch_size = batch_size;
    config.build(data)
}
