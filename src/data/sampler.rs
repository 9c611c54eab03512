// --- Файл: src/data/sampler.rs ---

//! Стратегии сэмплирования индексов для итератора батчей.

use crate::rng::RngKey;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

/// Трейт для сэмплеров - бесконечных генераторов индексов.
///
/// Эпохи следуют одна за другой, `next` никогда не возвращает `None`.
pub trait Sampler: Iterator<Item = usize> {
    /// Возвращает количество образцов в одной эпохе.
    fn len(&self) -> usize;

    /// Проверяет, пуст ли сэмплер.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Сбрасывает сэмплер в начальное состояние.
    fn reset(&mut self);
}

/// Бесконечный сэмплер с буфером перемешивания.
///
/// Каждая эпоха пропускает индексы 0..len через буфер фиксированного
/// размера: очередной индекс выбирается из буфера случайно, а его место
/// занимает следующий входной индекс. Внутри эпохи каждый индекс
/// выдается ровно один раз; эпохи следуют друг за другом без границ,
/// и каждая перемешивается заново собственным генератором.
///
/// При `buffer_size >= len` получается равномерная перестановка эпохи.
pub struct ShuffleBufferSampler {
    len: usize,
    buffer_size: usize,
    key: RngKey,
    epoch: u64,
    rng: StdRng,
    buffer: Vec<usize>,
    /// Следующий индекс эпохи, еще не попавший в буфер.
    next_input: usize,
}

impl ShuffleBufferSampler {
    /// Создает сэмплер.
    ///
    /// # Паника
    ///
    /// Паникует, если `len` или `buffer_size` равны нулю.
    pub fn new(len: usize, buffer_size: usize, seed: u64) -> Self {
        assert!(len > 0, "ShuffleBufferSampler requires a non-empty dataset");
        assert!(buffer_size > 0, "shuffle buffer size must be positive");
        let key = RngKey::new(seed);
        let mut sampler = Self {
            len,
            buffer_size: buffer_size.min(len),
            key,
            epoch: 0,
            rng: key.rng(),
            buffer: Vec::with_capacity(buffer_size.min(len)),
            next_input: 0,
        };
        sampler.start_epoch(0);
        sampler
    }

    /// Размер буфера перемешивания.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Номер текущей эпохи, начиная с нуля.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn start_epoch(&mut self, epoch: u64) {
        trace!(epoch, "reshuffling epoch");
        self.epoch = epoch;
        self.rng = self.key.fold_in(epoch).rng();
        self.buffer.clear();
        self.buffer.extend(0..self.buffer_size);
        self.next_input = self.buffer_size;
    }
}

impl Iterator for ShuffleBufferSampler {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() {
            self.start_epoch(self.epoch + 1);
        }

        let slot = self.rng.gen_range(0..self.buffer.len());
        let idx = if self.next_input < self.len {
            let refill = self.next_input;
            self.next_input += 1;
            std::mem::replace(&mut self.buffer[slot], refill)
        } else {
            self.buffer.swap_remove(slot)
        };
        Some(idx)
    }
}

impl Sampler for ShuffleBufferSampler {
    fn len(&self) -> usize {
        self.len
    }

    fn reset(&mut self) {
        self.start_epoch(0);
    }
}

/// Батч-сэмплер - группирует индексы бесконечного сэмплера в батчи.
///
/// Батчи всегда полные и могут пересекать границу эпох.
pub struct BatchSampler<S: Sampler> {
    sampler: S,
    batch_size: usize,
}

impl<S: Sampler> BatchSampler<S> {
    /// Создает батч-сэмплер.
    ///
    /// # Аргументы
    ///
    /// * `sampler` - Внутренний сэмплер для генерации индексов
    /// * `batch_size` - Размер батча
    pub fn new(sampler: S, batch_size: usize) -> Self {
        Self { sampler, batch_size }
    }

    /// Размер батча.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Сбрасывает сэмплер.
    pub fn reset(&mut self) {
        self.sampler.reset();
    }
}

impl<S: Sampler> Iterator for BatchSampler<S> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.sampler.by_ref().take(self.batch_size).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shuffle_epochs_are_permutations() {
        for buffer_size in [1, 3, 10, 50] {
            let mut sampler = ShuffleBufferSampler::new(10, buffer_size, 42);
            for _ in 0..4 {
                let mut epoch: Vec<_> = sampler.by_ref().take(10).collect();
                epoch.sort_unstable();
                assert_eq!(epoch, (0..10).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_buffer_of_one_keeps_order() {
        let mut sampler = ShuffleBufferSampler::new(5, 1, 7);
        let indices: Vec<_> = sampler.by_ref().take(10).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_shuffle_reset_and_seed() {
        let mut sampler = ShuffleBufferSampler::new(20, 20, 3);
        let first: Vec<_> = sampler.by_ref().take(45).collect();
        sampler.reset();
        let again: Vec<_> = sampler.by_ref().take(45).collect();
        assert_eq!(first, again);

        let other: Vec<_> = ShuffleBufferSampler::new(20, 20, 4).take(45).collect();
        assert_ne!(first, other);
    }

    #[test]
    fn test_batch_sampler_spans_epochs() {
        let sampler = ShuffleBufferSampler::new(5, 1, 0);
        let mut batch_sampler = BatchSampler::new(sampler, 3);

        let batches: Vec<_> = batch_sampler.by_ref().take(3).collect();
        assert_eq!(batches[0], vec![0, 1, 2]);
        assert_eq!(batches[1], vec![3, 4, 0]); // Батч пересекает границу эпох
        assert_eq!(batches[2], vec![1, 2, 3]);
    }

    #[test]
    fn test_batch_sampler_over_infinite_stream() {
        let sampler = ShuffleBufferSampler::new(4, 4, 0);
        let mut batch_sampler = BatchSampler::new(sampler, 3);
        for _ in 0..10 {
            assert_eq!(batch_sampler.next().map(|b| b.len()), Some(3));
        }
    }
}
