// --- Файл: src/indexers.rs ---

//! Модуль с эпистемическими индексерами и их батчевой версией.

use crate::base::Index;
use crate::rng::RngKey;
use ndarray::{ArrayD, ArrayView, Axis, IxDyn};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::Rng;

/// Индексы, которые можно сложить в одно батчевое значение.
pub trait StackIndex: Sized {
    type Stacked;

    fn stack(items: Vec<Self>) -> Self::Stacked;
}

impl StackIndex for ArrayD<f32> {
    type Stacked = ArrayD<f32>;

    /// Складывает индексы вдоль новой первой оси.
    ///
    /// # Паника
    ///
    /// Паникует, если формы индексов различаются.
    fn stack(items: Vec<Self>) -> Self::Stacked {
        let Some(first) = items.first() else {
            return ArrayD::zeros(IxDyn(&[0]));
        };
        let views: Vec<ArrayView<f32, IxDyn>> = items.iter().map(|item| item.view()).collect();
        match ndarray::stack(Axis(0), &views) {
            Ok(stacked) => stacked,
            Err(err) => panic!(
                "indexer produced inconsistent shapes (first {:?}): {}",
                first.shape(),
                err
            ),
        }
    }
}

impl StackIndex for RngKey {
    type Stacked = Vec<RngKey>;

    fn stack(items: Vec<Self>) -> Self::Stacked {
        items
    }
}

/// Превращает индексер одного образца в индексер батча из `batch_size` образцов.
///
/// Дочерние ключи - `key.fold_in(i)` для `i` в `0..batch_size`, поэтому
/// один и тот же ключ всегда дает один и тот же батч.
pub fn make_batch_indexer<Z, X>(
    indexer: X,
    batch_size: usize,
) -> impl Fn(RngKey) -> Z::Stacked + Send + Sync + 'static
where
    Z: StackIndex + 'static,
    X: Fn(RngKey) -> Z + Send + Sync + 'static,
{
    move |key: RngKey| {
        let samples = (0..batch_size as u64).map(|i| indexer(key.fold_in(i))).collect();
        Z::stack(samples)
    }
}

/// Стандартный нормальный индекс размерности `index_dim`.
pub fn gaussian_indexer(index_dim: usize) -> impl Fn(RngKey) -> Index + Send + Sync + 'static {
    scaled_gaussian_indexer(index_dim, 1.0)
}

/// Нормальный индекс размерности `index_dim` со стандартным отклонением `index_scale`.
pub fn scaled_gaussian_indexer(
    index_dim: usize,
    index_scale: f32,
) -> impl Fn(RngKey) -> Index + Send + Sync + 'static {
    move |key: RngKey| {
        let mut rng = key.rng();
        ArrayD::<f32>::random_using(IxDyn(&[index_dim]), StandardNormal, &mut rng) * index_scale
    }
}

/// Равномерный целый индекс в `0..num_ensemble` (скалярный массив).
pub fn ensemble_indexer(num_ensemble: usize) -> impl Fn(RngKey) -> Index + Send + Sync + 'static {
    assert!(num_ensemble > 0, "ensemble must have at least one member");
    move |key: RngKey| {
        let member = key.rng().gen_range(0..num_ensemble);
        ArrayD::from_elem(IxDyn(&[]), member as f32)
    }
}

/// Индексом служит сам ключ.
pub fn prng_indexer() -> impl Fn(RngKey) -> RngKey + Send + Sync + 'static {
    |key: RngKey| key
}

/// Индексер, возвращающий фиксированный индекс при любом ключе.
pub fn constant_indexer<Z>(index: Z) -> impl Fn(RngKey) -> Z + Send + Sync + 'static
where
    Z: Clone + Send + Sync + 'static,
{
    move |_key: RngKey| index.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_indexer_shape_and_determinism() {
        let batch = make_batch_indexer(gaussian_indexer(3), 8);
        let key = RngKey::new(11);

        let a = batch(key);
        let b = batch(key);
        assert_eq!(a.shape(), &[8, 3]);
        assert_eq!(a, b);
        assert_ne!(a, batch(RngKey::new(12)));
    }

    #[test]
    fn test_batch_rows_are_independent() {
        let batch = make_batch_indexer(gaussian_indexer(4), 2);
        let z = batch(RngKey::new(0));
        assert_ne!(z.index_axis(Axis(0), 0), z.index_axis(Axis(0), 1));
    }

    #[test]
    fn test_batch_of_scalars() {
        let batch = make_batch_indexer(ensemble_indexer(5), 100);
        let z = batch(RngKey::new(3));
        assert_eq!(z.shape(), &[100]);
        assert!(z.iter().all(|&m| (0.0..5.0).contains(&m) && m.fract() == 0.0));
    }

    #[test]
    fn test_batch_of_keys() {
        let batch = make_batch_indexer(prng_indexer(), 4);
        let key = RngKey::new(1);
        assert_eq!(batch(key), key.split(4));
    }

    #[test]
    fn test_empty_batch() {
        let batch = make_batch_indexer(gaussian_indexer(2), 0);
        assert_eq!(batch(RngKey::new(0)).len(), 0);
    }

    #[test]
    fn test_constant_indexer() {
        let indexer = constant_indexer(ndarray::array![1.0_f32, 2.0].into_dyn());
        assert_eq!(indexer(RngKey::new(0)), indexer(RngKey::new(1)));
    }
}
