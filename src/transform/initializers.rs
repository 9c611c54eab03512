// --- Файл: src/transform/initializers.rs ---

//! Модуль с инициализаторами параметров.

use ndarray::{ArrayD, IxDyn};
use ndarray_rand::rand_distr::{StandardNormal, Uniform};
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Стандартное отклонение единичной нормали, усеченной до [-2, 2].
const TRUNCATED_NORMAL_STDDEV: f32 = 0.879_625_66;

/// Способ создания нового значения параметра или состояния.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Initializer {
    Zeros,
    Ones,
    Constant(f32),
    Uniform { low: f32, high: f32 },
    /// Нормаль с заданным stddev; значения дальше двух сигм перевыбираются.
    TruncatedNormal { stddev: f32 },
    /// Усеченная нормаль с дисперсией `scale / fan_in`.
    VarianceScaling { scale: f32 },
}

impl Default for Initializer {
    fn default() -> Self {
        Initializer::VarianceScaling { scale: 1.0 }
    }
}

impl Initializer {
    /// Создает массив заданной формы.
    pub fn init<R: Rng>(&self, shape: &[usize], rng: &mut R) -> ArrayD<f32> {
        let dim = IxDyn(shape);
        match *self {
            Initializer::Zeros => ArrayD::zeros(dim),
            Initializer::Ones => ArrayD::ones(dim),
            Initializer::Constant(value) => ArrayD::from_elem(dim, value),
            Initializer::Uniform { low, high } => {
                if low < high {
                    ArrayD::random_using(dim, Uniform::new(low, high), rng)
                } else {
                    ArrayD::from_elem(dim, low)
                }
            }
            Initializer::TruncatedNormal { stddev } => truncated_normal(dim, stddev, rng),
            Initializer::VarianceScaling { scale } => {
                // Для формы [in, out] fan_in = in; для вектора bias берется его длина.
                let fan_in = match shape.split_last() {
                    Some((_, rest)) if !rest.is_empty() => rest.iter().product::<usize>(),
                    Some((&last, _)) => last,
                    None => 1,
                }
                .max(1);
                let stddev = (scale / fan_in as f32).sqrt() / TRUNCATED_NORMAL_STDDEV;
                truncated_normal(dim, stddev, rng)
            }
        }
    }
}

fn truncated_normal<R: Rng>(dim: IxDyn, stddev: f32, rng: &mut R) -> ArrayD<f32> {
    ArrayD::from_shape_simple_fn(dim, || loop {
        let z: f32 = rng.sample(StandardNormal);
        if z.abs() <= 2.0 {
            break z * stddev;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_constant_initializers() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(Initializer::Zeros.init(&[2, 3], &mut rng).iter().all(|&v| v == 0.0));
        assert!(Initializer::Ones.init(&[4], &mut rng).iter().all(|&v| v == 1.0));
        let c = Initializer::Constant(2.5).init(&[], &mut rng);
        assert_eq!(c.ndim(), 0);
        assert_eq!(c.iter().next().copied(), Some(2.5));
    }

    #[test]
    fn test_truncated_normal_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let values = Initializer::TruncatedNormal { stddev: 0.5 }.init(&[1000], &mut rng);
        assert!(values.iter().all(|v| v.abs() <= 1.0));
        assert!(values.iter().any(|&v| v != 0.0));
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let values = Initializer::Uniform { low: -0.1, high: 0.1 }.init(&[50, 4], &mut rng);
        assert_eq!(values.shape(), &[50, 4]);
        assert!(values.iter().all(|&v| (-0.1..0.1).contains(&v)));
    }
}
