// --- Файл: src/data/moons.rs ---

//! Игрушечный датасет "две луны" для классификации.

use super::batch::Batch;
use super::iterator::{make_batch_iterator, BatchIterator};
use crate::error::Result;
use ndarray::{Array1, Array2, Axis};
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Параметры генерации двух лун.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonsConfig {
    /// Общее количество точек.
    pub n_samples: usize,
    /// Стандартное отклонение гауссова шума.
    pub noise: f32,
    /// Перемешивать ли строки.
    pub shuffle: bool,
    /// Seed генератора.
    pub seed: u64,
}

impl Default for MoonsConfig {
    fn default() -> Self {
        Self {
            n_samples: 20,
            noise: 0.1,
            shuffle: true,
            seed: 0,
        }
    }
}

impl MoonsConfig {
    /// Генерирует точки и метки.
    ///
    /// Внешняя полуокружность (метка 0) содержит `n_samples / 2` точек,
    /// внутренняя, с центром в (1, 0.5), - остальные (метка 1).
    pub fn generate(&self) -> (Array2<f32>, Array1<f32>) {
        let n_outer = self.n_samples / 2;
        let n_inner = self.n_samples - n_outer;

        let mut x = Array2::<f32>::zeros((self.n_samples, 2));
        let mut y = Array1::<f32>::zeros(self.n_samples);

        for (i, t) in linspace_pi(n_outer).into_iter().enumerate() {
            x[[i, 0]] = t.cos();
            x[[i, 1]] = t.sin();
        }
        for (i, t) in linspace_pi(n_inner).into_iter().enumerate() {
            let row = n_outer + i;
            x[[row, 0]] = 1.0 - t.cos();
            x[[row, 1]] = 1.0 - t.sin() - 0.5;
            y[row] = 1.0;
        }

        let mut rng = StdRng::seed_from_u64(self.seed);

        if self.shuffle {
            let mut order: Vec<usize> = (0..self.n_samples).collect();
            order.shuffle(&mut rng);
            x = x.select(Axis(0), &order);
            y = y.select(Axis(0), &order);
        }

        if self.noise > 0.0 {
            if let Ok(normal) = Normal::new(0.0_f32, self.noise) {
                let noise = Array2::random_using(x.raw_dim(), normal, &mut rng);
                x += &noise;
            }
        }

        (x, y)
    }

    /// Генерирует точки и упаковывает их в [`Batch`] с одномерными метками.
    pub fn to_batch(&self) -> Batch {
        let (x, y) = self.generate();
        Batch::new(x.into_dyn(), y.into_dyn())
    }
}

/// `n` равномерно распределенных значений на [0, pi], включая концы.
fn linspace_pi(n: usize) -> Vec<f32> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n).map(|i| PI * i as f32 / (n - 1) as f32).collect(),
    }
}

/// Две луны в виде батча.
pub fn make_moons(n_samples: usize, noise: f32, seed: u64) -> Batch {
    MoonsConfig {
        n_samples,
        noise,
        seed,
        ..MoonsConfig::default()
    }
    .to_batch()
}

/// Простой детерминированный датасет для классификации или регрессии.
pub fn make_test_data(n_samples: usize) -> Result<BatchIterator> {
    make_batch_iterator(make_moons(n_samples, 0.1, 0), None, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moons_shapes_and_labels() {
        let (x, y) = MoonsConfig { n_samples: 21, ..MoonsConfig::default() }.generate();
        assert_eq!(x.shape(), &[21, 2]);
        assert_eq!(y.len(), 21);
        assert_eq!(y.iter().filter(|&&l| l == 0.0).count(), 10);
        assert_eq!(y.iter().filter(|&&l| l == 1.0).count(), 11);
    }

    #[test]
    fn test_moons_without_noise_lie_on_circles() {
        let config = MoonsConfig { n_samples: 30, noise: 0.0, ..MoonsConfig::default() };
        let (x, y) = config.generate();
        for (row, &label) in x.outer_iter().zip(y.iter()) {
            let (cx, cy) = if label == 0.0 { (0.0, 0.0) } else { (1.0, 0.5) };
            let r = ((row[0] - cx).powi(2) + (row[1] - cy).powi(2)).sqrt();
            assert!((r - 1.0).abs() < 1e-5, "radius {} for label {}", r, label);
        }
    }

    #[test]
    fn test_moons_deterministic() {
        assert_eq!(make_moons(40, 0.1, 0), make_moons(40, 0.1, 0));
        assert_ne!(make_moons(40, 0.1, 0), make_moons(40, 0.1, 1));
    }

    #[test]
    fn test_make_test_data_first_batch() {
        let mut iter = make_test_data(20).unwrap();
        let batch = iter.next().unwrap();
        assert_eq!(batch.x.shape(), &[20, 2]);
        assert_eq!(batch.y.shape(), &[20, 1]);
    }
}
