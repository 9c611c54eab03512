// --- Файл: src/data/transforms.rs ---

//! Стандартизация признаков по статистикам обучающей выборки.

use crate::error::{EnnError, Result};
use ndarray::{ArrayD, Axis};

/// Малая константа в знаменателе: признаки с нулевым разбросом
/// не приводят к делению на ноль.
pub const STD_EPS: f32 = 1e-9;

/// Стандартизация: `(x - mean) / (std + 1e-9)`.
///
/// Статистики считаются по первой (batch) оси один раз в [`Standardizer::fit`]
/// и далее не меняются.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    mean: ArrayD<f32>,
    std: ArrayD<f32>,
}

impl Standardizer {
    /// Создает стандартизацию с заданными параметрами.
    pub fn new(mean: ArrayD<f32>, std: ArrayD<f32>) -> Self {
        Self { mean, std }
    }

    /// Вычисляет поэлементные mean и std (без поправки Бесселя) по оси 0.
    ///
    /// # Паника
    ///
    /// Паникует, если у `data` нет batch-оси или она пуста.
    pub fn fit(data: &ArrayD<f32>) -> Self {
        assert!(data.ndim() > 1, "data must include a batch dimension");
        let mean = data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| panic!("cannot fit statistics on an empty batch"));
        let std = data.std_axis(Axis(0), 0.0);
        Self { mean, std }
    }

    /// Среднее по признакам.
    pub fn mean(&self) -> &ArrayD<f32> {
        &self.mean
    }

    /// Стандартное отклонение по признакам.
    pub fn std(&self) -> &ArrayD<f32> {
        &self.std
    }

    /// Применяет стандартизацию; `mean` и `std` транслируются по batch-оси.
    ///
    /// Форма признаков `x` (все оси, кроме первой) должна совпадать с формой
    /// статистик, иначе возвращается [`EnnError::ShapeMismatch`].
    pub fn transform(&self, x: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        let features = x.shape().get(1..).unwrap_or_default();
        if x.ndim() != self.mean.ndim() + 1 || features != self.mean.shape() {
            return Err(EnnError::ShapeMismatch {
                name: "inputs".to_string(),
                expected: self.mean.shape().to_vec(),
                actual: features.to_vec(),
            });
        }
        Ok((x - &self.mean) / &self.std.mapv(|s| s + STD_EPS))
    }
}
