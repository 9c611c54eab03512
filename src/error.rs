// --- Файл: src/error.rs ---

//! Ошибки, общие для всего крейта.

use thiserror::Error;

/// Ошибки построения и выполнения эпистемических сетей и конвейера данных.
#[derive(Error, Debug)]
pub enum EnnError {
    #[error("Отсутствует значение для параметра '{0}'. Вызовите init перед apply с теми же входами.")]
    MissingParameter(String),

    #[error("Отсутствует значение для состояния '{0}'. Передайте состояние, полученное из init.")]
    MissingState(String),

    #[error("Состояние '{0}' запрошено в сети без состояния. Используйте transform_with_state.")]
    StateUnavailable(String),

    #[error("Несоответствие формы для '{name}': ожидалась {expected:?}, получена {actual:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Поле '{field}' содержит {actual} примеров, ожидалось {expected}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Датасет пуст")]
    EmptyDataset,

    #[error("Неверный размер батча: {0}")]
    InvalidBatchSize(usize),

    #[error("Ошибка формы тензора: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Ошибка JSON: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EnnError>;
