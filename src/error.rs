//! Ошибки внешних поверхностей генератора
//!
//! Сам конвейер генерации не падает: вырожденные элементы пропускаются.
//! Ошибки возникают только при загрузке конфигурации, сохранении результатов
//! и явной проверке инвариантов карты.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapgenError {
    #[error("не удалось прочитать или записать {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("некорректный TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("некорректный JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ошибка изображения: {0}")]
    Image(#[from] image::ImageError),

    #[error("нарушен инвариант карты: {0}")]
    Invariant(String),
}
