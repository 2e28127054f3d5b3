//! adjiolib — библиотека нормализации выписок корректировок (выровненный текст → CSV)

pub mod error;
pub mod model;
pub mod traits;

pub mod formats {
    pub mod csv;
    pub mod report;
}
