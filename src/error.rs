// src/error.rs
//! Ошибки клиентского ядра размещения
//!
//! Все операции ядра возвращают PlacementResult; паника на вводе оператора
//! или ответе бэкенда недопустима.

use crate::scanner::CameraFailure;
use std::fmt;

#[derive(Debug)]
pub enum PlacementError {
    BadRequest(String),
    NotFound(String),
    ValidationError(String),
    /// Камера недоступна: запуск сканирования прерван, движок остаётся в idle
    Camera(CameraFailure),
    /// Ячейка уже занята (локальная проверка или отказ бэкенда)
    CellOccupied { cargo_number: Option<String> },
    /// Координата вне структуры склада — отклоняется до запроса к бэкенду
    CellOutOfRange(String),
    /// Не-2xx ответ бэкенда; message — текст сервера, показывается оператору как есть
    Backend { status: u16, message: String },
    Network(reqwest::Error),
    Decode(String),
}

pub type PlacementResult<T> = Result<T, PlacementError>;

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlacementError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            PlacementError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            PlacementError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            PlacementError::Camera(failure) => write!(f, "Camera Error: {}", failure),
            PlacementError::CellOccupied { cargo_number } => match cargo_number {
                Some(number) => write!(f, "Cell occupied by cargo {}", number),
                None => write!(f, "Cell occupied"),
            },
            PlacementError::CellOutOfRange(msg) => write!(f, "Cell out of range: {}", msg),
            PlacementError::Backend { status, message } => {
                write!(f, "Backend Error ({}): {}", status, message)
            }
            PlacementError::Network(err) => write!(f, "Network Error: {}", err),
            PlacementError::Decode(msg) => write!(f, "Decode Error: {}", msg),
        }
    }
}

impl std::error::Error for PlacementError {}

impl From<reqwest::Error> for PlacementError {
    fn from(err: reqwest::Error) -> Self {
        PlacementError::Network(err)
    }
}

impl From<serde_json::Error> for PlacementError {
    fn from(err: serde_json::Error) -> Self {
        PlacementError::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for PlacementError {
    fn from(err: validator::ValidationErrors) -> Self {
        PlacementError::ValidationError(err.to_string())
    }
}

impl From<CameraFailure> for PlacementError {
    fn from(failure: CameraFailure) -> Self {
        PlacementError::Camera(failure)
    }
}

// Специфичные ошибки подсистемы размещения
impl PlacementError {
    pub fn cargo_not_found(number: &str) -> Self {
        PlacementError::NotFound(format!("Cargo '{}' not found", number))
    }

    pub fn warehouse_not_found(id: &str) -> Self {
        PlacementError::NotFound(format!("Warehouse '{}' not found", id))
    }

    pub fn cell_occupied(cargo_number: Option<String>) -> Self {
        PlacementError::CellOccupied { cargo_number }
    }

    pub fn unrecognized_code(raw: &str) -> Self {
        PlacementError::Decode(format!("Unrecognized code: '{}'", raw))
    }

    pub fn cell_out_of_range(block: u32, shelf: u32, cell: u32) -> Self {
        PlacementError::CellOutOfRange(format!(
            "Coordinate ({}, {}, {}) is outside the warehouse structure",
            block, shelf, cell
        ))
    }

    pub fn placement_rejected(message: &str) -> Self {
        PlacementError::BadRequest(format!("Placement rejected: {}", message))
    }

    /// Текст для оператора (склад работает на русском)
    pub fn user_message(&self) -> String {
        match self {
            PlacementError::Camera(failure) => failure.user_message(),
            PlacementError::CellOccupied { cargo_number } => match cargo_number {
                Some(number) => format!("ячейка занята грузом {}", number),
                None => "ячейка занята".to_string(),
            },
            PlacementError::CellOutOfRange(_) => {
                "Ячейка вне структуры склада, проверьте координаты".to_string()
            }
            PlacementError::Backend { message, .. } => message.clone(),
            PlacementError::Network(_) => {
                "Сервер недоступен, попробуйте ещё раз".to_string()
            }
            PlacementError::Decode(_) => {
                "Код не распознан, отсканируйте ещё раз".to_string()
            }
            PlacementError::NotFound(msg)
            | PlacementError::BadRequest(msg)
            | PlacementError::ValidationError(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupied_user_message_names_cargo() {
        let err = PlacementError::cell_occupied(Some("TEMP-000999".to_string()));
        assert_eq!(err.user_message(), "ячейка занята грузом TEMP-000999");
    }

    #[test]
    fn test_backend_message_passed_verbatim() {
        let err = PlacementError::Backend {
            status: 409,
            message: "Ячейка 1-2-5 уже занята".to_string(),
        };
        assert_eq!(err.user_message(), "Ячейка 1-2-5 уже занята");
        assert!(err.to_string().contains("409"));
    }

    #[test]
    fn test_out_of_range_display() {
        let err = PlacementError::cell_out_of_range(9, 1, 1);
        assert!(err.to_string().contains("(9, 1, 1)"));
    }
}
