// src/codes.rs
//! Распознавание отсканированных строк
//!
//! Два унаследованных формата QR-кода ячейки:
//!   1. JSON-объект {warehouse_id, block_number, shelf_number, cell_number}
//!      (числа могут приходить строками)
//!   2. Строка "warehouse_id:block:shelf:cell", ровно четыре поля
//!
//! Номер груза извлекается нестрогим шаблоном (?:TEMP-)?\d+ — это намеренно
//! «лучшее из возможного», не строгий парсер. Любой мусор на входе даёт
//! None/исходную строку, паники на этой границе нет.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

lazy_static! {
    static ref CARGO_NUMBER: Regex = Regex::new(r"(?:TEMP-)?\d+").unwrap();
}

// ==================== CELL CODE ====================

/// Разобранный QR-код ячейки
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CellCode {
    pub warehouse_id: String,
    pub block_number: u32,
    pub shelf_number: u32,
    pub cell_number: u32,
}

impl CellCode {
    /// Каноническая строковая форма (та же, что печатается на этикетках)
    pub fn to_wire(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.warehouse_id, self.block_number, self.shelf_number, self.cell_number
        )
    }
}

// ==================== CARGO NUMBER ====================

/// Вытащить номер груза из произвольного отсканированного текста.
/// Нет совпадения — вернуть текст без изменений.
pub fn extract_cargo_number(raw: &str) -> String {
    match CARGO_NUMBER.find(raw) {
        Some(m) => m.as_str().to_string(),
        None => raw.to_string(),
    }
}

// ==================== CELL QR ====================

/// Разобрать QR-код ячейки в любом из двух форматов.
/// Любая другая форма — None («код не распознан», оператору предлагают повтор).
pub fn parse_cell_code(raw: &str) -> Option<CellCode> {
    parse_json_form(raw).or_else(|| parse_colon_form(raw))
}

fn parse_json_form(raw: &str) -> Option<CellCode> {
    let value: Value = serde_json::from_str(raw.trim()).ok()?;
    let obj = value.as_object()?;
    Some(CellCode {
        warehouse_id: coerce_string(obj.get("warehouse_id")?)?,
        block_number: coerce_u32(obj.get("block_number")?)?,
        shelf_number: coerce_u32(obj.get("shelf_number")?)?,
        cell_number: coerce_u32(obj.get("cell_number")?)?,
    })
}

fn parse_colon_form(raw: &str) -> Option<CellCode> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    if parts.len() != 4 || parts[0].is_empty() {
        return None;
    }
    Some(CellCode {
        warehouse_id: parts[0].to_string(),
        block_number: parse_positive(parts[1])?,
        shelf_number: parse_positive(parts[2])?,
        cell_number: parse_positive(parts[3])?,
    })
}

// Числа в JSON-форме исторически приходят и числом, и строкой
fn coerce_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            let n = n.as_u64()?;
            if n >= 1 && n <= u32::MAX as u64 {
                Some(n as u32)
            } else {
                None
            }
        }
        Value::String(s) => parse_positive(s),
        _ => None,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_positive(s: &str) -> Option<u32> {
    match s.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}

// ==================== CLASSIFIER ====================

/// Классификация произвольного скана для локальной маршрутизации.
/// Исчерпывающее сопоставление вместо последовательного перебора строк;
/// бэкенд (/api/qr/scan) остаётся финальным арбитром типа.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannedCode {
    Cell(CellCode),
    Cargo(String),
    Unrecognized(String),
}

pub fn classify(raw: &str) -> ScannedCode {
    if let Some(code) = parse_cell_code(raw) {
        return ScannedCode::Cell(code);
    }
    if let Some(m) = CARGO_NUMBER.find(raw) {
        return ScannedCode::Cargo(m.as_str().to_string());
    }
    ScannedCode::Unrecognized(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_temp_number() {
        assert_eq!(extract_cargo_number("TEMP-123456"), "TEMP-123456");
    }

    #[test]
    fn test_extract_numeric() {
        assert_eq!(extract_cargo_number("2501999271"), "2501999271");
    }

    #[test]
    fn test_extract_embedded() {
        assert_eq!(extract_cargo_number("cargo TEMP-42 ready"), "TEMP-42");
    }

    #[test]
    fn test_extract_no_digits_returns_raw() {
        assert_eq!(extract_cargo_number("no-digits-here"), "no-digits-here");
    }

    #[test]
    fn test_parse_colon_round_trip() {
        let code = parse_cell_code("W1:2:3:4").unwrap();
        assert_eq!(
            code,
            CellCode {
                warehouse_id: "W1".to_string(),
                block_number: 2,
                shelf_number: 3,
                cell_number: 4,
            }
        );
        assert_eq!(code.to_wire(), "W1:2:3:4");
        assert_eq!(parse_cell_code(&code.to_wire()).unwrap(), code);
    }

    #[test]
    fn test_parse_colon_wrong_arity() {
        assert!(parse_cell_code("W1:2:3").is_none());
        assert!(parse_cell_code("W1:2:3:4:5").is_none());
        assert!(parse_cell_code(":2:3:4").is_none());
        assert!(parse_cell_code("W1:0:3:4").is_none());
        assert!(parse_cell_code("W1:x:3:4").is_none());
    }

    #[test]
    fn test_parse_json_form() {
        let code = parse_cell_code(
            r#"{"warehouse_id": "WH1", "block_number": 1, "shelf_number": 2, "cell_number": 5}"#,
        )
        .unwrap();
        assert_eq!(code.warehouse_id, "WH1");
        assert_eq!(code.cell_number, 5);
    }

    #[test]
    fn test_parse_json_string_numbers() {
        let code = parse_cell_code(
            r#"{"warehouse_id": "WH1", "block_number": "1", "shelf_number": "2", "cell_number": "5"}"#,
        )
        .unwrap();
        assert_eq!(code.block_number, 1);
        assert_eq!(code.shelf_number, 2);
        assert_eq!(code.cell_number, 5);
    }

    #[test]
    fn test_parse_malformed_json_is_none() {
        assert!(parse_cell_code(r#"{"warehouse_id": "WH1"}"#).is_none());
        assert!(parse_cell_code(r#"{"warehouse_id": "WH1", "block_number": {}}"#).is_none());
        assert!(parse_cell_code("{broken json").is_none());
        assert!(parse_cell_code("[1,2,3,4]").is_none());
    }

    #[test]
    fn test_classify_exhaustive() {
        assert!(matches!(classify("WH1:1:2:5"), ScannedCode::Cell(_)));
        assert!(matches!(classify("TEMP-000123"), ScannedCode::Cargo(n) if n == "TEMP-000123"));
        assert!(matches!(
            classify("no-digits-here"),
            ScannedCode::Unrecognized(_)
        ));
    }
}
