// src/models/cargo.rs
//! Груз с точки зрения размещения: номер, статус обработки, координаты на складе
//! Полная карточка груза (отправитель, маршрут, оплата) живёт на бэкенде

use super::warehouse::CellAddress;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ==================== PROCESSING STATUS ====================

/// Статус обработки груза (этап оплаты/оформления, не транспортный статус)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProcessingStatus {
    PaymentPending,
    Paid,
    InvoicePrinted,
    Placed,
    Shipped,
    Delivered,
}

impl ProcessingStatus {
    /// Груз допускается к размещению после оплаты или печати накладной
    pub fn is_placement_eligible(&self) -> bool {
        matches!(self, ProcessingStatus::Paid | ProcessingStatus::InvoicePrinted)
    }

    pub fn display_name_ru(&self) -> &'static str {
        match self {
            ProcessingStatus::PaymentPending => "Ожидает оплаты",
            ProcessingStatus::Paid => "Оплачен",
            ProcessingStatus::InvoicePrinted => "Накладная напечатана",
            ProcessingStatus::Placed => "Размещён",
            ProcessingStatus::Shipped => "Отправлен",
            ProcessingStatus::Delivered => "Доставлен",
        }
    }
}

// ==================== CARGO ====================

/// Позиция груза на складе; заполняется один раз при размещении,
/// груз с заполненной позицией принадлежит ровно одной ячейке
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CargoLocation {
    pub warehouse_id: String,
    pub block_number: u32,
    pub shelf_number: u32,
    pub cell_number: u32,
}

impl CargoLocation {
    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.block_number, self.shelf_number, self.cell_number)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CargoSummary {
    pub id: String,
    pub cargo_number: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub declared_value: Option<f64>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub warehouse_location: Option<CargoLocation>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CargoSummary {
    pub fn is_placed(&self) -> bool {
        self.warehouse_location.is_some()
    }
}

// ==================== TEMP NUMBERS ====================

/// Временный номер для груза, принятого без этикетки (TEMP-XXXXXX)
pub fn temp_cargo_number() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("TEMP-{:06}", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_eligibility() {
        assert!(!ProcessingStatus::PaymentPending.is_placement_eligible());
        assert!(ProcessingStatus::Paid.is_placement_eligible());
        assert!(ProcessingStatus::InvoicePrinted.is_placement_eligible());
        assert!(!ProcessingStatus::Placed.is_placement_eligible());
    }

    #[test]
    fn test_status_serde_snake_case() {
        let status: ProcessingStatus = serde_json::from_str("\"invoice_printed\"").unwrap();
        assert_eq!(status, ProcessingStatus::InvoicePrinted);
        assert_eq!(status.to_string(), "invoice_printed");
    }

    #[test]
    fn test_temp_number_shape() {
        let number = temp_cargo_number();
        assert!(number.starts_with("TEMP-"));
        assert_eq!(number.len(), "TEMP-".len() + 6);
        assert!(number["TEMP-".len()..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_location_address() {
        let location = CargoLocation {
            warehouse_id: "WH1".to_string(),
            block_number: 1,
            shelf_number: 2,
            cell_number: 5,
        };
        assert_eq!(location.address().to_string(), "1-2-5");
    }
}
