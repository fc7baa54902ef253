// src/models/scan.rs
//! Результаты распознавания сканов (POST /api/qr/scan) и этикетки ячеек
//! ScanResolution — временный объект одной попытки размещения, никуда не сохраняется

use super::cargo::CargoSummary;
use crate::error::{PlacementError, PlacementResult};
use base64::Engine;
use serde::{Deserialize, Serialize};

// ==================== SCAN RESOLUTION ====================

/// Занятость ячейки по данным скана её QR-кода
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CellOccupancy {
    pub warehouse_id: String,
    pub block_number: u32,
    pub shelf_number: u32,
    pub cell_number: u32,
    pub is_occupied: bool,
    #[serde(default)]
    pub cargo_number: Option<String>,
}

/// Ответ бэкенда на произвольную отсканированную строку
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanResolution {
    Cargo {
        #[serde(flatten)]
        cargo: CargoSummary,
    },
    WarehouseCell {
        #[serde(flatten)]
        cell: CellOccupancy,
    },
}

// ==================== CELL LABEL ====================

/// Печатная этикетка ячейки: QR-код приходит data-URL-ом
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CellLabel {
    pub success: bool,
    pub qr_code: String,
}

impl CellLabel {
    /// PNG-байты из data URL для передачи на печать
    pub fn png_bytes(&self) -> PlacementResult<Vec<u8>> {
        let encoded = self
            .qr_code
            .strip_prefix("data:image/png;base64,")
            .ok_or_else(|| {
                PlacementError::Decode("Cell label is not a PNG data URL".to_string())
            })?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| PlacementError::Decode(format!("Invalid label payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cargo::ProcessingStatus;

    #[test]
    fn test_scan_resolution_cargo() {
        let json = r#"{
            "type": "cargo",
            "id": "c-1",
            "cargo_number": "TEMP-000123",
            "processing_status": "paid"
        }"#;
        let resolved: ScanResolution = serde_json::from_str(json).unwrap();
        match resolved {
            ScanResolution::Cargo { cargo } => {
                assert_eq!(cargo.cargo_number, "TEMP-000123");
                assert_eq!(cargo.processing_status, ProcessingStatus::Paid);
            }
            other => panic!("expected cargo, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_resolution_cell() {
        let json = r#"{
            "type": "warehouse_cell",
            "warehouse_id": "WH1",
            "block_number": 1,
            "shelf_number": 2,
            "cell_number": 5,
            "is_occupied": true,
            "cargo_number": "TEMP-000999"
        }"#;
        let resolved: ScanResolution = serde_json::from_str(json).unwrap();
        match resolved {
            ScanResolution::WarehouseCell { cell } => {
                assert!(cell.is_occupied);
                assert_eq!(cell.cargo_number.as_deref(), Some("TEMP-000999"));
            }
            other => panic!("expected cell, got {:?}", other),
        }
    }

    #[test]
    fn test_label_png_bytes() {
        let label = CellLabel {
            success: true,
            qr_code: "data:image/png;base64,iVBORw0KGgo=".to_string(),
        };
        let bytes = label.png_bytes().unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn test_label_rejects_non_data_url() {
        let label = CellLabel {
            success: true,
            qr_code: "https://example.com/qr.png".to_string(),
        };
        assert!(label.png_bytes().is_err());
    }
}
