// src/models/warehouse.rs
//! Пространственная модель склада: блоки → стеллажи → ячейки
//! Адресация трёхуровневая, 1-индексированная, границы заданы структурой склада
//! Инвариант: всего адресуемых ячеек = blocks_count * shelves_per_block * cells_per_shelf

use crate::error::{PlacementError, PlacementResult};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ==================== WAREHOUSE ====================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub blocks_count: u32,
    pub shelves_per_block: u32,
    pub cells_per_shelf: u32,
}

impl Warehouse {
    /// Полное число адресуемых ячеек
    pub fn total_cells(&self) -> u64 {
        self.blocks_count as u64 * self.shelves_per_block as u64 * self.cells_per_shelf as u64
    }

    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.block >= 1
            && addr.block <= self.blocks_count
            && addr.shelf >= 1
            && addr.shelf <= self.shelves_per_block
            && addr.cell >= 1
            && addr.cell <= self.cells_per_shelf
    }

    /// Проверка координаты до любого обращения к бэкенду
    pub fn validate_address(&self, addr: &CellAddress) -> PlacementResult<()> {
        if self.contains(addr) {
            Ok(())
        } else {
            Err(PlacementError::cell_out_of_range(
                addr.block, addr.shelf, addr.cell,
            ))
        }
    }

    /// Декартово произведение диапазонов блок/стеллаж/ячейка,
    /// в порядке обхода блок → стеллаж → ячейка
    pub fn cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        (1..=self.blocks_count).flat_map(move |block| {
            (1..=self.shelves_per_block).flat_map(move |shelf| {
                (1..=self.cells_per_shelf).map(move |cell| CellAddress { block, shelf, cell })
            })
        })
    }

    /// Админ-операция: добавить блок в конец
    pub fn add_block(&mut self) {
        self.blocks_count += 1;
    }

    /// Админ-операция: удалить последний блок; склад не может остаться без блоков
    pub fn remove_block(&mut self) -> PlacementResult<()> {
        if self.blocks_count <= 1 {
            return Err(PlacementError::BadRequest(
                "Warehouse must keep at least one block".to_string(),
            ));
        }
        self.blocks_count -= 1;
        Ok(())
    }
}

// ==================== CELL ADDRESS ====================

/// Адрес ячейки внутри склада (блок, стеллаж, ячейка), все компоненты ≥ 1
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub block: u32,
    pub shelf: u32,
    pub cell: u32,
}

impl CellAddress {
    pub fn new(block: u32, shelf: u32, cell: u32) -> Self {
        Self { block, shelf, cell }
    }
}

impl std::fmt::Display for CellAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.block, self.shelf, self.cell)
    }
}

// ==================== CELL STATUS ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    Available,
    Occupied,
}

impl CellStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellStatus::Available => "available",
            CellStatus::Occupied => "occupied",
        }
    }

    pub fn display_name_ru(&self) -> &'static str {
        match self {
            CellStatus::Available => "Свободна",
            CellStatus::Occupied => "Занята",
        }
    }
}

impl Default for CellStatus {
    fn default() -> Self {
        CellStatus::Available
    }
}

// ==================== STRUCTURE RESPONSES ====================

/// Ячейка в плоской структуре (GET /api/warehouses/{id}/structure)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FlatCell {
    pub block: u32,
    pub shelf: u32,
    pub cell: u32,
    pub is_occupied: bool,
    #[serde(default)]
    pub cargo_number: Option<String>,
}

/// Плоская структура склада с агрегатами
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WarehouseStructure {
    pub blocks: u32,
    pub shelves_per_block: u32,
    pub cells_per_shelf: u32,
    pub total_cells: u64,
    pub occupied_cells: u64,
    pub free_cells: u64,
    #[serde(default)]
    pub cells: Vec<FlatCell>,
}

/// Метаданные груза в занятой ячейке (для тултипов и карточки ячейки)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OccupantInfo {
    pub cargo_number: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Ячейка во вложенной структуре (GET /api/warehouses/{id}/detailed-structure)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CellInfo {
    pub cell_number: u32,
    pub status: CellStatus,
    #[serde(default)]
    pub cargo_info: Option<OccupantInfo>,
}

impl CellInfo {
    pub fn is_occupied(&self) -> bool {
        self.status == CellStatus::Occupied
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShelfStructure {
    pub shelf_number: u32,
    pub cells: Vec<CellInfo>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BlockStructure {
    pub block_number: u32,
    pub shelves: Vec<ShelfStructure>,
}

/// Вложенная структура склада; снимок на момент запроса,
/// источник истины о занятости — бэкенд
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DetailedStructure {
    pub blocks: Vec<BlockStructure>,
}

// ==================== REQUESTS ====================

/// Координатное размещение (POST /api/operator/cargo/place)
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct PlaceCargoRequest {
    #[validate(length(min = 1, message = "Cargo id is required"))]
    pub cargo_id: String,

    #[validate(length(min = 1, message = "Warehouse id is required"))]
    pub warehouse_id: String,

    #[validate(range(min = 1, message = "Block number must be positive"))]
    pub block_number: u32,

    #[validate(range(min = 1, message = "Shelf number must be positive"))]
    pub shelf_number: u32,

    #[validate(range(min = 1, message = "Cell number must be positive"))]
    pub cell_number: u32,
}

/// Ручное размещение по строковому коду ячейки (POST /api/cargo/place-in-cell)
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ManualPlacementRequest {
    #[validate(length(min = 1, max = 64, message = "Cargo number must be between 1 and 64 characters"))]
    pub cargo_number: String,

    #[validate(length(min = 1, max = 128, message = "Cell code must be between 1 and 128 characters"))]
    pub cell_code: String,
}

/// Генерация печатной этикетки ячейки (POST /api/warehouse/cell/generate-qr)
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CellQrRequest {
    #[validate(length(min = 1, message = "Warehouse id is required"))]
    pub warehouse_id: String,

    #[validate(range(min = 1, message = "Block number must be positive"))]
    pub block: u32,

    #[validate(range(min = 1, message = "Shelf number must be positive"))]
    pub shelf: u32,

    #[validate(range(min = 1, message = "Cell number must be positive"))]
    pub cell: u32,
}

/// Подтверждение размещения от бэкенда
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlacementConfirmation {
    pub warehouse_name: String,
    #[serde(default)]
    pub block_number: Option<u32>,
    #[serde(default)]
    pub shelf_number: Option<u32>,
    #[serde(default)]
    pub cell_number: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warehouse(blocks: u32, shelves: u32, cells: u32) -> Warehouse {
        Warehouse {
            id: "WH1".to_string(),
            name: "Главный склад".to_string(),
            location: Some("Москва".to_string()),
            blocks_count: blocks,
            shelves_per_block: shelves,
            cells_per_shelf: cells,
        }
    }

    #[test]
    fn test_cell_enumeration_matches_product() {
        let wh = warehouse(3, 4, 5);
        let cells: Vec<CellAddress> = wh.cells().collect();
        assert_eq!(cells.len() as u64, wh.total_cells());
        assert_eq!(cells.len(), 3 * 4 * 5);
        assert_eq!(cells[0], CellAddress::new(1, 1, 1));
        assert_eq!(*cells.last().unwrap(), CellAddress::new(3, 4, 5));
    }

    #[test]
    fn test_enumeration_is_unique() {
        let wh = warehouse(2, 3, 4);
        let cells: Vec<CellAddress> = wh.cells().collect();
        let unique: std::collections::HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), cells.len());
    }

    #[test]
    fn test_validate_address_bounds() {
        let wh = warehouse(2, 3, 4);
        assert!(wh.validate_address(&CellAddress::new(1, 1, 1)).is_ok());
        assert!(wh.validate_address(&CellAddress::new(2, 3, 4)).is_ok());
        assert!(wh.validate_address(&CellAddress::new(0, 1, 1)).is_err());
        assert!(wh.validate_address(&CellAddress::new(3, 1, 1)).is_err());
        assert!(wh.validate_address(&CellAddress::new(1, 4, 1)).is_err());
        assert!(wh.validate_address(&CellAddress::new(1, 1, 5)).is_err());
    }

    #[test]
    fn test_block_operations() {
        let mut wh = warehouse(2, 3, 4);
        wh.add_block();
        assert_eq!(wh.blocks_count, 3);
        assert_eq!(wh.total_cells(), 3 * 3 * 4);
        wh.remove_block().unwrap();
        wh.remove_block().unwrap();
        assert_eq!(wh.blocks_count, 1);
        assert!(wh.remove_block().is_err());
    }

    #[test]
    fn test_cell_status_serde() {
        let status: CellStatus = serde_json::from_str("\"occupied\"").unwrap();
        assert_eq!(status, CellStatus::Occupied);
        assert_eq!(status.display_name_ru(), "Занята");
    }
}
