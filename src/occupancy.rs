// src/occupancy.rs
//! Чтение занятости по последнему загруженному снимку структуры
//!
//! Снимок может устареть в любой момент: источник истины — бэкенд, который
//! перепроверяет занятость при фактическом размещении. Все локальные ответы
//! носят справочный характер.

use crate::models::{CellAddress, CellInfo, DetailedStructure, Warehouse};

// Палитра группировки ячеек по клиенту (одна краска на клиента в схеме склада)
const CLIENT_PALETTE: [&str; 8] = [
    "#e57373", "#64b5f6", "#81c784", "#ffd54f", "#ba68c8", "#4db6ac", "#f06292", "#a1887f",
];

#[derive(Debug, Default, Clone)]
pub struct OccupancyResolver {
    snapshot: Option<DetailedStructure>,
}

impl OccupancyResolver {
    pub fn new() -> Self {
        Self { snapshot: None }
    }

    pub fn with_snapshot(snapshot: DetailedStructure) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }

    pub fn update(&mut self, snapshot: DetailedStructure) {
        self.snapshot = Some(snapshot);
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Свободна ли ячейка по данным снимка.
    ///
    /// Пока структура не загружена — оптимистично true, чтобы не блокировать
    /// интерфейс до прихода данных; false только при явно известной занятости.
    pub fn is_cell_available(&self, addr: &CellAddress) -> bool {
        match self.cell_info(addr) {
            Some(info) => !info.is_occupied(),
            None => true,
        }
    }

    /// Занятость и метаданные груза для отображения (тултипы, карточка ячейки)
    pub fn cell_info(&self, addr: &CellAddress) -> Option<&CellInfo> {
        let snapshot = self.snapshot.as_ref()?;
        snapshot
            .blocks
            .iter()
            .find(|b| b.block_number == addr.block)?
            .shelves
            .iter()
            .find(|s| s.shelf_number == addr.shelf)?
            .cells
            .iter()
            .find(|c| c.cell_number == addr.cell)
    }

    /// Первая свободная ячейка в порядке блок → стеллаж → ячейка
    pub fn next_available(&self, warehouse: &Warehouse) -> Option<CellAddress> {
        warehouse.cells().find(|addr| match self.cell_info(addr) {
            Some(info) => !info.is_occupied(),
            // ячейки, отсутствующие в снимке, не предлагаем
            None => false,
        })
    }

    pub fn occupied_count(&self) -> u64 {
        self.count_cells(true)
    }

    pub fn free_count(&self) -> u64 {
        self.count_cells(false)
    }

    fn count_cells(&self, occupied: bool) -> u64 {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return 0;
        };
        snapshot
            .blocks
            .iter()
            .flat_map(|b| b.shelves.iter())
            .flat_map(|s| s.cells.iter())
            .filter(|c| c.is_occupied() == occupied)
            .count() as u64
    }
}

/// Детерминированный цвет группировки по клиенту: все ячейки одного клиента
/// окрашиваются одинаково на схеме склада
pub fn client_color(client_key: &str) -> &'static str {
    let hash: u32 = client_key
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    CLIENT_PALETTE[(hash as usize) % CLIENT_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockStructure, CellStatus, OccupantInfo, ShelfStructure};

    fn snapshot() -> DetailedStructure {
        DetailedStructure {
            blocks: vec![BlockStructure {
                block_number: 1,
                shelves: vec![ShelfStructure {
                    shelf_number: 2,
                    cells: vec![
                        CellInfo {
                            cell_number: 1,
                            status: CellStatus::Occupied,
                            cargo_info: Some(OccupantInfo {
                                cargo_number: "TEMP-000999".to_string(),
                                client_name: Some("Рахимов".to_string()),
                                weight: Some(12.5),
                            }),
                        },
                        CellInfo {
                            cell_number: 2,
                            status: CellStatus::Available,
                            cargo_info: None,
                        },
                    ],
                }],
            }],
        }
    }

    fn warehouse() -> Warehouse {
        Warehouse {
            id: "WH1".to_string(),
            name: "Склад".to_string(),
            location: None,
            blocks_count: 1,
            shelves_per_block: 2,
            cells_per_shelf: 2,
        }
    }

    #[test]
    fn test_optimistic_before_snapshot() {
        let resolver = OccupancyResolver::new();
        assert!(resolver.is_cell_available(&CellAddress::new(1, 2, 1)));
        assert!(resolver.cell_info(&CellAddress::new(1, 2, 1)).is_none());
    }

    #[test]
    fn test_occupied_after_snapshot() {
        let resolver = OccupancyResolver::with_snapshot(snapshot());
        assert!(!resolver.is_cell_available(&CellAddress::new(1, 2, 1)));
        assert!(resolver.is_cell_available(&CellAddress::new(1, 2, 2)));
        let info = resolver.cell_info(&CellAddress::new(1, 2, 1)).unwrap();
        assert_eq!(
            info.cargo_info.as_ref().unwrap().cargo_number,
            "TEMP-000999"
        );
    }

    #[test]
    fn test_unknown_cell_stays_optimistic() {
        // ячейка вне снимка: явной занятости нет, значит считаем свободной
        let resolver = OccupancyResolver::with_snapshot(snapshot());
        assert!(resolver.is_cell_available(&CellAddress::new(3, 1, 1)));
    }

    #[test]
    fn test_next_available_skips_occupied() {
        let resolver = OccupancyResolver::with_snapshot(snapshot());
        assert_eq!(
            resolver.next_available(&warehouse()),
            Some(CellAddress::new(1, 2, 2))
        );
    }

    #[test]
    fn test_counts() {
        let resolver = OccupancyResolver::with_snapshot(snapshot());
        assert_eq!(resolver.occupied_count(), 1);
        assert_eq!(resolver.free_count(), 1);
    }

    #[test]
    fn test_client_color_is_stable() {
        assert_eq!(client_color("Рахимов"), client_color("Рахимов"));
        assert!(CLIENT_PALETTE.contains(&client_color("Назаров")));
    }
}
