// src/lib.rs
//! Ядро размещения грузов по ячейкам склада
//!
//! Клиентская часть логистической платформы (перевозки Москва ↔ Таджикистан):
//! пространственная модель склада (блоки → стеллажи → ячейки), чтение
//! занятости по снимку структуры, распознавание сканов (штрихкод груза,
//! QR ячейки в двух форматах), машина состояний размещения и жизненный цикл
//! камеры-сканера. Бэкенд — внешний: ядро говорит с ним только по REST
//! и никогда не считает себя источником истины о занятости.

pub mod api;
pub mod codes;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod occupancy;
pub mod scanner;

pub use api::{ApiClient, PlacementBackend};
pub use codes::{classify, extract_cargo_number, parse_cell_code, CellCode, ScannedCode};
pub use config::{load_config, Config};
pub use engine::{PlacementEngine, PlacementStep, ScanFeedback};
pub use error::{PlacementError, PlacementResult};
pub use occupancy::OccupancyResolver;
pub use scanner::{
    select_camera, CameraDevice, CameraFailure, Decoder, DecoderOptions, ScannerHost,
    ScannerManager, ScannerSurface,
};
