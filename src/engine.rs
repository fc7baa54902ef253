// src/engine.rs
//! Движок размещения: скан груза → скан ячейки → фиксация
//!
//! Шаги: Idle → ScanCargo → ScanCell → (commit) → ScanCargo. После успешного
//! размещения движок возвращается к скану груза, а не в Idle — оператор
//! размещает партию подряд, не открывая окно заново.
//!
//! Внутри одной сессии скан груза строго предшествует скану ячейки. Отмена
//! действует немедленно: эпоха сессии инвалидируется, и колбэки декодера,
//! пришедшие после отмены, игнорируются.
//!
//! Локальная проверка занятости (is_occupied из скана, снимок структуры)
//! экономит запрос, но финальный арбитр конфликтов — бэкенд: его отказ
//! обрабатывается так же, как локально обнаруженная занятость.

use crate::api::PlacementBackend;
use crate::error::{PlacementError, PlacementResult};
use crate::models::{
    CargoSummary, CellAddress, ManualPlacementRequest, PlaceCargoRequest, PlacementConfirmation,
    ProcessingStatus, ScanResolution, Warehouse,
};
use crate::occupancy::OccupancyResolver;
use crate::scanner::ScannerHost;
use log::{debug, info, warn};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

// ==================== STEP / FEEDBACK ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementStep {
    Idle,
    ScanCargo,
    ScanCell,
}

/// Итог обработки одного распознанного кадра
#[derive(Debug)]
pub enum ScanFeedback {
    /// Груз принят, движок ждёт скан ячейки
    CargoAccepted(CargoSummary),
    /// Размещение зафиксировано, движок готов к следующему грузу
    Placed(PlacementConfirmation),
    /// Ячейка занята: отказ без запроса размещения, повтор той же фазы
    CellOccupied {
        cargo_number: Option<String>,
        message: String,
    },
    /// Кадр не подошёл к текущей фазе — повторный скан с подсказкой
    Rescan { message: String },
    /// Колбэк устаревшей сессии (после отмены) — игнорируется
    Ignored,
}

// ==================== ENGINE ====================

pub struct PlacementEngine<B: PlacementBackend> {
    backend: Arc<B>,
    warehouse_id: String,
    step: PlacementStep,
    scanned_cargo: Option<CargoSummary>,
    occupancy: OccupancyResolver,
    epoch: u64,
    session_id: Option<Uuid>,
}

impl<B: PlacementBackend> PlacementEngine<B> {
    pub fn new(backend: Arc<B>, warehouse_id: impl Into<String>) -> Self {
        Self {
            backend,
            warehouse_id: warehouse_id.into(),
            step: PlacementStep::Idle,
            scanned_cargo: None,
            occupancy: OccupancyResolver::new(),
            epoch: 0,
            session_id: None,
        }
    }

    /// Идентификатор текущей сессии для корреляции логов
    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn step(&self) -> PlacementStep {
        self.step
    }

    pub fn scanned_cargo(&self) -> Option<&CargoSummary> {
        self.scanned_cargo.as_ref()
    }

    /// Текущая эпоха сессии; передаётся в колбэки декодера
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn occupancy(&self) -> &OccupancyResolver {
        &self.occupancy
    }

    /// Подтянуть снимок структуры для справочных проверок занятости
    pub async fn load_structure(&mut self) -> PlacementResult<()> {
        let snapshot = self.backend.detailed_structure(&self.warehouse_id).await?;
        self.occupancy.update(snapshot);
        Ok(())
    }

    /// Запуск сессии размещения. Камера проверяется до смены шага:
    /// без камеры движок остаётся в Idle, оператору показывается причина.
    pub fn start<H: ScannerHost>(&mut self, host: &H) -> PlacementResult<u64> {
        crate::scanner::probe_camera(host).map_err(PlacementError::Camera)?;
        self.begin_session(PlacementStep::ScanCargo);
        info!("📦 Placement session started (epoch {})", self.epoch);
        Ok(self.epoch)
    }

    /// Запуск «разместить этот груз»: груз уже выбран в интерфейсе,
    /// сессия начинается сразу с фазы скана ячейки
    pub fn start_for_cargo<H: ScannerHost>(
        &mut self,
        host: &H,
        cargo: CargoSummary,
    ) -> PlacementResult<u64> {
        crate::scanner::probe_camera(host).map_err(PlacementError::Camera)?;
        self.begin_session(PlacementStep::ScanCell);
        info!(
            "📦 Placement session for cargo {} (epoch {})",
            cargo.cargo_number, self.epoch
        );
        self.scanned_cargo = Some(cargo);
        Ok(self.epoch)
    }

    fn begin_session(&mut self, step: PlacementStep) {
        self.epoch += 1;
        self.scanned_cargo = None;
        self.session_id = Some(Uuid::new_v4());
        self.step = step;
    }

    /// Отмена: сброс в Idle и инвалидация эпохи. Остановка сканера —
    /// обязанность владельца ScannerManager (закрытие модального окна).
    pub fn cancel(&mut self) {
        self.epoch += 1;
        self.scanned_cargo = None;
        self.session_id = None;
        self.step = PlacementStep::Idle;
        info!("📦 Placement session cancelled");
    }

    /// Обработка одного распознанного кадра. Ошибки сети/бэкенда не меняют
    /// текущий шаг — оператор повторяет попытку с того же места.
    pub async fn handle_decode(&mut self, epoch: u64, raw: &str) -> PlacementResult<ScanFeedback> {
        if epoch != self.epoch {
            debug!("Stale decode callback ignored (epoch {} != {})", epoch, self.epoch);
            return Ok(ScanFeedback::Ignored);
        }

        match self.step {
            PlacementStep::Idle => {
                debug!("Decode while idle ignored: '{}'", raw);
                Ok(ScanFeedback::Ignored)
            }
            PlacementStep::ScanCargo => self.handle_cargo_scan(raw).await,
            PlacementStep::ScanCell => self.handle_cell_scan(raw).await,
        }
    }

    async fn handle_cargo_scan(&mut self, raw: &str) -> PlacementResult<ScanFeedback> {
        let resolved = self.backend.resolve_scan(raw).await?;
        match resolved {
            ScanResolution::Cargo { cargo } => {
                // к размещению допускается оплаченный груз; уже размещённый —
                // тоже (перестановка в другую ячейку, бэкенд освободит прежнюю)
                let placeable = cargo.processing_status.is_placement_eligible()
                    || cargo.processing_status == ProcessingStatus::Placed;
                if !placeable {
                    let message = match cargo.processing_status {
                        ProcessingStatus::PaymentPending => format!(
                            "Груз {} не оплачен, размещение недоступно",
                            cargo.cargo_number
                        ),
                        status => format!(
                            "Груз {} ({}) не подлежит размещению",
                            cargo.cargo_number,
                            status.display_name_ru()
                        ),
                    };
                    return Ok(ScanFeedback::Rescan { message });
                }
                info!("📦 Cargo scanned: {}", cargo.cargo_number);
                self.scanned_cargo = Some(cargo.clone());
                self.step = PlacementStep::ScanCell;
                Ok(ScanFeedback::CargoAccepted(cargo))
            }
            ScanResolution::WarehouseCell { .. } => Ok(ScanFeedback::Rescan {
                message: "Отсканируйте код груза, а не ячейки".to_string(),
            }),
        }
    }

    async fn handle_cell_scan(&mut self, raw: &str) -> PlacementResult<ScanFeedback> {
        let resolved = self.backend.resolve_scan(raw).await?;
        let cell = match resolved {
            ScanResolution::WarehouseCell { cell } => cell,
            ScanResolution::Cargo { .. } => {
                return Ok(ScanFeedback::Rescan {
                    message: "Отсканируйте QR-код ячейки, а не груза".to_string(),
                });
            }
        };

        if cell.is_occupied {
            let message = match &cell.cargo_number {
                Some(number) => format!("ячейка занята грузом {}", number),
                None => "ячейка занята".to_string(),
            };
            warn!(
                "📍 Cell {}-{}-{} occupied, placement refused locally",
                cell.block_number, cell.shelf_number, cell.cell_number
            );
            return Ok(ScanFeedback::CellOccupied {
                cargo_number: cell.cargo_number,
                message,
            });
        }

        let Some(cargo) = self.scanned_cargo.clone() else {
            // сюда можно попасть только при рассинхроне UI; возвращаемся к грузу
            warn!("Cell scanned without cargo in session, resetting to cargo scan");
            self.step = PlacementStep::ScanCargo;
            return Ok(ScanFeedback::Rescan {
                message: "Сначала отсканируйте груз".to_string(),
            });
        };

        let request = PlaceCargoRequest {
            cargo_id: cargo.id.clone(),
            warehouse_id: cell.warehouse_id.clone(),
            block_number: cell.block_number,
            shelf_number: cell.shelf_number,
            cell_number: cell.cell_number,
        };
        let confirmation = self.backend.place_cargo(&request).await?;

        info!(
            "📍 Cargo {} → {} {}-{}-{}",
            cargo.cargo_number,
            confirmation.warehouse_name,
            cell.block_number,
            cell.shelf_number,
            cell.cell_number
        );
        // следующий груз той же партии
        self.scanned_cargo = None;
        self.step = PlacementStep::ScanCargo;
        Ok(ScanFeedback::Placed(confirmation))
    }

    /// UI-ведомое размещение в выбранную на схеме ячейку. Координата
    /// проверяется по структуре склада до запроса; снимок занятости —
    /// справочный заслон, бэкенд перепроверит сам.
    pub async fn place_at(
        &mut self,
        warehouse: &Warehouse,
        addr: CellAddress,
    ) -> PlacementResult<PlacementConfirmation> {
        warehouse.validate_address(&addr)?;

        if !self.occupancy.is_cell_available(&addr) {
            let occupant = self
                .occupancy
                .cell_info(&addr)
                .and_then(|info| info.cargo_info.as_ref())
                .map(|occupant| occupant.cargo_number.clone());
            return Err(PlacementError::cell_occupied(occupant));
        }

        let Some(cargo) = self.scanned_cargo.clone() else {
            return Err(PlacementError::BadRequest(
                "No cargo selected for placement".to_string(),
            ));
        };

        let request = PlaceCargoRequest {
            cargo_id: cargo.id.clone(),
            warehouse_id: warehouse.id.clone(),
            block_number: addr.block,
            shelf_number: addr.shelf,
            cell_number: addr.cell,
        };
        let confirmation = self.backend.place_cargo(&request).await?;

        info!("📍 Cargo {} → {}", cargo.cargo_number, addr);
        self.scanned_cargo = None;
        if self.step == PlacementStep::ScanCell {
            self.step = PlacementStep::ScanCargo;
        }
        Ok(confirmation)
    }

    /// Ручной ввод: номер груза + код ячейки, без камеры и без смены шага.
    /// Семантика успеха/отказа идентична скан-пути.
    pub async fn place_manual(
        &self,
        cargo_number: &str,
        cell_code: &str,
    ) -> PlacementResult<()> {
        let request = ManualPlacementRequest {
            cargo_number: cargo_number.trim().to_string(),
            cell_code: cell_code.trim().to_string(),
        };
        request.validate()?;

        if self.backend.place_by_code(&request).await? {
            info!(
                "📍 Manual placement: cargo {} → cell '{}'",
                request.cargo_number, request.cell_code
            );
            Ok(())
        } else {
            Err(PlacementError::placement_rejected(
                "сервер отклонил размещение",
            ))
        }
    }
}
