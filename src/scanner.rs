// src/scanner.rs
//! Жизненный цикл камеры-сканера
//!
//! Ядро не знает про браузер: доступ к DOM-контейнеру и списку камер скрыт за
//! ScannerHost, сам декодер — за Decoder. Распознанные строки уходят в mpsc-канал,
//! останов и повторный запуск между фазами — ответственность вызывающего.
//!
//! Остановка обязана быть безопасной всегда: контейнер уже удалён, декодер не
//! запускался, stop() вызван дважды — всё это штатные ситуации, а не ошибки.

use crate::config::ScannerConfig;
use crate::error::{PlacementError, PlacementResult};
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::mpsc;

lazy_static! {
    static ref REAR_CAMERA_LABEL: Regex =
        Regex::new(r"(?i)back|rear|environment|facing back").unwrap();
}

// ==================== CAMERA FAILURE ====================

/// Причина недоступности камеры, с текстом для оператора
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraFailure {
    PermissionDenied,
    NoCamera,
    Unsupported,
    Other(String),
}

impl CameraFailure {
    /// Имена ошибок браузера не стандартизованы идеально, но эти три устойчивы
    pub fn from_browser_error(name: &str) -> Self {
        match name {
            "NotAllowedError" => CameraFailure::PermissionDenied,
            "NotFoundError" => CameraFailure::NoCamera,
            "NotSupportedError" => CameraFailure::Unsupported,
            other => CameraFailure::Other(other.to_string()),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            CameraFailure::PermissionDenied => {
                "Доступ к камере запрещён. Разрешите доступ в настройках браузера".to_string()
            }
            CameraFailure::NoCamera => "Камера не найдена на этом устройстве".to_string(),
            CameraFailure::Unsupported => {
                "Браузер не поддерживает сканирование. Обновите браузер".to_string()
            }
            CameraFailure::Other(name) => format!("Не удалось запустить камеру: {}", name),
        }
    }
}

impl fmt::Display for CameraFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CameraFailure::PermissionDenied => write!(f, "camera permission denied"),
            CameraFailure::NoCamera => write!(f, "no camera present"),
            CameraFailure::Unsupported => write!(f, "camera API unsupported"),
            CameraFailure::Other(name) => write!(f, "camera error: {}", name),
        }
    }
}

// ==================== HOST / DECODER SEAMS ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub id: String,
    pub label: String,
}

/// Мост к среде исполнения (браузеру): DOM и перечисление камер
pub trait ScannerHost: Send + Sync {
    fn container_exists(&self, container_id: &str) -> bool;
    fn video_input_devices(&self) -> Result<Vec<CameraDevice>, CameraFailure>;
}

/// Параметры непрерывного распознавания: частота кадров и
/// квадратная область детекции в пикселях
#[derive(Debug, Clone, Copy)]
pub struct DecoderOptions {
    pub fps: u32,
    pub qrbox: u32,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self { fps: 10, qrbox: 250 }
    }
}

impl From<&ScannerConfig> for DecoderOptions {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            fps: config.fps,
            qrbox: config.qrbox,
        }
    }
}

/// Декодер, привязанный к DOM-контейнеру. Распознанные строки шлёт в канал,
/// по одной на каждое успешное распознавание.
#[async_trait]
pub trait Decoder: Send {
    async fn start(
        &mut self,
        container_id: &str,
        camera_id: &str,
        opts: &DecoderOptions,
        tx: mpsc::UnboundedSender<String>,
    ) -> PlacementResult<()>;

    fn is_scanning(&self) -> bool;

    async fn stop(&mut self) -> PlacementResult<()>;

    /// Освободить камеру и очистить контейнер
    async fn clear(&mut self) -> PlacementResult<()>;
}

// ==================== CAMERA SELECTION ====================

/// Выбор камеры: метка задней камеры → последняя в списке (на мобильных это
/// обычно задняя, и для непустого списка она покрывает «первую»). Эвристика,
/// метки у браузеров не стандартизованы.
pub fn select_camera(devices: &[CameraDevice]) -> Option<&CameraDevice> {
    devices
        .iter()
        .find(|d| REAR_CAMERA_LABEL.is_match(&d.label))
        .or_else(|| devices.last())
}

/// Предполётная проверка камеры перед стартом размещения
pub fn probe_camera<H: ScannerHost>(host: &H) -> Result<CameraDevice, CameraFailure> {
    let devices = host.video_input_devices()?;
    select_camera(&devices)
        .cloned()
        .ok_or(CameraFailure::NoCamera)
}

// ==================== SCANNER MANAGER ====================

/// Логическая поверхность интерфейса со своим независимым сканером
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScannerSurface {
    Main,
    Placement,
    Modal,
}

struct ScannerInstance<D> {
    decoder: D,
    container_id: String,
}

/// Не более одного активного декодера на поверхность; останов всегда успешен.
pub struct ScannerManager<D: Decoder> {
    instances: HashMap<ScannerSurface, ScannerInstance<D>>,
    opts: DecoderOptions,
    preferred_camera: Option<String>,
}

impl<D: Decoder> ScannerManager<D> {
    pub fn new(opts: DecoderOptions) -> Self {
        Self {
            instances: HashMap::new(),
            opts,
            preferred_camera: None,
        }
    }

    /// Менеджер из секции конфигурации: fps/qrbox декодера и, при наличии,
    /// принудительный выбор камеры по id
    pub fn from_config(config: &ScannerConfig) -> Self {
        Self {
            instances: HashMap::new(),
            opts: DecoderOptions::from(config),
            preferred_camera: config.preferred_camera.clone(),
        }
    }

    /// Камера из конфигурации имеет приоритет над эвристикой по метке;
    /// если заданного id среди устройств нет — откатываемся на эвристику
    fn pick_camera<'a>(&self, devices: &'a [CameraDevice]) -> Option<&'a CameraDevice> {
        if let Some(preferred) = &self.preferred_camera {
            match devices.iter().find(|d| &d.id == preferred) {
                Some(device) => return Some(device),
                None => warn!(
                    "Preferred camera '{}' not present, falling back to heuristic",
                    preferred
                ),
            }
        }
        select_camera(devices)
    }

    pub fn is_active(&self, surface: ScannerSurface) -> bool {
        self.instances.contains_key(&surface)
    }

    /// Запустить сканер на поверхности. Камера эксклюзивна, поэтому прежний
    /// декодер этой поверхности останавливается до запуска нового.
    pub async fn start<H: ScannerHost>(
        &mut self,
        surface: ScannerSurface,
        host: &H,
        mut decoder: D,
        container_id: &str,
        tx: mpsc::UnboundedSender<String>,
    ) -> PlacementResult<()> {
        self.stop(surface, host).await;

        let devices = host.video_input_devices().map_err(PlacementError::Camera)?;
        let camera = self
            .pick_camera(&devices)
            .cloned()
            .ok_or(PlacementError::Camera(CameraFailure::NoCamera))?;
        decoder
            .start(container_id, &camera.id, &self.opts, tx)
            .await?;

        info!(
            "📷 Scanner started: {:?} @ {} (camera '{}')",
            surface, container_id, camera.label
        );
        self.instances.insert(
            surface,
            ScannerInstance {
                decoder,
                container_id: container_id.to_string(),
            },
        );
        Ok(())
    }

    /// Двухфазный останов «по возможности»: исчезнувший контейнер — успех-noop,
    /// stop только при активном сканировании, clear — всегда; вторичные ошибки
    /// логируются и глотаются. Повторный вызов — тоже успех.
    pub async fn stop<H: ScannerHost>(&mut self, surface: ScannerSurface, host: &H) {
        let Some(mut instance) = self.instances.remove(&surface) else {
            debug!("Scanner stop: {:?} has no active instance", surface);
            return;
        };

        if !host.container_exists(&instance.container_id) {
            debug!(
                "Scanner stop: container '{}' already gone, nothing to do",
                instance.container_id
            );
            return;
        }

        if instance.decoder.is_scanning() {
            if let Err(e) = instance.decoder.stop().await {
                warn!("Scanner stop failed on {:?}: {}", surface, e);
            }
        }

        if let Err(e) = instance.decoder.clear().await {
            warn!("Scanner clear failed on {:?}: {}", surface, e);
        }

        info!("📷 Scanner stopped: {:?}", surface);
    }

    /// Снести все сканеры независимо друг от друга (закрытие модального окна)
    pub async fn stop_all<H: ScannerHost>(&mut self, host: &H) {
        for surface in [
            ScannerSurface::Main,
            ScannerSurface::Placement,
            ScannerSurface::Modal,
        ] {
            self.stop(surface, host).await;
        }
    }
}
