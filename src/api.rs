// src/api.rs
//! Клиент REST-поверхности бэкенда
//!
//! Endpoints:
//!   GET  /api/warehouses/{id}/structure           — плоская структура с агрегатами
//!   GET  /api/warehouses/{id}/detailed-structure  — вложенная структура по блокам
//!   POST /api/qr/scan                             — распознать отсканированную строку
//!   POST /api/operator/cargo/place                — координатное размещение
//!   POST /api/cargo/place-in-cell                 — размещение по строковому коду
//!   POST /api/warehouse/cell/generate-qr          — этикетка ячейки (data URL)
//!
//! PlacementBackend — шов для тестов движка; ApiClient — боевая реализация.
//! Не-2xx ответ превращается в Backend{status, message}, текст сервера
//! показывается оператору дословно.

use crate::config::ApiConfig;
use crate::error::{PlacementError, PlacementResult};
use crate::models::{
    CellLabel, CellQrRequest, DetailedStructure, ManualPlacementRequest, PlaceCargoRequest,
    PlacementConfirmation, ScanResolution, WarehouseStructure,
};
use async_trait::async_trait;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

// ==================== BACKEND SEAM ====================

#[async_trait]
pub trait PlacementBackend: Send + Sync {
    async fn warehouse_structure(&self, warehouse_id: &str) -> PlacementResult<WarehouseStructure>;

    async fn detailed_structure(&self, warehouse_id: &str) -> PlacementResult<DetailedStructure>;

    /// Разрешить произвольную отсканированную строку в типизированную сущность
    async fn resolve_scan(&self, qr_text: &str) -> PlacementResult<ScanResolution>;

    /// Координатное размещение; бэкенд — финальный арбитр конфликтов
    async fn place_cargo(
        &self,
        request: &PlaceCargoRequest,
    ) -> PlacementResult<PlacementConfirmation>;

    /// Ручное размещение по строковому коду ячейки
    async fn place_by_code(&self, request: &ManualPlacementRequest) -> PlacementResult<bool>;

    async fn generate_cell_qr(&self, request: &CellQrRequest) -> PlacementResult<CellLabel>;
}

// ==================== WIRE TYPES ====================

#[derive(Debug, Serialize)]
struct ScanRequest<'a> {
    qr_text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PlaceInCellResponse {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

// ==================== API CLIENT ====================

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> PlacementResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> PlacementResult<T> {
        debug!("GET {}", path);
        let response = self.with_auth(self.http.get(self.url(path))).send().await?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> PlacementResult<T> {
        debug!("POST {}", path);
        let response = self
            .with_auth(self.http.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> PlacementResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        // текст сервера — как есть; если тела нет, подставляем статус
        let message = match response.json::<ErrorBody>().await {
            Ok(ErrorBody {
                message: Some(message),
            }) => message,
            _ => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };
        Err(PlacementError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PlacementBackend for ApiClient {
    async fn warehouse_structure(&self, warehouse_id: &str) -> PlacementResult<WarehouseStructure> {
        self.get_json(&format!("/api/warehouses/{}/structure", warehouse_id))
            .await
    }

    async fn detailed_structure(&self, warehouse_id: &str) -> PlacementResult<DetailedStructure> {
        self.get_json(&format!(
            "/api/warehouses/{}/detailed-structure",
            warehouse_id
        ))
        .await
    }

    async fn resolve_scan(&self, qr_text: &str) -> PlacementResult<ScanResolution> {
        self.post_json("/api/qr/scan", &ScanRequest { qr_text }).await
    }

    async fn place_cargo(
        &self,
        request: &PlaceCargoRequest,
    ) -> PlacementResult<PlacementConfirmation> {
        request.validate()?;
        let confirmation: PlacementConfirmation =
            self.post_json("/api/operator/cargo/place", request).await?;
        info!(
            "📍 Cargo {} placed: {} {}-{}-{}",
            request.cargo_id,
            confirmation.warehouse_name,
            request.block_number,
            request.shelf_number,
            request.cell_number
        );
        Ok(confirmation)
    }

    async fn place_by_code(&self, request: &ManualPlacementRequest) -> PlacementResult<bool> {
        request.validate()?;
        let response: PlaceInCellResponse =
            self.post_json("/api/cargo/place-in-cell", request).await?;
        Ok(response.success)
    }

    async fn generate_cell_qr(&self, request: &CellQrRequest) -> PlacementResult<CellLabel> {
        request.validate()?;
        self.post_json("/api/warehouse/cell/generate-qr", request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
            auth_token: None,
        })
        .unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = client("http://localhost:8080/");
        assert_eq!(
            api.url("/api/qr/scan"),
            "http://localhost:8080/api/qr/scan"
        );
    }

    #[test]
    fn test_scan_request_shape() {
        let body = serde_json::to_value(ScanRequest { qr_text: "WH1:1:2:5" }).unwrap();
        assert_eq!(body, serde_json::json!({ "qr_text": "WH1:1:2:5" }));
    }

    #[test]
    fn test_error_body_tolerates_missing_message() {
        let body: ErrorBody = serde_json::from_str("{\"success\": false}").unwrap();
        assert!(body.message.is_none());
    }
}
