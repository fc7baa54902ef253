// src/config.rs - Configuration for the placement client core
//! Конфигурация: значения по умолчанию → config.toml → переменные окружения
//! Переменные окружения имеют приоритет (SKLAD_API_URL и т.д.)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub scanner: ScannerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub auth_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScannerConfig {
    /// Частота кадров непрерывного распознавания
    pub fps: u32,
    /// Сторона квадратной области детекции, px
    pub qrbox: u32,
    /// Принудительный выбор камеры по id (иначе эвристика по метке)
    pub preferred_camera: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub console_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_seconds: 30,
            auth_token: None,
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            qrbox: 250,
            preferred_camera: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_enabled: true,
        }
    }
}

/// Загрузка конфигурации. Файл берётся из SKLAD_CONFIG_FILE либо ./config.toml,
/// отсутствие файла — не ошибка (работаем на дефолтах + env).
pub fn load_config() -> Result<Config> {
    dotenvy::dotenv().ok();

    let path = env::var("SKLAD_CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
    let mut config = if Path::new(&path).exists() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        toml::from_str(&raw).with_context(|| format!("Failed to parse config file: {}", path))?
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(url) = env::var("SKLAD_API_URL") {
        config.api.base_url = url;
    }
    if let Ok(token) = env::var("SKLAD_API_TOKEN") {
        config.api.auth_token = Some(token);
    }
    if let Ok(timeout) = env::var("SKLAD_API_TIMEOUT") {
        if let Ok(seconds) = timeout.parse() {
            config.api.timeout_seconds = seconds;
        }
    }
    if let Ok(level) = env::var("SKLAD_LOG_LEVEL") {
        config.logging.level = level;
    }
}

/// Инициализация логгера; повторный вызов в тестах безопасен
pub fn init_logging(config: &LoggingConfig) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&config.level);
    if !config.console_enabled {
        builder.target(env_logger::Target::Pipe(Box::new(std::io::sink())));
    }
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.scanner.fps, 10);
        assert_eq!(config.scanner.qrbox, 250);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"https://sklad.example.com\"\n\n[scanner]\nfps = 15\n"
        )
        .unwrap();

        let raw = fs::read_to_string(file.path()).unwrap();
        let config: Config = toml::from_str(&raw).unwrap();
        assert_eq!(config.api.base_url, "https://sklad.example.com");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.scanner.fps, 15);
        assert_eq!(config.scanner.qrbox, 250);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        env::set_var("SKLAD_API_URL", "https://api.sklad.tj");
        env::set_var("SKLAD_API_TIMEOUT", "12");
        apply_env_overrides(&mut config);
        env::remove_var("SKLAD_API_URL");
        env::remove_var("SKLAD_API_TIMEOUT");

        assert_eq!(config.api.base_url, "https://api.sklad.tj");
        assert_eq!(config.api.timeout_seconds, 12);
    }
}
