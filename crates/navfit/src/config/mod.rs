use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::fitrep::DEFAULT_TEXT_FONT_SIZE;

const DEFAULT_DATABASE_PATH: &str = "navfit26.db";
const DEFAULT_TEMPLATE_PATH: &str = "templates/NAVPERS_1610-2.pdf";

/// Distinguishes runtime behavior for different stages of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub storage: StorageConfig,
    pub template: TemplateConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("NAVFIT_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let database_path = path_var("NAVFIT_DB_PATH", DEFAULT_DATABASE_PATH)?;
        let template_path = path_var("NAVFIT_TEMPLATE_PATH", DEFAULT_TEMPLATE_PATH)?;

        let text_font_size = match env::var("NAVFIT_TEXT_FONT_SIZE") {
            Ok(raw) => raw
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|size| size.is_finite() && *size > 0.0)
                .ok_or(ConfigError::InvalidFontSize { value: raw })?,
            Err(_) => DEFAULT_TEXT_FONT_SIZE,
        };

        let log_level = env::var("NAVFIT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            storage: StorageConfig { database_path },
            template: TemplateConfig {
                path: template_path,
                text_font_size,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn path_var(variable: &'static str, default: &str) -> Result<PathBuf, ConfigError> {
    match env::var(variable) {
        Ok(raw) if raw.trim().is_empty() => Err(ConfigError::EmptyPath { variable }),
        Ok(raw) => Ok(PathBuf::from(raw.trim())),
        Err(_) => Ok(PathBuf::from(default)),
    }
}

/// Where saved reports live.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

/// The blank fillable form and how text is laid into it.
#[derive(Debug, Clone)]
pub struct TemplateConfig {
    pub path: PathBuf,
    pub text_font_size: f32,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidFontSize { value: String },
    EmptyPath { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFontSize { value } => write!(
                f,
                "NAVFIT_TEXT_FONT_SIZE must be a positive number, got '{}'",
                value
            ),
            ConfigError::EmptyPath { variable } => write!(f, "{} must not be blank", variable),
        }
    }
}

impl std::error::Error for ConfigError {}
