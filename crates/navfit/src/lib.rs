//! Fitness report (FITREP) core: record model, template field mapping,
//! fillable PDF export, and SQLite persistence for the desktop shell.

pub mod config;
pub mod error;
pub mod fitrep;
pub mod telemetry;

use config::AppConfig;
use error::AppError;
use fitrep::{AcroFormEngine, FitrepService, SqliteFitrepRepository};

/// The service wiring the desktop shell uses.
pub type DesktopService = FitrepService<SqliteFitrepRepository, AcroFormEngine>;

/// Opens the configured store and template binding.
pub fn open_service(config: &AppConfig) -> Result<DesktopService, AppError> {
    Ok(FitrepService::open(config)?)
}

/// Loads configuration, installs logging, and opens the service. Call once
/// per process.
pub fn bootstrap() -> Result<(AppConfig, DesktopService), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let service = open_service(&config)?;
    tracing::info!(?config.environment, database = %config.storage.database_path.display(), "fitrep core ready");
    Ok((config, service))
}
