use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use super::filler::{FillError, FormFiller};
use super::mapper::{map_fitrep, FieldMap};
use super::record::Fitrep;
use super::repository::{
    FitrepRepository, FitrepSummary, RecordId, RepositoryError, SqliteFitrepRepository,
};
use super::template::{AcroFormEngine, TemplateEngine};
use crate::config::AppConfig;

/// Service composing the record store, field mapper, and form filler behind
/// the operations the application shell calls.
pub struct FitrepService<R, E> {
    repository: Arc<R>,
    engine: E,
    filler: FormFiller,
    template_path: PathBuf,
}

impl FitrepService<SqliteFitrepRepository, AcroFormEngine> {
    /// SQLite store plus PDF AcroForm filling, as configured.
    pub fn open(config: &AppConfig) -> Result<Self, RepositoryError> {
        let repository = SqliteFitrepRepository::open(&config.storage.database_path)?;
        Ok(Self::new(
            Arc::new(repository),
            AcroFormEngine,
            FormFiller::new(config.template.text_font_size),
            config.template.path.clone(),
        ))
    }
}

impl<R, E> FitrepService<R, E>
where
    R: FitrepRepository + 'static,
    E: TemplateEngine,
{
    pub fn new(repository: Arc<R>, engine: E, filler: FormFiller, template_path: PathBuf) -> Self {
        Self {
            repository,
            engine,
            filler,
            template_path,
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn save(&self, record: &Fitrep) -> Result<RecordId, ExportError> {
        let id = self.repository.insert(record)?;
        Ok(id)
    }

    pub fn list(&self) -> Result<Vec<FitrepSummary>, ExportError> {
        let summaries = self.repository.list()?;
        Ok(summaries)
    }

    pub fn load(&self, id: RecordId) -> Result<Fitrep, ExportError> {
        self.repository
            .fetch(id)?
            .ok_or(ExportError::NotFound(id))
    }

    pub fn field_map(&self, record: &Fitrep) -> FieldMap {
        map_fitrep(record)
    }

    /// Fills the configured template for `record` and writes it to
    /// `destination`. Nothing is written when the template cannot be loaded.
    pub async fn export_form(
        &self,
        record: &Fitrep,
        destination: &Path,
    ) -> Result<PathBuf, ExportError> {
        let result = self.write_form(record, destination).await;
        if let Err(err) = &result {
            error!(operation = "export_form", error = %err, "form export failed");
        }
        result
    }

    async fn write_form(&self, record: &Fitrep, destination: &Path) -> Result<PathBuf, ExportError> {
        let fields = map_fitrep(record);
        let bytes = self
            .filler
            .fill(&self.engine, &fields, &self.template_path)
            .await?;
        write_file(destination, &bytes).await?;

        info!(path = %destination.display(), bytes = bytes.len(), "filled form exported");
        Ok(destination.to_path_buf())
    }

    /// Exports a previously saved report, as chosen from the list view.
    pub async fn export_saved_form(
        &self,
        id: RecordId,
        destination: &Path,
    ) -> Result<PathBuf, ExportError> {
        let record = self.load(id)?;
        self.export_form(&record, destination).await
    }

    /// Writes the flat field mapping as pretty JSON, for inspecting a
    /// template binding without producing a PDF.
    pub async fn export_field_map(
        &self,
        record: &Fitrep,
        destination: &Path,
    ) -> Result<PathBuf, ExportError> {
        let json = map_fitrep(record).to_json_pretty()?;
        write_file(destination, json.as_bytes()).await?;
        info!(path = %destination.display(), "field map exported");
        Ok(destination.to_path_buf())
    }

    /// Copies the database file byte for byte.
    pub async fn export_database(&self, destination: &Path) -> Result<PathBuf, ExportError> {
        let result = self.copy_database(destination).await;
        if let Err(err) = &result {
            error!(operation = "export_database", error = %err, "database export failed");
        }
        result
    }

    async fn copy_database(&self, destination: &Path) -> Result<PathBuf, ExportError> {
        let source = self
            .repository
            .storage_path()
            .ok_or(ExportError::NoStorageFile)?;
        tokio::fs::copy(source, destination)
            .await
            .map_err(|source| ExportError::Io {
                path: destination.to_path_buf(),
                source,
            })?;

        info!(path = %destination.display(), "database exported");
        Ok(destination.to_path_buf())
    }
}

async fn write_file(destination: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    tokio::fs::write(destination, bytes)
        .await
        .map_err(|source| ExportError::Io {
            path: destination.to_path_buf(),
            source,
        })
}

/// Error raised by the export surface.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Fill(#[from] FillError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("no saved report with id {0}")]
    NotFound(RecordId),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("the record store has no database file to export")]
    NoStorageFile,
    #[error("field map could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
}
