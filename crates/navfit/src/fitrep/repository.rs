use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::record::Fitrep;

/// Row identifier assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// List projection; the full snapshot is only read by [`FitrepRepository::fetch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FitrepSummary {
    pub id: RecordId,
    pub name: String,
    pub grade: String,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait FitrepRepository: Send + Sync {
    /// Appends a new snapshot; there is no update-in-place.
    fn insert(&self, record: &Fitrep) -> Result<RecordId, RepositoryError>;
    /// Newest first.
    fn list(&self) -> Result<Vec<FitrepSummary>, RepositoryError>;
    fn fetch(&self, id: RecordId) -> Result<Option<Fitrep>, RepositoryError>;
    /// On-disk file backing the store, when there is one.
    fn storage_path(&self) -> Option<&Path> {
        None
    }
}

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("record snapshot could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// SQLite-backed store holding one row per saved report.
pub struct SqliteFitrepRepository {
    connection: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl fmt::Debug for SqliteFitrepRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteFitrepRepository")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteFitrepRepository {
    /// Opens (creating if needed) the database file and its schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref().to_path_buf();
        let connection = Connection::open(&path)?;
        let repository = Self::with_connection(connection, Some(path))?;
        info!(path = ?repository.path, "fitrep database ready");
        Ok(repository)
    }

    /// Ephemeral store; nothing to export with [`FitrepRepository::storage_path`].
    pub fn in_memory() -> Result<Self, RepositoryError> {
        Self::with_connection(Connection::open_in_memory()?, None)
    }

    fn with_connection(connection: Connection, path: Option<PathBuf>) -> Result<Self, RepositoryError> {
        connection.execute(
            r#"
            CREATE TABLE IF NOT EXISTS fitreps (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                grade TEXT,
                data TEXT,
                created_at TEXT
            )
            "#,
            [],
        )?;

        Ok(Self {
            connection: Mutex::new(connection),
            path,
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.connection
            .lock()
            .map_err(|_| RepositoryError::Unavailable("connection lock poisoned".to_string()))
    }
}

impl FitrepRepository for SqliteFitrepRepository {
    fn insert(&self, record: &Fitrep) -> Result<RecordId, RepositoryError> {
        let data = serde_json::to_string(record)?;
        let created_at = Utc::now().to_rfc3339();
        let connection = self.connection()?;

        connection.execute(
            "INSERT INTO fitreps (name, grade, data, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![record.full_name, record.rate, data, created_at],
        )?;
        let id = RecordId(connection.last_insert_rowid());

        info!(%id, name = %record.full_name, "fitrep saved");
        Ok(id)
    }

    fn list(&self) -> Result<Vec<FitrepSummary>, RepositoryError> {
        let connection = self.connection()?;
        let mut statement =
            connection.prepare("SELECT id, name, grade FROM fitreps ORDER BY id DESC")?;
        let rows = statement.query_map([], |row| {
            Ok(FitrepSummary {
                id: RecordId(row.get(0)?),
                name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                grade: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?;

        let summaries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    fn fetch(&self, id: RecordId) -> Result<Option<Fitrep>, RepositoryError> {
        let connection = self.connection()?;
        let data: Option<Option<String>> = connection
            .query_row(
                "SELECT data FROM fitreps WHERE id = ?1",
                params![id.0],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            None => Ok(None),
            Some(raw) => {
                let snapshot: Value = match raw {
                    Some(raw) => serde_json::from_str(&raw)?,
                    None => Value::Null,
                };
                Ok(Some(Fitrep::from_raw(&snapshot)))
            }
        }
    }

    fn storage_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
