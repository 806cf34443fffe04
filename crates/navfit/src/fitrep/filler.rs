use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::fields::CHECKED;
use super::mapper::FieldMap;
use super::template::{FieldError, FieldKind, FormDocument, TemplateEngine, TemplateError};

/// Point size the printed NAVPERS layout is designed around.
pub const DEFAULT_TEXT_FONT_SIZE: f32 = 10.0;

/// Fatal fill failures. Per-field problems never surface here.
#[derive(Debug, thiserror::Error)]
pub enum FillError {
    #[error("template not found at {}", path.display())]
    TemplateNotFound { path: PathBuf },
    #[error("failed to read template at {}: {source}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load form template: {0}")]
    TemplateLoad(#[source] TemplateError),
    #[error("failed to produce filled form: {0}")]
    Serialize(#[source] TemplateError),
}

/// Outcome counters for one fill, for diagnostics only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    pub checked: usize,
    pub unchecked: usize,
    pub text: usize,
    /// Mapped keys the template does not declare.
    pub skipped: Vec<String>,
    /// Keys whose assignment failed and were left at the template default.
    pub failed: Vec<String>,
}

/// Writes a [`FieldMap`] into a form template.
#[derive(Debug, Clone, Copy)]
pub struct FormFiller {
    text_font_size: f32,
}

impl Default for FormFiller {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_FONT_SIZE)
    }
}

impl FormFiller {
    pub fn new(text_font_size: f32) -> Self {
        Self { text_font_size }
    }

    pub fn text_font_size(&self) -> f32 {
        self.text_font_size
    }

    /// Applies every mapped key the document declares. Only keys present in
    /// `fields` are visited; template fields without a key keep their
    /// default state.
    pub fn apply<D>(&self, fields: &FieldMap, document: &mut D) -> FillReport
    where
        D: FormDocument + ?Sized,
    {
        let declared: HashMap<String, FieldKind> = document
            .field_names()
            .into_iter()
            .filter_map(|name| document.field_kind(&name).map(|kind| (name, kind)))
            .collect();
        let mut report = FillReport::default();

        for (key, value) in fields.iter() {
            let Some(kind) = declared.get(key).copied() else {
                debug!(field = key, "template has no field by this name; skipping");
                report.skipped.push(key.to_string());
                continue;
            };

            match self.assign(document, key, kind, value) {
                Ok(FieldKind::Checkbox) if value == CHECKED => report.checked += 1,
                Ok(FieldKind::Checkbox) => report.unchecked += 1,
                Ok(_) => report.text += 1,
                Err(err) => {
                    warn!(field = key, error = %err, "field assignment failed; leaving template default");
                    report.failed.push(key.to_string());
                }
            }
        }

        report
    }

    pub(crate) fn assign<D>(
        &self,
        document: &mut D,
        key: &str,
        kind: FieldKind,
        value: &str,
    ) -> Result<FieldKind, FieldError>
    where
        D: FormDocument + ?Sized,
    {
        match kind {
            FieldKind::Checkbox => document.set_checked(key, value == CHECKED)?,
            FieldKind::Text => document.set_text(key, value, self.text_font_size)?,
            FieldKind::Other => return Err(FieldError::Unsupported(key.to_string())),
        }
        Ok(kind)
    }

    /// Loads `template` with `engine`, applies `fields`, and serializes.
    pub fn fill_bytes<E>(
        &self,
        engine: &E,
        fields: &FieldMap,
        template: &[u8],
    ) -> Result<Vec<u8>, FillError>
    where
        E: TemplateEngine,
    {
        let mut document = engine.load(template).map_err(FillError::TemplateLoad)?;
        let report = self.apply(fields, &mut document);
        info!(
            checked = report.checked,
            unchecked = report.unchecked,
            text = report.text,
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "form fields applied"
        );
        document.save().map_err(FillError::Serialize)
    }

    /// Reads the template from disk and fills it.
    pub async fn fill<E>(
        &self,
        engine: &E,
        fields: &FieldMap,
        template_path: &Path,
    ) -> Result<Vec<u8>, FillError>
    where
        E: TemplateEngine,
    {
        let template = tokio::fs::read(template_path)
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => FillError::TemplateNotFound {
                    path: template_path.to_path_buf(),
                },
                _ => FillError::TemplateRead {
                    path: template_path.to_path_buf(),
                    source,
                },
            })?;

        self.fill_bytes(engine, fields, &template)
    }
}
