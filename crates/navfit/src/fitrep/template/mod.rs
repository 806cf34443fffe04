//! Fillable-form template capability.
//!
//! The filler only needs to load a template, enumerate its named fields,
//! set text or checked state, and serialize the result. [`TemplateEngine`]
//! and [`FormDocument`] describe exactly that so the filler can be driven by
//! the PDF adapter in production and by in-memory documents in tests.

mod acroform;

pub use acroform::{AcroFormDocument, AcroFormEngine};

/// Kind tag reported by the template for a named field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Checkbox,
    Text,
    /// Radio groups, push buttons, choice lists, signatures.
    Other,
}

/// The template bytes could not be parsed or re-serialized.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template is not a readable form document: {0}")]
    Parse(String),
    #[error("template has no interactive form fields")]
    MissingForm,
    #[error("failed to serialize filled form: {0}")]
    Serialize(String),
}

/// A single field assignment failed; the filler logs and continues.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("field '{0}' does not exist in the template")]
    Unknown(String),
    #[error("field '{name}' is a {actual:?} field, not {expected:?}")]
    KindMismatch {
        name: String,
        expected: FieldKind,
        actual: FieldKind,
    },
    #[error("field '{0}' is not a text or checkbox field")]
    Unsupported(String),
    #[error("field '{name}' could not be updated: {reason}")]
    Backend { name: String, reason: String },
}

/// An editable form loaded from a template.
pub trait FormDocument {
    /// Fully qualified names of every terminal field the form declares.
    fn field_names(&self) -> Vec<String>;

    fn field_kind(&self, name: &str) -> Option<FieldKind>;

    fn set_text(&mut self, name: &str, value: &str, font_size: f32) -> Result<(), FieldError>;

    fn set_checked(&mut self, name: &str, checked: bool) -> Result<(), FieldError>;

    /// Serializes the current state of the form.
    fn save(&mut self) -> Result<Vec<u8>, TemplateError>;
}

/// Loads templates into editable [`FormDocument`]s.
pub trait TemplateEngine: Send + Sync {
    type Document: FormDocument;

    fn load(&self, bytes: &[u8]) -> Result<Self::Document, TemplateError>;
}
