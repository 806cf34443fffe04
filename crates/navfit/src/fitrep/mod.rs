//! FITREP record model, template field mapping, form filling, and storage.
//!
//! Data flows one way: [`Fitrep`] → [`map_fitrep`] → [`FieldMap`] →
//! [`FormFiller`] → PDF bytes. Persistence hangs off the record through
//! [`FitrepRepository`] and never touches the mapping pipeline.

pub mod fields;
pub mod filler;
pub mod mapper;
mod normalizer;
pub mod record;
pub mod repository;
pub mod service;
pub mod template;

#[cfg(test)]
mod tests;

pub use filler::{FillError, FillReport, FormFiller, DEFAULT_TEXT_FONT_SIZE};
pub use mapper::{map_fitrep, FieldMap};
pub use record::{
    ConcurrentSenior, ConcurrentSeniorParts, Fitrep, PerformanceTrait, PromotionRecommendation,
    ReportingSenior, SummaryGroup, TraitAverage, TraitScore, TraitScores, NOT_OBSERVED,
};
pub use repository::{
    FitrepRepository, FitrepSummary, RecordId, RepositoryError, SqliteFitrepRepository,
};
pub use service::{ExportError, FitrepService};
pub use template::{
    AcroFormDocument, AcroFormEngine, FieldError, FieldKind, FormDocument, TemplateEngine,
    TemplateError,
};
