use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use lopdf::{dictionary, Document, Object};
use serde_json::Value;

use crate::fitrep::record::Fitrep;
use crate::fitrep::repository::{FitrepRepository, FitrepSummary, RecordId, RepositoryError};
use crate::fitrep::template::{
    FieldError, FieldKind, FormDocument, TemplateEngine, TemplateError,
};

pub(super) fn record_from(raw: Value) -> Fitrep {
    Fitrep::from_raw(&raw)
}

/// Template field set used by the fake engine: one `name:kind` per line.
pub(super) fn template_spec(fields: &[(&str, FieldKind)]) -> Vec<u8> {
    fields
        .iter()
        .map(|(name, kind)| {
            let tag = match kind {
                FieldKind::Checkbox => "checkbox",
                FieldKind::Text => "text",
                FieldKind::Other => "other",
            };
            format!("{name}:{tag}")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .into_bytes()
}

/// In-memory form recording every assignment.
#[derive(Debug, Default, Clone)]
pub(super) struct MemoryDocument {
    pub kinds: BTreeMap<String, FieldKind>,
    pub text: BTreeMap<String, (String, f32)>,
    pub checked: BTreeMap<String, bool>,
    pub failing: HashSet<String>,
}

impl MemoryDocument {
    pub fn with_fields(fields: &[(&str, FieldKind)]) -> Self {
        Self {
            kinds: fields
                .iter()
                .map(|(name, kind)| (name.to_string(), *kind))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    fn check_writable(&self, name: &str) -> Result<(), FieldError> {
        if self.failing.contains(name) {
            return Err(FieldError::Backend {
                name: name.to_string(),
                reason: "widget is read-only".to_string(),
            });
        }
        if !self.kinds.contains_key(name) {
            return Err(FieldError::Unknown(name.to_string()));
        }
        Ok(())
    }
}

impl FormDocument for MemoryDocument {
    fn field_names(&self) -> Vec<String> {
        self.kinds.keys().cloned().collect()
    }

    fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.kinds.get(name).copied()
    }

    fn set_text(&mut self, name: &str, value: &str, font_size: f32) -> Result<(), FieldError> {
        self.check_writable(name)?;
        self.text
            .insert(name.to_string(), (value.to_string(), font_size));
        Ok(())
    }

    fn set_checked(&mut self, name: &str, checked: bool) -> Result<(), FieldError> {
        self.check_writable(name)?;
        self.checked.insert(name.to_string(), checked);
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>, TemplateError> {
        serde_json::to_vec(&(&self.text, &self.checked))
            .map_err(|err| TemplateError::Serialize(err.to_string()))
    }
}

/// Loads [`template_spec`] bytes into a [`MemoryDocument`].
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct MemoryEngine;

impl TemplateEngine for MemoryEngine {
    type Document = MemoryDocument;

    fn load(&self, bytes: &[u8]) -> Result<MemoryDocument, TemplateError> {
        let spec = std::str::from_utf8(bytes).map_err(|err| TemplateError::Parse(err.to_string()))?;
        let mut document = MemoryDocument::default();
        for line in spec.lines().filter(|line| !line.trim().is_empty()) {
            let (name, tag) = line
                .split_once(':')
                .ok_or_else(|| TemplateError::Parse(format!("malformed field line '{line}'")))?;
            let kind = match tag {
                "checkbox" => FieldKind::Checkbox,
                "text" => FieldKind::Text,
                _ => FieldKind::Other,
            };
            document.kinds.insert(name.to_string(), kind);
        }
        Ok(document)
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    rows: Mutex<Vec<(RecordId, Fitrep)>>,
}

impl FitrepRepository for MemoryRepository {
    fn insert(&self, record: &Fitrep) -> Result<RecordId, RepositoryError> {
        let mut rows = self.rows.lock().expect("repository mutex poisoned");
        let id = RecordId(rows.len() as i64 + 1);
        rows.push((id, record.clone()));
        Ok(id)
    }

    fn list(&self) -> Result<Vec<FitrepSummary>, RepositoryError> {
        let rows = self.rows.lock().expect("repository mutex poisoned");
        Ok(rows
            .iter()
            .rev()
            .map(|(id, record)| FitrepSummary {
                id: *id,
                name: record.full_name.clone(),
                grade: record.rate.clone(),
            })
            .collect())
    }

    fn fetch(&self, id: RecordId) -> Result<Option<Fitrep>, RepositoryError> {
        let rows = self.rows.lock().expect("repository mutex poisoned");
        Ok(rows
            .iter()
            .find(|(row_id, _)| *row_id == id)
            .map(|(_, record)| record.clone()))
    }

    fn storage_path(&self) -> Option<&Path> {
        None
    }
}

/// Minimal one-page PDF whose AcroForm declares the given fields.
pub(super) fn acroform_template(fields: &[(&str, FieldKind)]) -> Vec<u8> {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();

    let mut field_refs = Vec::new();
    for (name, kind) in fields {
        let mut field = dictionary! {
            "Type" => Object::Name(b"Annot".to_vec()),
            "Subtype" => Object::Name(b"Widget".to_vec()),
            "T" => Object::string_literal(*name),
            "Rect" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(100),
                Object::Integer(20),
            ]),
        };
        match kind {
            FieldKind::Checkbox => {
                field.set("FT", Object::Name(b"Btn".to_vec()));
                field.set("V", Object::Name(b"Off".to_vec()));
                field.set("AS", Object::Name(b"Off".to_vec()));
                field.set(
                    "AP",
                    Object::Dictionary(dictionary! {
                        "N" => Object::Dictionary(dictionary! {
                            "Yes" => Object::Null,
                            "Off" => Object::Null,
                        }),
                    }),
                );
            }
            FieldKind::Text => {
                field.set("FT", Object::Name(b"Tx".to_vec()));
                field.set("V", Object::string_literal(""));
            }
            FieldKind::Other => {
                field.set("FT", Object::Name(b"Sig".to_vec()));
            }
        }
        field_refs.push(Object::Reference(document.add_object(field)));
    }

    let page_id = document.add_object(dictionary! {
        "Type" => Object::Name(b"Page".to_vec()),
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ]),
        "Annots" => Object::Array(field_refs.clone()),
    });
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => Object::Name(b"Pages".to_vec()),
            "Kids" => Object::Array(vec![Object::Reference(page_id)]),
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => Object::Name(b"Catalog".to_vec()),
        "Pages" => Object::Reference(pages_id),
        "AcroForm" => Object::Dictionary(dictionary! {
            "Fields" => Object::Array(field_refs),
        }),
    });
    document.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    document.save_to(&mut bytes).expect("template serializes");
    bytes
}

/// Reads a field's `/V` back out of saved PDF bytes.
pub(super) fn pdf_field_value(bytes: &[u8], name: &str) -> Option<Object> {
    let document = Document::load_mem(bytes).expect("filled form parses");
    document
        .objects
        .values()
        .filter_map(|object| object.as_dict().ok())
        .find(|field| {
            field
                .get(b"T")
                .ok()
                .and_then(|title| title.as_str().ok())
                .is_some_and(|title| title == name.as_bytes())
        })
        .and_then(|field| field.get(b"V").ok().cloned())
}

pub(super) fn checkbox_state(object: Option<Object>) -> String {
    match object {
        Some(Object::Name(name)) => String::from_utf8(name).expect("ascii state"),
        other => panic!("expected checkbox state, got {other:?}"),
    }
}
