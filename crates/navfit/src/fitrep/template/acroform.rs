use std::collections::BTreeMap;
use std::fmt;

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use super::{FieldError, FieldKind, FormDocument, TemplateEngine, TemplateError};

const RADIO_FLAG: i64 = 1 << 15;
const PUSHBUTTON_FLAG: i64 = 1 << 16;
const MAX_FIELD_DEPTH: usize = 32;
const OFF_STATE: &[u8] = b"Off";
const DEFAULT_ON_STATE: &[u8] = b"Yes";

/// Loads PDF AcroForm templates through `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcroFormEngine;

impl TemplateEngine for AcroFormEngine {
    type Document = AcroFormDocument;

    fn load(&self, bytes: &[u8]) -> Result<AcroFormDocument, TemplateError> {
        let document =
            Document::load_mem(bytes).map_err(|err| TemplateError::Parse(err.to_string()))?;
        AcroFormDocument::from_document(document)
    }
}

#[derive(Debug, Clone)]
struct FieldSlot {
    id: ObjectId,
    kind: FieldKind,
    widgets: Vec<ObjectId>,
}

#[derive(Debug, Clone, Default)]
struct Inherited {
    field_type: Option<Vec<u8>>,
    flags: i64,
}

/// A loaded PDF with its terminal form fields indexed by full name.
pub struct AcroFormDocument {
    document: Document,
    fields: BTreeMap<String, FieldSlot>,
}

impl fmt::Debug for AcroFormDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcroFormDocument")
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}

impl AcroFormDocument {
    pub fn from_document(document: Document) -> Result<Self, TemplateError> {
        let roots = field_roots(&document)?;
        let mut fields = BTreeMap::new();
        for root in roots {
            collect_fields(&document, root, None, Inherited::default(), 0, &mut fields);
        }

        Ok(Self { document, fields })
    }

    fn slot(&self, name: &str, expected: FieldKind) -> Result<FieldSlot, FieldError> {
        let slot = self
            .fields
            .get(name)
            .ok_or_else(|| FieldError::Unknown(name.to_string()))?;
        if slot.kind != expected {
            return Err(FieldError::KindMismatch {
                name: name.to_string(),
                expected,
                actual: slot.kind,
            });
        }
        Ok(slot.clone())
    }

    fn update<F>(&mut self, name: &str, id: ObjectId, apply: F) -> Result<(), FieldError>
    where
        F: FnOnce(&mut Dictionary),
    {
        let dictionary = self
            .document
            .get_object_mut(id)
            .and_then(|object| object.as_dict_mut())
            .map_err(|err| FieldError::Backend {
                name: name.to_string(),
                reason: err.to_string(),
            })?;
        apply(dictionary);
        Ok(())
    }

    /// The appearance state a widget shows when checked; `/Yes` unless the
    /// widget's normal appearance dictionary names another on-state.
    fn on_state(&self, slot: &FieldSlot) -> Vec<u8> {
        slot.widgets
            .iter()
            .filter_map(|widget| self.document.get_object(*widget).ok())
            .filter_map(|object| object.as_dict().ok())
            .filter_map(|widget| widget.get(b"AP").ok())
            .filter_map(|appearance| resolve(&self.document, appearance))
            .filter_map(|appearance| appearance.as_dict().ok())
            .filter_map(|appearance| appearance.get(b"N").ok())
            .filter_map(|normal| resolve(&self.document, normal))
            .filter_map(|normal| normal.as_dict().ok())
            .flat_map(|normal| normal.iter().map(|(state, _)| state.clone()))
            .find(|state| state.as_slice() != OFF_STATE)
            .unwrap_or_else(|| DEFAULT_ON_STATE.to_vec())
    }

    fn request_appearance_regeneration(&mut self) -> Result<(), TemplateError> {
        let root = catalog_id(&self.document)?;
        let acroform_ref = {
            let catalog = self
                .document
                .get_object(root)
                .and_then(|object| object.as_dict())
                .map_err(|_| TemplateError::MissingForm)?;
            match catalog.get(b"AcroForm") {
                Ok(Object::Reference(id)) => Some(*id),
                Ok(_) => None,
                Err(_) => return Err(TemplateError::MissingForm),
            }
        };

        let acroform = match acroform_ref {
            Some(id) => self
                .document
                .get_object_mut(id)
                .and_then(|object| object.as_dict_mut()),
            None => self
                .document
                .get_object_mut(root)
                .and_then(|object| object.as_dict_mut())
                .and_then(|catalog| catalog.get_mut(b"AcroForm"))
                .and_then(|object| object.as_dict_mut()),
        }
        .map_err(|err| TemplateError::Serialize(err.to_string()))?;

        acroform.set("NeedAppearances", Object::Boolean(true));
        Ok(())
    }
}

impl FormDocument for AcroFormDocument {
    fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).map(|slot| slot.kind)
    }

    fn set_text(&mut self, name: &str, value: &str, font_size: f32) -> Result<(), FieldError> {
        let slot = self.slot(name, FieldKind::Text)?;
        let appearance = format!("/Helv {font_size} Tf 0 g");
        let encoded = encode_text_string(value);

        self.update(name, slot.id, |field| {
            field.set("V", Object::String(encoded, StringFormat::Literal));
            field.set("DA", Object::string_literal(appearance.clone()));
        })?;
        // Stale appearance streams would keep showing the template's blank
        // text; viewers rebuild them because NeedAppearances is set on save.
        // Viewers and print paths that ignore that flag render these fields
        // empty until an appearance stream is generated here.
        for widget in &slot.widgets {
            let appearance = appearance.clone();
            self.update(name, *widget, |widget| {
                widget.remove(b"AP");
                widget.set("DA", Object::string_literal(appearance));
            })?;
        }
        Ok(())
    }

    fn set_checked(&mut self, name: &str, checked: bool) -> Result<(), FieldError> {
        let slot = self.slot(name, FieldKind::Checkbox)?;
        let state = if checked {
            self.on_state(&slot)
        } else {
            OFF_STATE.to_vec()
        };

        let value = state.clone();
        self.update(name, slot.id, |field| field.set("V", Object::Name(value)))?;
        for widget in &slot.widgets {
            let state = state.clone();
            self.update(name, *widget, |widget| widget.set("AS", Object::Name(state)))?;
        }
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>, TemplateError> {
        self.request_appearance_regeneration()?;
        let mut buffer = Vec::new();
        self.document
            .save_to(&mut buffer)
            .map_err(|err| TemplateError::Serialize(err.to_string()))?;
        Ok(buffer)
    }
}

fn catalog_id(document: &Document) -> Result<ObjectId, TemplateError> {
    document
        .trailer
        .get(b"Root")
        .and_then(|root| root.as_reference())
        .map_err(|_| TemplateError::MissingForm)
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn field_roots(document: &Document) -> Result<Vec<ObjectId>, TemplateError> {
    let catalog = document
        .get_object(catalog_id(document)?)
        .and_then(|object| object.as_dict())
        .map_err(|err| TemplateError::Parse(err.to_string()))?;
    let acroform = catalog
        .get(b"AcroForm")
        .ok()
        .and_then(|acroform| resolve(document, acroform))
        .and_then(|acroform| acroform.as_dict().ok())
        .ok_or(TemplateError::MissingForm)?;
    let fields = acroform
        .get(b"Fields")
        .ok()
        .and_then(|fields| resolve(document, fields))
        .and_then(|fields| fields.as_array().ok())
        .ok_or(TemplateError::MissingForm)?;

    Ok(fields
        .iter()
        .filter_map(|field| field.as_reference().ok())
        .collect())
}

fn has_partial_name(document: &Document, id: ObjectId) -> bool {
    document
        .get_object(id)
        .and_then(|object| object.as_dict())
        .map(|dictionary| dictionary.has(b"T"))
        .unwrap_or(false)
}

/// Walks the field tree; kids carrying a `/T` are child fields, kids without
/// one are widget annotations of the current field.
fn collect_fields(
    document: &Document,
    id: ObjectId,
    parent_name: Option<&str>,
    inherited: Inherited,
    depth: usize,
    out: &mut BTreeMap<String, FieldSlot>,
) {
    if depth > MAX_FIELD_DEPTH {
        return;
    }
    let Some(dictionary) = document
        .get_object(id)
        .ok()
        .and_then(|object| object.as_dict().ok())
    else {
        return;
    };

    let partial = dictionary
        .get(b"T")
        .ok()
        .and_then(|title| title.as_str().ok())
        .map(decode_text_string);
    let name = match (parent_name, partial) {
        (Some(parent), Some(partial)) => format!("{parent}.{partial}"),
        (None, Some(partial)) => partial,
        (Some(parent), None) => parent.to_string(),
        (None, None) => return,
    };

    let inherited = Inherited {
        field_type: dictionary
            .get(b"FT")
            .ok()
            .and_then(|field_type| field_type.as_name().ok())
            .map(<[u8]>::to_vec)
            .or(inherited.field_type),
        flags: dictionary
            .get(b"Ff")
            .ok()
            .and_then(|flags| flags.as_i64().ok())
            .unwrap_or(inherited.flags),
    };

    let kids: Vec<ObjectId> = dictionary
        .get(b"Kids")
        .ok()
        .and_then(|kids| resolve(document, kids))
        .and_then(|kids| kids.as_array().ok())
        .map(|kids| kids.iter().filter_map(|kid| kid.as_reference().ok()).collect())
        .unwrap_or_default();
    let (child_fields, widgets): (Vec<ObjectId>, Vec<ObjectId>) = kids
        .into_iter()
        .partition(|kid| has_partial_name(document, *kid));

    if !child_fields.is_empty() {
        for child in child_fields {
            collect_fields(
                document,
                child,
                Some(&name),
                inherited.clone(),
                depth + 1,
                out,
            );
        }
        return;
    }

    let widgets = if widgets.is_empty() { vec![id] } else { widgets };
    out.insert(
        name,
        FieldSlot {
            id,
            kind: classify(&inherited),
            widgets,
        },
    );
}

fn classify(inherited: &Inherited) -> FieldKind {
    match inherited.field_type.as_deref() {
        Some(b"Tx") => FieldKind::Text,
        Some(b"Btn") if inherited.flags & (RADIO_FLAG | PUSHBUTTON_FLAG) == 0 => {
            FieldKind::Checkbox
        }
        _ => FieldKind::Other,
    }
}

/// PDF text strings are either UTF-16BE with a byte-order mark or
/// single-byte PDFDocEncoding (treated as Latin-1 here).
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&byte| char::from(byte)).collect(),
    }
}

fn encode_text_string(value: &str) -> Vec<u8> {
    if value.is_ascii() {
        return value.as_bytes().to_vec();
    }

    let mut encoded = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        encoded.extend_from_slice(&unit.to_be_bytes());
    }
    encoded
}
