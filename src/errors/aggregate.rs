//! Field-keyed collection of validation errors.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value as Json};

use super::CodedError;
use crate::locale::Locale;

/// What a single field failed with.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldError {
    Coded(CodedError),
    Nested(Aggregate),
}

/// Validation outcome: one entry per failing field, keyed by display name.
///
/// Keys are kept sorted so the text rendering is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregate {
    fields: BTreeMap<String, FieldError>,
}

impl Aggregate {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, field: impl Into<String>, err: CodedError) {
        self.fields.insert(field.into(), FieldError::Coded(err));
    }

    pub fn insert_nested(&mut self, field: impl Into<String>, errs: Aggregate) {
        self.fields.insert(field.into(), FieldError::Nested(errs));
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> { self.fields.get(field) }
    pub fn contains(&self, field: &str) -> bool { self.fields.contains_key(field) }
    pub fn len(&self) -> usize { self.fields.len() }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Renders every message in `locale`, nesting objects for nested
    /// aggregates.
    pub fn localized(&self, locale: Locale) -> Json {
        let mut out = Map::with_capacity(self.fields.len());
        for (field, err) in &self.fields {
            let value = match err {
                FieldError::Coded(e) => Json::String(e.localized(locale).to_owned()),
                FieldError::Nested(inner) => inner.localized(locale),
            };
            out.insert(field.clone(), value);
        }
        Json::Object(out)
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return Ok(());
        }
        for (i, (field, err)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            match err {
                FieldError::Coded(e) => write!(f, "{field}: {e}")?,
                FieldError::Nested(inner) => write!(f, "{field}: ({inner})")?,
            }
        }
        f.write_str(".")
    }
}

impl std::error::Error for Aggregate {}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use serde_json::json;

    use super::*;

    fn coded(id: &str, en: &str, id_msg: &str) -> CodedError {
        CodedError {
            id: id.to_owned(),
            code: 40001,
            status: StatusCode::BAD_REQUEST,
            messages: [(Locale::English, en.to_owned()), (Locale::Bahasa, id_msg.to_owned())]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn display_sorts_keys_and_nests() {
        let mut address = Aggregate::new();
        address.insert("city", coded("ErrFieldRequired", "field is required", "wajib diisi"));

        let mut errs = Aggregate::new();
        errs.insert("name", coded("ErrFieldRequired", "field is required", "wajib diisi"));
        errs.insert_nested("address", address);
        errs.insert("age", coded("ErrFieldBelowMinimum", "must be at least 18", "minimal 18"));

        assert_eq!(
            errs.to_string(),
            "address: (city: field is required.); age: must be at least 18; name: field is required.",
        );
    }

    #[test]
    fn empty_renders_as_empty_string() {
        assert_eq!(Aggregate::new().to_string(), "");
    }

    #[test]
    fn localized_builds_nested_objects() {
        let mut address = Aggregate::new();
        address.insert("city", coded("ErrFieldRequired", "field is required", "wajib diisi"));
        let mut errs = Aggregate::new();
        errs.insert("name", coded("ErrFieldRequired", "field is required", "wajib diisi"));
        errs.insert_nested("address", address);

        assert_eq!(
            errs.localized(Locale::Bahasa),
            json!({ "name": "wajib diisi", "address": { "city": "wajib diisi" } }),
        );
    }
}
