//! Boot-time error catalog.
//!
//! # Source format
//!
//! Each source is a YAML document declaring one default HTTP status and any
//! number of identifiers, each with a numeric code and one message per locale:
//!
//! ```yaml
//! http_status: 400
//! errors:
//!   ErrFieldBelowMinimum:
//!     code: "40002"
//!     en: "must be at least {}"
//!     id: "minimal {}"
//! ```
//!
//! `{}` placeholders are filled left to right with the arguments given where
//! the error is built.
//!
//! # Lifecycle
//!
//! Load every source, verify the identifiers the code references, then share
//! the catalog read-only (it ends up behind an `Arc` inside the dispatcher).
//! A referenced identifier missing from the catalog is a programming defect
//! and surfaces as [`CatalogError::Missing`] before any request is served.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use http::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::coded::{fill, CodedError};
use super::ids;
use crate::locale::Locale;

const BUILTIN_SOURCES: &[(&str, &str)] = &[
    ("400_error_list.yaml", include_str!("../../catalog/400_error_list.yaml")),
    ("401_error_list.yaml", include_str!("../../catalog/401_error_list.yaml")),
];

/// Boot-time catalog defects. None of these are recoverable at runtime.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read error catalog `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed error catalog `{origin}`: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("error catalog `{origin}` declares invalid http_status {status}")]
    InvalidStatus { origin: String, status: u16 },

    #[error("error `{id}` in `{origin}` has an invalid code `{code}`")]
    InvalidCode { origin: String, id: String, code: String },

    #[error("error `{id}` in `{origin}` has no code")]
    MissingCode { origin: String, id: String },

    #[error("error `{0}` is referenced but missing from the catalog")]
    Missing(String),
}

#[derive(Deserialize)]
struct RawSource {
    http_status: u16,
    #[serde(default)]
    errors: HashMap<String, RawEntry>,
}

#[derive(Deserialize)]
struct RawEntry {
    code: Option<RawCode>,
    #[serde(flatten)]
    messages: HashMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Number(u32),
    Text(String),
}

#[derive(Debug)]
struct Entry {
    status: StatusCode,
    code: u32,
    messages: BTreeMap<Locale, String>,
}

/// Caller-supplied attributes for errors the catalog does not know.
///
/// Used by [`Catalog::error`] for ad hoc domain errors. Unset status and code
/// default to 500.
#[derive(Clone, Debug, Default)]
pub struct ErrorAttrs {
    pub status: Option<StatusCode>,
    pub code: Option<u32>,
    pub messages: Vec<(Locale, String)>,
}

/// Identifier → {status, code, localized templates}.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: HashMap<String, Arc<Entry>>,
}

impl Catalog {
    /// An empty catalog. Feed it with [`load_str`](Self::load_str) or
    /// [`load_file`](Self::load_file).
    pub fn new() -> Self { Self::default() }

    /// Loads the embedded sources and checks that every identifier in
    /// [`ids::ALL`] resolves.
    pub fn builtin() -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for (origin, yaml) in BUILTIN_SOURCES {
            catalog.load_str(origin, yaml)?;
        }
        catalog.require(ids::ALL)?;
        Ok(catalog)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_owned(),
            source,
        })?;
        self.load_str(&path.display().to_string(), &yaml)
    }

    /// Merges one YAML source. `origin` names the source in logs and errors.
    ///
    /// An identifier already present is replaced.
    pub fn load_str(&mut self, origin: &str, yaml: &str) -> Result<(), CatalogError> {
        info!(origin, "loading error catalog");

        let raw: RawSource = serde_yaml::from_str(yaml).map_err(|source| CatalogError::Parse {
            origin: origin.to_owned(),
            source,
        })?;
        let status = StatusCode::from_u16(raw.http_status).map_err(|_| {
            CatalogError::InvalidStatus { origin: origin.to_owned(), status: raw.http_status }
        })?;

        let mut parsed = Vec::with_capacity(raw.errors.len());
        for (id, entry) in raw.errors {
            let code = match entry.code {
                Some(RawCode::Number(n)) => n,
                Some(RawCode::Text(text)) => text.trim().parse::<u32>().map_err(|_| {
                    CatalogError::InvalidCode { origin: origin.to_owned(), id: id.clone(), code: text }
                })?,
                None => {
                    return Err(CatalogError::MissingCode { origin: origin.to_owned(), id });
                }
            };

            let mut messages = BTreeMap::new();
            for (tag, message) in entry.messages {
                match tag.parse::<Locale>() {
                    Ok(locale) => { messages.insert(locale, message); }
                    Err(()) => warn!(origin, id, tag, "ignoring message for unsupported locale"),
                }
            }
            parsed.push((id, Entry { status, code, messages }));
        }

        for (id, entry) in parsed {
            debug!(origin, id, code = entry.code, "registering error");
            if self.entries.insert(id.clone(), Arc::new(entry)).is_some() {
                warn!(origin, id, "error identifier redefined, keeping the latest");
            }
        }
        Ok(())
    }

    /// Fails on the first identifier in `ids` the catalog does not define.
    pub fn require(&self, ids: &[&str]) -> Result<(), CatalogError> {
        match ids.iter().find(|id| !self.entries.contains_key(**id)) {
            Some(missing) => Err(CatalogError::Missing((*missing).to_owned())),
            None => Ok(()),
        }
    }

    /// Resolves a referenced identifier once, at boot.
    pub fn template(&self, id: &str) -> Result<Template, CatalogError> {
        let entry = self.entries.get(id).ok_or_else(|| CatalogError::Missing(id.to_owned()))?;
        Ok(Template { id: Arc::from(id), entry: Arc::clone(entry) })
    }

    /// Builds an error for `id`, filling its templates with `args`.
    ///
    /// Identifiers the catalog does not know are built from `attrs` instead
    /// (messages used as-is), with status and code defaulting to 500.
    pub fn error(&self, id: &str, attrs: Option<&ErrorAttrs>, args: &[&dyn fmt::Display]) -> CodedError {
        if let Some(entry) = self.entries.get(id) {
            return build(id, entry, args);
        }

        let attrs = attrs.cloned().unwrap_or_default();
        CodedError {
            id: id.to_owned(),
            code: attrs.code.unwrap_or(500),
            status: attrs.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            messages: attrs.messages.into_iter().collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool { self.entries.contains_key(id) }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// A catalog entry resolved at boot, ready to stamp out errors.
#[derive(Clone, Debug)]
pub struct Template {
    id: Arc<str>,
    entry: Arc<Entry>,
}

impl Template {
    pub fn id(&self) -> &str { &self.id }

    pub fn error(&self) -> CodedError {
        self.error_with(&[])
    }

    pub fn error_with(&self, args: &[&dyn fmt::Display]) -> CodedError {
        build(&self.id, &self.entry, args)
    }
}

fn build(id: &str, entry: &Entry, args: &[&dyn fmt::Display]) -> CodedError {
    CodedError {
        id: id.to_owned(),
        code: entry.code,
        status: entry.status,
        messages: entry.messages.iter().map(|(l, m)| (*l, fill(m, args))).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: &str = r#"
http_status: 409
errors:
  ErrDuplicateOrder:
    code: "40901"
    en: "order {} already exists"
    id: "pesanan {} sudah ada"
  ErrNeverReferenced:
    code: 40902
    en: "unused"
"#;

    #[test]
    fn builtin_catalog_covers_every_referenced_identifier() {
        let catalog = Catalog::builtin().unwrap();
        for id in ids::ALL {
            assert!(catalog.contains(id), "missing {id}");
        }
    }

    #[test]
    fn template_fills_arguments_per_locale() {
        let catalog = Catalog::builtin().unwrap();
        let below = catalog.template(ids::FIELD_BELOW_MINIMUM).unwrap();
        let err = below.error_with(&[&18]);

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), 40002);
        assert_eq!(err.localized(Locale::English), "must be at least 18");
        assert_eq!(err.localized(Locale::Bahasa), "minimal 18");
    }

    #[test]
    fn source_status_applies_to_every_entry() {
        let mut catalog = Catalog::new();
        catalog.load_str("domain.yaml", DOMAIN).unwrap();

        let err = catalog.error("ErrDuplicateOrder", None, &[&"A-1"]);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), 40901);
        assert_eq!(err.localized(Locale::Bahasa), "pesanan A-1 sudah ada");
        assert_eq!(catalog.error("ErrNeverReferenced", None, &[]).code(), 40902);
    }

    #[test]
    fn unknown_identifier_uses_attrs_then_500() {
        let catalog = Catalog::new();

        let attrs = ErrorAttrs {
            status: Some(StatusCode::FORBIDDEN),
            code: Some(40301),
            messages: vec![(Locale::English, "quota exhausted".to_owned())],
        };
        let err = catalog.error("ErrQuota", Some(&attrs), &[]);
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.code(), 40301);
        assert_eq!(err.localized(Locale::Bahasa), "quota exhausted");

        let bare = catalog.error("ErrSomething", None, &[]);
        assert_eq!(bare.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(bare.code(), 500);
        assert_eq!(bare.localized(Locale::English), "ErrSomething");
    }

    #[test]
    fn missing_reference_is_a_boot_error() {
        let mut catalog = Catalog::new();
        catalog.load_str("domain.yaml", DOMAIN).unwrap();

        assert!(matches!(
            catalog.template(ids::FIELD_REQUIRED),
            Err(CatalogError::Missing(id)) if id == ids::FIELD_REQUIRED
        ));
        assert!(catalog.require(&["ErrDuplicateOrder"]).is_ok());
        assert!(catalog.require(&["ErrDuplicateOrder", "ErrGhost"]).is_err());
    }

    #[test]
    fn structural_defects_are_rejected() {
        let mut catalog = Catalog::new();
        assert!(matches!(
            catalog.load_str("bad.yaml", "errors: [1, 2"),
            Err(CatalogError::Parse { .. })
        ));
        assert!(matches!(
            catalog.load_str("bad.yaml", "http_status: 400\nerrors:\n  ErrX:\n    code: \"4x\"\n"),
            Err(CatalogError::InvalidCode { .. })
        ));
        assert!(matches!(
            catalog.load_str("bad.yaml", "http_status: 400\nerrors:\n  ErrX:\n    en: \"no code\"\n"),
            Err(CatalogError::MissingCode { .. })
        ));
        assert!(matches!(
            catalog.load_str("bad.yaml", "http_status: 42\nerrors: {}\n"),
            Err(CatalogError::InvalidStatus { status: 42, .. })
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn missing_file_reports_path() {
        let mut catalog = Catalog::new();
        let err = catalog.load_file("/nonexistent/errors.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/errors.yaml"));
    }
}
