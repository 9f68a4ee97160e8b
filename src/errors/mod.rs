//! Request-scoped error model.
//!
//! Three kinds of failure reach a response helper:
//!
//! | Variant | Built from | Response |
//! |---|---|---|
//! | [`ApiError::Coded`] | a catalog identifier | the error's own status and code, localized description |
//! | [`ApiError::Aggregate`] | validation | `400` with a localized field map (via `bad_input`) |
//! | [`ApiError::Plain`] | anything else | the helper's default status, generic description |
//!
//! Catalog and identifiers live alongside: the catalog is loaded once at boot
//! and every [`CodedError`] is stamped out of it.

mod aggregate;
mod catalog;
mod coded;
pub mod ids;

use std::fmt;

use thiserror::Error;

pub use aggregate::{Aggregate, FieldError};
pub use catalog::{Catalog, CatalogError, ErrorAttrs, Template};
pub use coded::CodedError;

/// Any failure a handler hands to a response helper.
#[derive(Clone, Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Coded(#[from] CodedError),

    #[error(transparent)]
    Aggregate(#[from] Aggregate),

    #[error("{0}")]
    Plain(String),
}

impl ApiError {
    /// Wraps any displayable error as [`ApiError::Plain`].
    pub fn plain(err: impl fmt::Display) -> Self {
        Self::Plain(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::plain(err)
    }
}
