//! Infrastructure error type.

use thiserror::Error;

use crate::errors::CatalogError;

/// Failures that stop the process from starting or serving.
///
/// Request-level failures are [`ApiError`](crate::errors::ApiError)s turned
/// into responses, never `Error`s.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid listen address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    #[error("error catalog: {0}")]
    Catalog(#[from] CatalogError),
}
