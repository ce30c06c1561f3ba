//! Unified error type for streamgate.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for HTTP handlers to derive a status code via [`Error::http_status`].

use std::fmt;

/// Generic message returned for every authorization failure. The concrete
/// reason (expired, bad signature) is only ever logged server-side.
pub const ACCESS_DENIED: &str = "Invalid or expired token. Access denied.";

/// Unified error type covering all failure modes in streamgate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "resource").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The request is not authorized.
    #[error("{0}")]
    Forbidden(String),

    /// The `Range` header could not be parsed.
    #[error("Malformed range: {0}")]
    MalformedRange(String),

    /// The `Range` header is well-formed but falls outside the resource.
    #[error("Range not satisfiable for resource of {size} bytes")]
    UnsatisfiableRange {
        /// Total size of the resource the range was resolved against.
        size: u64,
    },

    /// Input data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration could not be loaded or is unusable.
    #[error("Config error: {0}")]
    Config(String),

    /// Media metadata extraction failed.
    #[error("Probe error: {0}")]
    Probe(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Forbidden(_) => 403,
            Error::MalformedRange(_) => 400,
            Error::UnsatisfiableRange { .. } => 416,
            Error::Validation(_) => 400,
            Error::Config(_) => 500,
            Error::Probe(_) => 422,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// The single authorization failure surfaced to clients.
    pub fn access_denied() -> Self {
        Error::Forbidden(ACCESS_DENIED.to_string())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
