//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::Unauthenticated`] → 401
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::StoreRead`] / [`ServiceError::StoreWrite`] → 502
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed or missing a required value.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No user identity was supplied for an operation that needs one.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The referenced record does not exist in the store.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing record store failed a read.
    #[error("store read failed: {0}")]
    StoreRead(String),

    /// The backing record store failed a write. The caller may retry.
    #[error("store write failed: {0}")]
    StoreWrite(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Unauthenticated(_) => 401,
            ServiceError::NotFound(_) => 404,
            ServiceError::StoreRead(_) | ServiceError::StoreWrite(_) => 502,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Unauthenticated(_) => "unauthenticated",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::StoreRead(_) => "store_read_failed",
            ServiceError::StoreWrite(_) => "store_write_failed",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}
