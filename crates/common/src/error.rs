//! Common error types shared across crates.

use thiserror::Error;

/// Top-level API error taxonomy.
///
/// The set is closed; every handler-level failure maps to exactly one
/// variant, and each variant maps to exactly one HTTP status at the server
/// boundary:
/// - [`ApiError::Unauthorized`] → 401
/// - [`ApiError::BadRequest`] → 400
/// - [`ApiError::Forbidden`] → 403
/// - [`ApiError::NotFound`] → 404
/// - [`ApiError::Conflict`] → 409
/// - [`ApiError::Internal`] → 500
///
/// Key-management and cipher failures have no variant of their own; they
/// surface as [`ApiError::Internal`] with the detail logged, never echoed.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The credential was missing, malformed, expired, or failed verification.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A required request field was missing or invalid.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The caller does not own the record (or it does not exist).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The record does not exist (or the caller does not own it).
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated (duplicate robot code).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Anything else, including key-management and cipher failures.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::Unauthorized(_) => 401,
            ApiError::BadRequest(_) => 400,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Internal(_) => 500,
        }
    }

    /// The message rendered into the `{"message": ...}` error body.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized(m)
            | ApiError::BadRequest(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m)
            | ApiError::Internal(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ApiError::Unauthorized("x".into()).http_status(), 401);
        assert_eq!(ApiError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(ApiError::Forbidden("x".into()).http_status(), 403);
        assert_eq!(ApiError::NotFound("x".into()).http_status(), 404);
        assert_eq!(ApiError::Conflict("x".into()).http_status(), 409);
        assert_eq!(ApiError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn message_is_body_text() {
        let e = ApiError::Conflict("Já existe um robô com este código.".into());
        assert_eq!(e.message(), "Já existe um robô com este código.");
        assert!(e.to_string().contains("conflict"));
    }
}
