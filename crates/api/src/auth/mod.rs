//! Bearer-token verification against the hosted identity provider.
//!
//! A credential is valid when its RS256 signature checks out against a key
//! from the pool's JWKS discovery document, it has not expired, and its
//! audience matches the configured app client. Everything else about the
//! failure is logged internally and collapsed to a single unauthorized
//! outcome — callers learn nothing about which check failed.

pub mod jwks;
pub mod verifier;

pub use jwks::{HttpJwksFetcher, JwksFetch};
pub use verifier::TokenVerifier;

use thiserror::Error;

/// The verified subject of a bearer credential.
///
/// Exists only within a request's processing; trusted for all downstream
/// ownership checks without further validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(String);

impl CallerId {
    pub fn new(sub: impl Into<String>) -> Self {
        Self(sub.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors produced by the verification layer.
///
/// Missing and invalid credentials are distinct failures (different
/// messages) but both map to 401 at the boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header was supplied.
    #[error("authorization header missing")]
    MissingToken,

    /// The credential failed one of signature, expiry, audience, key lookup,
    /// or key-set fetch. Which one is logged, never returned.
    #[error("token rejected")]
    InvalidToken,
}
