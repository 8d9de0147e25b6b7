//! AES-256-GCM envelope encryption primitives.
//!
//! This module is intentionally free of AWS, HTTP, and database dependencies.
//! It provides the low-level seal/open operations used by the record pipeline.
//!
//! # Envelope format
//!
//! ```text
//! [ 12 bytes: IV ][ 16 bytes: auth tag ][ N bytes: ciphertext ]
//! ```
//!
//! The layout is fixed and self-describing; the authentication tag is the
//! system's only integrity check on stored sensitive data.

pub mod cipher;

pub use cipher::KEY_LEN;
