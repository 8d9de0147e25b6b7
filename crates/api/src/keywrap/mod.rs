//! Per-record data-key generation and unwrapping via AWS KMS.
//!
//! # Lifecycle
//!
//! 1. On robot creation, [`KeyWrap::generate`] asks KMS for a fresh AES-256
//!    data key; the plaintext half seals the record's fields and is dropped,
//!    the wrapped half is stored on the robot row.
//! 2. On reads, [`KeyWrap::unwrap_key`] sends the stored wrapped bytes back
//!    to KMS with the same encryption context and receives the plaintext key
//!    for the duration of the request only.
//!
//! # Security invariants
//!
//! - Plaintext key bytes are **never** persisted, logged, or cached across
//!   requests.
//! - Mismatched encryption context or tampered wrapped bytes fail closed; a
//!   key-management failure aborts the enclosing operation, never falling
//!   back to plaintext storage.
//!
//! No retry, caching, or batching is added here; each call is one round trip.

use async_trait::async_trait;
use aws_sdk_kms::primitives::Blob;
use thiserror::Error;
use tracing::warn;

use crate::crypto::KEY_LEN;

/// Fixed encryption context bound to every generate/unwrap call. KMS refuses
/// to unwrap ciphertext produced under a different context.
pub const ENCRYPTION_CONTEXT: (&str, &str) = ("purpose", "robo-record");

/// Errors produced by the key-wrap layer.
#[derive(Debug, Error)]
pub enum KeyWrapError {
    /// The key-management call itself failed (network, permissions, context
    /// mismatch, tampered ciphertext). Detail is logged, not propagated.
    #[error("key-management call failed")]
    Kms,

    /// KMS answered but the key material was absent or not [`KEY_LEN`] bytes.
    #[error("key material invalid: {0}")]
    BadKeyMaterial(String),
}

/// Fixed-size buffer holding exactly [`KEY_LEN`] plaintext key bytes.
///
/// The memory is overwritten with zeroes on drop to minimise the window
/// during which plaintext key material lives in RAM.
pub struct DataKeyBytes(Box<[u8; KEY_LEN]>);

impl DataKeyBytes {
    /// Copy `bytes` into a key buffer.
    ///
    /// # Errors
    ///
    /// Returns [`KeyWrapError::BadKeyMaterial`] if the slice is not exactly
    /// [`KEY_LEN`] bytes.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, KeyWrapError> {
        if bytes.len() != KEY_LEN {
            return Err(KeyWrapError::BadKeyMaterial(format!(
                "expected {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl Drop for DataKeyBytes {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for DataKeyBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("DataKeyBytes([REDACTED])")
    }
}

/// A freshly generated data key: plaintext for sealing, wrapped for storage.
#[derive(Debug)]
pub struct GeneratedKey {
    pub plaintext: DataKeyBytes,
    pub wrapped: Vec<u8>,
}

/// Key-management operations needed by the record pipeline.
///
/// Injected as a trait object so the pipeline can be exercised with a
/// substitute instead of a process-wide client singleton.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyWrap: Send + Sync {
    /// Generate a new data key and its wrapped form.
    async fn generate(&self) -> Result<GeneratedKey, KeyWrapError>;

    /// Unwrap previously stored wrapped key bytes.
    async fn unwrap_key(&self, wrapped: &[u8]) -> Result<DataKeyBytes, KeyWrapError>;
}

/// Production [`KeyWrap`] backed by AWS KMS.
#[derive(Clone)]
pub struct KmsKeyWrap {
    kms: aws_sdk_kms::Client,
    key_id: String,
}

impl KmsKeyWrap {
    pub fn new(kms: aws_sdk_kms::Client, key_id: String) -> Self {
        Self { kms, key_id }
    }
}

#[async_trait]
impl KeyWrap for KmsKeyWrap {
    async fn generate(&self) -> Result<GeneratedKey, KeyWrapError> {
        let resp = self
            .kms
            .generate_data_key()
            .key_id(&self.key_id)
            .key_spec(aws_sdk_kms::types::DataKeySpec::Aes256)
            .encryption_context(ENCRYPTION_CONTEXT.0, ENCRYPTION_CONTEXT.1)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "KMS GenerateDataKey failed");
                KeyWrapError::Kms
            })?;

        let plaintext = resp
            .plaintext()
            .ok_or_else(|| KeyWrapError::BadKeyMaterial("no plaintext in response".into()))?;
        let wrapped = resp
            .ciphertext_blob()
            .ok_or_else(|| KeyWrapError::BadKeyMaterial("no ciphertext in response".into()))?;

        Ok(GeneratedKey {
            plaintext: DataKeyBytes::try_from_slice(plaintext.as_ref())?,
            wrapped: wrapped.as_ref().to_vec(),
        })
    }

    async fn unwrap_key(&self, wrapped: &[u8]) -> Result<DataKeyBytes, KeyWrapError> {
        let resp = self
            .kms
            .decrypt()
            .key_id(&self.key_id)
            .ciphertext_blob(Blob::new(wrapped))
            .encryption_context(ENCRYPTION_CONTEXT.0, ENCRYPTION_CONTEXT.1)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "KMS Decrypt failed");
                KeyWrapError::Kms
            })?;

        let plaintext = resp
            .plaintext()
            .ok_or_else(|| KeyWrapError::BadKeyMaterial("no plaintext in response".into()))?;
        DataKeyBytes::try_from_slice(plaintext.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length_key_material() {
        assert!(DataKeyBytes::try_from_slice(&[0u8; 16]).is_err());
        assert!(DataKeyBytes::try_from_slice(&[0u8; KEY_LEN]).is_ok());
    }

    #[test]
    fn key_bytes_redacted_in_debug() {
        let key = DataKeyBytes::try_from_slice(&[0xFFu8; KEY_LEN]).unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
    }

    #[tokio::test]
    async fn mock_substitutes_for_kms() {
        let mut mock = MockKeyWrap::new();
        mock.expect_unwrap_key()
            .returning(|_| DataKeyBytes::try_from_slice(&[0x42u8; KEY_LEN]));
        let key = mock.unwrap_key(b"wrapped").await.unwrap();
        assert_eq!(key.as_bytes(), &[0x42u8; KEY_LEN]);
    }
}
