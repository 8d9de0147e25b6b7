//! AES-256-GCM sealing and opening of opaque byte payloads.
//!
//! A fresh random 96-bit IV is generated per seal; an IV is never reused
//! under a given key. The stored envelope is `IV ‖ tag ‖ ciphertext` with
//! fixed 12/16-byte offsets.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM IV (12 bytes = 96 bits).
pub const IV_LEN: usize = 12;

/// Byte length of the GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

/// Smallest well-formed non-empty envelope: IV + tag, zero ciphertext bytes.
pub const MIN_ENVELOPE_LEN: usize = IV_LEN + TAG_LEN;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The data key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid data key length: expected {KEY_LEN} bytes")]
    InvalidKeyLength,

    /// The envelope is non-empty but shorter than IV + tag.
    #[error("envelope truncated: {0} bytes, need at least {MIN_ENVELOPE_LEN}")]
    TruncatedEnvelope(usize),

    /// Authentication failed: wrong key or tampered IV/tag/ciphertext.
    #[error("aead operation failed")]
    AeadFailure,
}

/// Seal `plaintext` under `key`, producing an `IV ‖ tag ‖ ciphertext` envelope.
///
/// Empty plaintext still yields a well-formed 28-byte envelope, so the
/// round-trip property holds unconditionally.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::AeadFailure`] on an internal AEAD error (unreachable
/// with a valid key and IV).
pub fn seal(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;

    // Use OsRng for a cryptographically secure random IV.
    use aes_gcm::aead::rand_core::RngCore;
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    // RustCrypto emits ciphertext ‖ tag; the stored layout wants the tag
    // up front, after the IV.
    let ct_and_tag = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| CipherError::AeadFailure)?;
    let (ciphertext, tag) = ct_and_tag.split_at(ct_and_tag.len() - TAG_LEN);

    let mut envelope = Vec::with_capacity(MIN_ENVELOPE_LEN + ciphertext.len());
    envelope.extend_from_slice(&iv);
    envelope.extend_from_slice(tag);
    envelope.extend_from_slice(ciphertext);
    Ok(envelope)
}

/// Open an envelope back to plaintext bytes.
///
/// A zero-length envelope opens to empty without invoking the cipher; this
/// is the stored representation of cleared/legacy-empty fields.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::TruncatedEnvelope`] if the envelope is non-empty but
/// shorter than [`MIN_ENVELOPE_LEN`].
/// Returns [`CipherError::AeadFailure`] if authentication fails; no partial
/// plaintext is ever returned.
pub fn open(envelope: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    if envelope.is_empty() {
        return Ok(Vec::new());
    }
    let cipher = build_cipher(key)?;
    if envelope.len() < MIN_ENVELOPE_LEN {
        return Err(CipherError::TruncatedEnvelope(envelope.len()));
    }

    let (iv, rest) = envelope.split_at(IV_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    let mut ct_and_tag = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    ct_and_tag.extend_from_slice(ciphertext);
    ct_and_tag.extend_from_slice(tag);

    cipher
        .decrypt(Nonce::from_slice(iv), ct_and_tag.as_ref())
        .map_err(|_| CipherError::AeadFailure)
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength);
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_key() -> Vec<u8> {
        use aes_gcm::aead::rand_core::RngCore;
        let mut key = vec![0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        key
    }

    #[test]
    fn seal_open_round_trip() {
        let key = random_key();
        for plaintext in [
            &b""[..],
            &b"x"[..],
            &br#"{"lang":"pt"}"#[..],
            &[0xAB; 4096][..],
        ] {
            let envelope = seal(plaintext, &key).unwrap();
            assert_eq!(envelope.len(), MIN_ENVELOPE_LEN + plaintext.len());
            let opened = open(&envelope, &key).unwrap();
            assert_eq!(opened, plaintext);
        }
    }

    #[test]
    fn empty_envelope_opens_to_empty() {
        let key = random_key();
        assert!(open(&[], &key).unwrap().is_empty());
        // Short-circuits before the key is even inspected.
        assert!(open(&[], &[0u8; 7]).unwrap().is_empty());
    }

    #[test]
    fn empty_plaintext_still_produces_real_envelope() {
        let key = random_key();
        let envelope = seal(b"", &key).unwrap();
        assert_eq!(envelope.len(), MIN_ENVELOPE_LEN);
        assert!(open(&envelope, &key).unwrap().is_empty());
    }

    #[test]
    fn truncated_envelope_rejected() {
        let key = random_key();
        for len in 1..MIN_ENVELOPE_LEN {
            let err = open(&vec![0u8; len], &key).unwrap_err();
            assert!(matches!(err, CipherError::TruncatedEnvelope(l) if l == len));
        }
    }

    #[test]
    fn any_flipped_bit_fails_closed() {
        let key = random_key();
        let envelope = seal(b"conversa secreta", &key).unwrap();
        // Covers a byte in each region: IV, tag, ciphertext.
        for idx in [0, 5, IV_LEN, IV_LEN + TAG_LEN - 1, MIN_ENVELOPE_LEN, envelope.len() - 1] {
            let mut tampered = envelope.clone();
            tampered[idx] ^= 0x01;
            assert!(
                open(&tampered, &key).is_err(),
                "bit flip at byte {idx} was not detected"
            );
        }
    }

    #[test]
    fn wrong_key_fails_closed() {
        let envelope = seal(b"secret", &random_key()).unwrap();
        assert!(matches!(
            open(&envelope, &random_key()),
            Err(CipherError::AeadFailure)
        ));
    }

    #[test]
    fn invalid_key_length_rejected() {
        let short_key = vec![0u8; 16];
        assert!(matches!(
            seal(b"x", &short_key),
            Err(CipherError::InvalidKeyLength)
        ));
        assert!(matches!(
            open(&[0u8; 40], &short_key),
            Err(CipherError::InvalidKeyLength)
        ));
    }

    #[test]
    fn iv_is_fresh_per_seal() {
        let key = random_key();
        let a = seal(b"same plaintext", &key).unwrap();
        let b = seal(b"same plaintext", &key).unwrap();
        assert_ne!(a[..IV_LEN], b[..IV_LEN]);
        assert_ne!(a, b);
    }
}
