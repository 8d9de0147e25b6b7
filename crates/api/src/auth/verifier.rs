//! Credential verification: scheme strip, key resolution, one-shot decode.

use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::warn;

use super::{AuthError, CallerId, JwksFetch};

/// Claims extracted from a verified credential. Only the subject is used;
/// expiry and audience are enforced by the decoder itself.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Verifies bearer credentials and yields the caller's identity.
pub struct TokenVerifier {
    fetcher: Arc<dyn JwksFetch>,
    audience: String,
}

impl TokenVerifier {
    pub fn new(fetcher: Arc<dyn JwksFetch>, audience: String) -> Self {
        Self { fetcher, audience }
    }

    /// Verify the raw `Authorization` header value and return the caller.
    ///
    /// Signature, expiry, and audience are checked in one atomic decode; any
    /// failure — bad signature, expired token, wrong audience, malformed
    /// token, unknown key id, key-set fetch failure — collapses to
    /// [`AuthError::InvalidToken`] with the detail logged only.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingToken`] when `header` is `None`;
    /// [`AuthError::InvalidToken`] for every other failure.
    pub async fn authorize(&self, header: Option<&str>) -> Result<CallerId, AuthError> {
        let raw = header.ok_or(AuthError::MissingToken)?;
        let token = strip_bearer(raw);

        let header = decode_header(token).map_err(|e| {
            warn!(error = %e, "credential header undecodable");
            AuthError::InvalidToken
        })?;
        let kid = header.kid.ok_or_else(|| {
            warn!("credential header carries no key id");
            AuthError::InvalidToken
        })?;

        let jwks = self.fetcher.fetch().await?;
        let jwk = jwks.find(&kid).ok_or_else(|| {
            warn!(kid = %kid, "key id not present in key set");
            AuthError::InvalidToken
        })?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| {
            warn!(error = %e, "signing key unusable");
            AuthError::InvalidToken
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
            warn!(error = %e, "credential rejected");
            AuthError::InvalidToken
        })?;

        Ok(CallerId::new(data.claims.sub))
    }
}

/// Strip a case-insensitive `Bearer` scheme marker and surrounding whitespace.
fn strip_bearer(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer") => trimmed[6..].trim_start(),
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::super::jwks::MockJwksFetch;
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use jsonwebtoken::jwk::JwkSet;

    fn verifier_with(jwks: JwkSet) -> TokenVerifier {
        let mut fetcher = MockJwksFetch::new();
        fetcher.expect_fetch().returning(move || Ok(jwks.clone()));
        TokenVerifier::new(Arc::new(fetcher), "app-client-id".into())
    }

    fn empty_jwks() -> JwkSet {
        serde_json::from_str(r#"{"keys":[]}"#).unwrap()
    }

    /// Structurally valid JWT (header decodes, kid present) with a junk
    /// signature — enough to get past `decode_header`.
    fn token_with_kid(kid: &str) -> String {
        let header = URL_SAFE_NO_PAD
            .encode(format!(r#"{{"alg":"RS256","typ":"JWT","kid":"{kid}"}}"#));
        let claims = URL_SAFE_NO_PAD.encode(r#"{"sub":"u1","exp":4102444800}"#);
        let sig = URL_SAFE_NO_PAD.encode("nonsense");
        format!("{header}.{claims}.{sig}")
    }

    #[test]
    fn strip_bearer_variants() {
        assert_eq!(strip_bearer("Bearer abc"), "abc");
        assert_eq!(strip_bearer("bearer abc"), "abc");
        assert_eq!(strip_bearer("BEARER   abc"), "abc");
        assert_eq!(strip_bearer("  Bearer abc  "), "abc");
        assert_eq!(strip_bearer("abc"), "abc");
        assert_eq!(strip_bearer(""), "");
        // Multibyte input must not panic on the prefix probe.
        assert_eq!(strip_bearer("áé"), "áé");
    }

    #[tokio::test]
    async fn missing_header_is_distinct_failure() {
        let verifier = verifier_with(empty_jwks());
        assert_eq!(
            verifier.authorize(None).await.unwrap_err(),
            AuthError::MissingToken
        );
    }

    #[tokio::test]
    async fn garbage_token_collapses_to_invalid() {
        let verifier = verifier_with(empty_jwks());
        assert_eq!(
            verifier.authorize(Some("Bearer not-a-jwt")).await.unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[tokio::test]
    async fn unknown_kid_collapses_to_invalid() {
        let verifier = verifier_with(empty_jwks());
        let token = token_with_kid("key-that-does-not-exist");
        assert_eq!(
            verifier.authorize(Some(&token)).await.unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[tokio::test]
    async fn missing_kid_collapses_to_invalid() {
        let verifier = verifier_with(empty_jwks());
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(r#"{"sub":"u1"}"#);
        let token = format!("{header}.{claims}.{}", URL_SAFE_NO_PAD.encode("sig"));
        assert_eq!(
            verifier.authorize(Some(&token)).await.unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[tokio::test]
    async fn fetch_failure_is_a_verification_failure() {
        let mut fetcher = MockJwksFetch::new();
        fetcher
            .expect_fetch()
            .returning(|| Err(AuthError::InvalidToken));
        let verifier = TokenVerifier::new(Arc::new(fetcher), "app-client-id".into());
        let token = token_with_kid("k1");
        assert_eq!(
            verifier.authorize(Some(&token)).await.unwrap_err(),
            AuthError::InvalidToken
        );
    }
}
