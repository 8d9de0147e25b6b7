//! JWKS discovery fetch for the identity pool's public signing keys.

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use tracing::warn;

use super::AuthError;

/// Source of the identity pool's public key set.
///
/// Injected into [`super::TokenVerifier`] so tests can substitute a canned
/// key set for the network fetch. The production impl performs one HTTP GET
/// per call; any caching a surrounding process layers on top is an
/// optimisation the verifier must work correctly without.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JwksFetch: Send + Sync {
    /// Fetch the current key set.
    ///
    /// A fetch failure is a verification failure, not a separate error
    /// class: it surfaces as [`AuthError::InvalidToken`].
    async fn fetch(&self) -> Result<JwkSet, AuthError>;
}

/// [`JwksFetch`] backed by the well-known discovery URL
/// `https://cognito-idp.{region}.amazonaws.com/{pool}/.well-known/jwks.json`.
pub struct HttpJwksFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpJwksFetcher {
    /// Build a fetcher for the given authority region and identity pool.
    pub fn new(region: &str, user_pool_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!(
                "https://cognito-idp.{region}.amazonaws.com/{user_pool_id}/.well-known/jwks.json"
            ),
        }
    }
}

#[async_trait]
impl JwksFetch for HttpJwksFetcher {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(error = %e, "JWKS fetch failed");
                AuthError::InvalidToken
            })?;

        resp.json::<JwkSet>().await.map_err(|e| {
            warn!(error = %e, "JWKS response was not a valid key set");
            AuthError::InvalidToken
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_follows_discovery_convention() {
        let fetcher = HttpJwksFetcher::new("us-east-1", "us-east-1_AbCdEf123");
        assert_eq!(
            fetcher.url,
            "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_AbCdEf123/.well-known/jwks.json"
        );
    }
}
