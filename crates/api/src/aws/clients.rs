//! AWS SDK client bundle.

use anyhow::Result;
use aws_config::{BehaviorVersion, Region};

/// Bundle of AWS SDK clients used by the service.
///
/// Clients share the same underlying [`aws_config::SdkConfig`] so that
/// credentials are resolved once and reused.
#[derive(Clone)]
pub struct AwsClients {
    /// KMS client used to generate and unwrap per-record data keys.
    pub kms: aws_sdk_kms::Client,
}

impl AwsClients {
    /// Initialise all AWS SDK clients for the given region.
    ///
    /// Credentials are resolved via the standard AWS credential chain
    /// (environment, profile, or attached role).
    ///
    /// # Errors
    ///
    /// Returns an error if the SDK config cannot be loaded.
    pub async fn init(region: &str) -> Result<Self> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_owned()))
            .load()
            .await;

        let kms = aws_sdk_kms::Client::new(&config);

        Ok(Self { kms })
    }
}
