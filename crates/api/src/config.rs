//! Configuration loading and validation for the admin service.
//!
//! All values are read from environment variables at startup. The process
//! will exit with a clear error message if any required variable is missing
//! or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Identity-pool identifier of the hosted identity provider. **Required.**
    pub user_pool_id: String,

    /// Application client identifier; the expected token audience. **Required.**
    pub app_client_id: String,

    /// Relational-store host. **Required.**
    pub db_host: String,

    /// Relational-store database name. **Required.**
    pub db_name: String,

    /// Relational-store user. **Required.**
    pub db_user: String,

    /// Relational-store password. **Required.**
    pub db_password: String,

    /// Relational-store port.
    #[serde(default = "default_db_port")]
    pub db_port: u16,

    /// Master key identifier for the key-management service. **Required.**
    pub kms_key_id: String,

    /// AWS region of both the identity provider and the key-management
    /// service.
    #[serde(default = "default_aws_region")]
    pub aws_region: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_db_port() -> u16 {
    5432
}
fn default_aws_region() -> String {
    "us-east-1".into()
}
fn default_http_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.user_pool_id, "USER_POOL_ID")?;
        ensure_non_empty(&self.app_client_id, "APP_CLIENT_ID")?;
        ensure_non_empty(&self.db_host, "DB_HOST")?;
        ensure_non_empty(&self.db_name, "DB_NAME")?;
        ensure_non_empty(&self.db_user, "DB_USER")?;
        ensure_non_empty(&self.db_password, "DB_PASSWORD")?;
        ensure_non_empty(&self.kms_key_id, "KMS_KEY_ID")?;
        ensure_non_empty(&self.aws_region, "AWS_REGION")?;
        Ok(())
    }

    /// Connection options for the relational store.
    pub fn pg_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_password)
            .database(&self.db_name)
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> Config {
        Config {
            user_pool_id: "us-east-1_AbCdEf123".into(),
            app_client_id: "client".into(),
            db_host: "db.internal".into(),
            db_name: "robozinho".into(),
            db_user: "svc".into(),
            db_password: "secret".into(),
            db_port: default_db_port(),
            kms_key_id: "alias/robozinho".into(),
            aws_region: default_aws_region(),
            http_port: default_http_port(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_db_port(), 5432);
        assert_eq!(default_aws_region(), "us-east-1");
        assert_eq!(default_http_port(), 8080);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn full_config_validates() {
        assert!(full_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_pool_id() {
        let mut cfg = full_config();
        cfg.user_pool_id = "".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_kms_key() {
        let mut cfg = full_config();
        cfg.kms_key_id = "   ".into();
        assert!(cfg.validate().is_err());
    }
}
