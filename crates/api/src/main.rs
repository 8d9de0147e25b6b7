//! `robozinho-api` — admin service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (structured JSON logs).
//! 3. Initialise AWS SDK clients (KMS).
//! 4. Connect the Postgres pool and apply migrations.
//! 5. Wire the verifier, key-wrap client, and record pipeline into [`AppState`].
//! 6. Build the Axum router and start the HTTP server.

mod auth;
mod aws;
mod config;
mod crypto;
mod db;
mod keywrap;
mod pipeline;
mod server;
mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use auth::{HttpJwksFetcher, TokenVerifier};
use config::Config;
use db::RobotStore;
use keywrap::KmsKeyWrap;
use pipeline::RecordPipeline;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        http_port = cfg.http_port,
        "robozinho-api starting"
    );

    // -----------------------------------------------------------------------
    // 3. AWS clients
    // -----------------------------------------------------------------------
    let aws = aws::AwsClients::init(&cfg.aws_region).await?;

    // -----------------------------------------------------------------------
    // 4. Database pool + migrations
    // -----------------------------------------------------------------------
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_with(cfg.pg_options())
        .await
        .context("failed to connect to the relational store")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to apply database migrations")?;

    // -----------------------------------------------------------------------
    // 5. Collaborators
    // -----------------------------------------------------------------------
    let store = RobotStore::new(pool);
    let verifier = TokenVerifier::new(
        Arc::new(HttpJwksFetcher::new(&cfg.aws_region, &cfg.user_pool_id)),
        cfg.app_client_id.clone(),
    );
    let keywrap = Arc::new(KmsKeyWrap::new(aws.kms, cfg.kms_key_id.clone()));
    let pipeline = RecordPipeline::new(store.clone(), keywrap);
    let state = AppState::new(Arc::new(verifier), Arc::new(pipeline), store);

    // -----------------------------------------------------------------------
    // 6. HTTP server
    // -----------------------------------------------------------------------
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.http_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
