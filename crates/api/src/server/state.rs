//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::db::RobotStore;
use crate::pipeline::RecordPipeline;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped) so that Axum can clone
/// the state for each request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// Verifies bearer credentials against the identity pool.
    pub verifier: Arc<TokenVerifier>,
    /// Per-request record orchestration.
    pub pipeline: Arc<RecordPipeline>,
    /// Store handle used directly by the health endpoint.
    pub store: RobotStore,
}

impl AppState {
    pub fn new(verifier: Arc<TokenVerifier>, pipeline: Arc<RecordPipeline>, store: RobotStore) -> Self {
        Self {
            verifier,
            pipeline,
            store,
        }
    }
}
