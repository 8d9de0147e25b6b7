//! Axum middleware layers applied to the router.
//!
//! Includes request tracing, timeout enforcement, and the CORS policy the
//! dashboard depends on.

use std::time::Duration;

use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CORS policy: any origin, the methods the API serves, and the headers the
/// dashboard sends. The layer also answers `OPTIONS` preflight with 200.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
