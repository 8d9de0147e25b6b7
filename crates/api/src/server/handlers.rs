//! Axum request handlers for all service endpoints.

use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use common::error::ApiError;
use common::protocol::{
    CreateRobotRequest, ErrorResponse, HealthResponse, MessageResponse,
};

use crate::auth::{AuthError, CallerId};
use super::state::AppState;

/// `GET /robots` — the caller's robots with decrypted fields inlined.
pub async fn list_robots(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let caller = match authenticate(&state, &headers).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match state.pipeline.list(&caller).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => error_response(e),
    }
}

/// `POST /robots` — register a robot; preferences and an empty history are
/// sealed under a fresh per-record data key.
pub async fn create_robot(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateRobotRequest>, JsonRejection>,
) -> Response {
    let caller = match authenticate(&state, &headers).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let Json(req) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return error_response(ApiError::BadRequest(format!(
                "Body inválido: {rejection}"
            )));
        }
    };
    match state.pipeline.create(&caller, req).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => error_response(e),
    }
}

/// `DELETE /robots/{id}` — remove the caller's robot and everything under it.
pub async fn delete_robot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let caller = match authenticate(&state, &headers).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match state.pipeline.delete(&caller, id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse::new("Robô deletado com sucesso.")),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// `POST /robots/{id}/clear-history` — reset the robot's conversation
/// history to empty.
pub async fn clear_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let caller = match authenticate(&state, &headers).await {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match state.pipeline.clear_history(&caller, id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse::new("Histórico limpo com sucesso.")),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /health` — liveness check against the relational store.
pub async fn health(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".into(),
            }),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded".into(),
                }),
            )
                .into_response()
        }
    }
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Rota não encontrada")),
    )
}

/// Verify the request's bearer credential; on failure, the ready-to-send
/// 401 response. Runs before any store or key-management call.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<CallerId, Response> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    state.verifier.authorize(header).await.map_err(|e| {
        let message = match e {
            AuthError::MissingToken => "Token de autorização não fornecido.",
            AuthError::InvalidToken => "Token inválido ou expirado",
        };
        error_response(ApiError::Unauthorized(message.into()))
    })
}

/// Render an [`ApiError`] as its one transport status plus `{message}` body.
fn error_response(err: ApiError) -> Response {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::new(err.message());
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_maps_each_variant_once() {
        for (err, status) in [
            (ApiError::Unauthorized("x".into()), 401),
            (ApiError::BadRequest("x".into()), 400),
            (ApiError::Forbidden("x".into()), 403),
            (ApiError::NotFound("x".into()), 404),
            (ApiError::Conflict("x".into()), 409),
            (ApiError::Internal("x".into()), 500),
        ] {
            assert_eq!(error_response(err).status().as_u16(), status);
        }
    }
}
