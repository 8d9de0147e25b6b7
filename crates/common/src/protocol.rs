//! Request and response types exchanged over the HTTP API.
//!
//! Field names on the read path mirror the column aliases the dashboard
//! already consumes (`robo_id`, `robo_codigo`, ...); user-facing `message`
//! strings stay in the deployment's original Portuguese.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Robot creation
// ---------------------------------------------------------------------------

/// Request body for `POST /robots`.
///
/// `code` and `name` are required but modelled as `Option` so that a missing
/// field produces a 400 with a field-specific message instead of a
/// deserialisation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRobotRequest {
    /// Caller-assigned device code, unique across the system.
    pub code: Option<String>,
    /// Human-readable robot name.
    pub name: Option<String>,
    /// Initial preference payload, stored encrypted.
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

/// Successful response body for `POST /robots`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRobotResponse {
    pub message: String,
    /// Database-assigned id of the new robot.
    pub id: i64,
}

// ---------------------------------------------------------------------------
// Robot listing
// ---------------------------------------------------------------------------

/// Lifecycle status of a robot. Stored as text (`ATIVO` / `INATIVO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoboStatus {
    Ativo,
    Inativo,
}

impl RoboStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoboStatus::Ativo => "ATIVO",
            RoboStatus::Inativo => "INATIVO",
        }
    }
}

impl FromStr for RoboStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ATIVO" => Ok(RoboStatus::Ativo),
            "INATIVO" => Ok(RoboStatus::Inativo),
            _ => Err(()),
        }
    }
}

/// One element of the `GET /robots` response array.
///
/// One entry per joined (robot, history) row; a robot with no history rows
/// appears once with the history fields null. Sensitive fields arrive
/// decrypted; they are null when the record's envelope could not be opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotRecord {
    pub robo_id: i64,
    pub robo_codigo: String,
    pub robo_nome: String,
    pub robo_status: RoboStatus,
    pub robo_criacao: DateTime<Utc>,
    pub param_id: i64,
    pub id_usuario_cognito: String,
    /// Decrypted preference payload; null if the envelope failed to open.
    pub preferencias_iniciais: Option<serde_json::Value>,
    pub historico_id: Option<i64>,
    /// Decrypted conversation history; null if absent or failed to open.
    pub conteudo_conversa: Option<String>,
    pub data_conversa: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Generic bodies
// ---------------------------------------------------------------------------

/// Body for plain success responses (delete, clear-history).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_tolerates_missing_fields() {
        let req: CreateRobotRequest = serde_json::from_value(json!({"code": "ESP32-X92"})).unwrap();
        assert_eq!(req.code.as_deref(), Some("ESP32-X92"));
        assert!(req.name.is_none());
        assert!(req.params.is_none());
    }

    #[test]
    fn status_round_trip() {
        assert_eq!("ATIVO".parse::<RoboStatus>().unwrap(), RoboStatus::Ativo);
        assert_eq!(RoboStatus::Inativo.as_str(), "INATIVO");
        assert!("ligado".parse::<RoboStatus>().is_err());
        let v = serde_json::to_value(RoboStatus::Ativo).unwrap();
        assert_eq!(v, json!("ATIVO"));
    }

    #[test]
    fn record_serialises_dashboard_aliases() {
        let rec = RobotRecord {
            robo_id: 7,
            robo_codigo: "ESP32-X92".into(),
            robo_nome: "Rogerinho".into(),
            robo_status: RoboStatus::Ativo,
            robo_criacao: Utc::now(),
            param_id: 3,
            id_usuario_cognito: "u1".into(),
            preferencias_iniciais: Some(json!({"lang": "pt"})),
            historico_id: None,
            conteudo_conversa: None,
            data_conversa: None,
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["robo_codigo"], "ESP32-X92");
        assert_eq!(v["preferencias_iniciais"]["lang"], "pt");
        assert!(v["conteudo_conversa"].is_null());
    }

    #[test]
    fn error_response_new() {
        let e = ErrorResponse::new("Rota não encontrada");
        assert_eq!(e.message, "Rota não encontrada");
    }
}
