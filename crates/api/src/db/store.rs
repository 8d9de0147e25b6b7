//! SQL statements touching the robot tables.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

use common::protocol::RoboStatus;

/// Postgres error code for unique-constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Errors from the store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another robot already carries this code.
    #[error("duplicate robot code")]
    DuplicateCode,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// One joined row of the owner's robot listing, fields still sealed.
#[derive(Debug, sqlx::FromRow)]
pub struct RobotRow {
    pub robo_id: i64,
    pub robo_codigo: String,
    pub robo_nome: String,
    pub robo_status: String,
    pub robo_criacao: DateTime<Utc>,
    pub chave_envelopada: Option<Vec<u8>>,
    pub param_id: i64,
    pub id_usuario_cognito: String,
    pub preferencias_iniciais: Vec<u8>,
    pub historico_id: Option<i64>,
    pub conteudo_conversa: Option<Vec<u8>>,
    pub data_conversa: Option<DateTime<Utc>>,
}

/// Data access for robot records. Holds the shared pool; each call acquires
/// one connection for its own duration and releases it on every exit path.
#[derive(Clone)]
pub struct RobotStore {
    pool: PgPool,
}

impl RobotStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a robot, its sealed preferences, and its sealed (empty)
    /// history as one atomic unit. All three inserts succeed or none do.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateCode`] when `code` already exists.
    pub async fn create_robot(
        &self,
        caller: &str,
        code: &str,
        name: &str,
        wrapped_key: &[u8],
        sealed_prefs: &[u8],
        sealed_history: &[u8],
    ) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (robo_id,): (i64,) = sqlx::query_as(
            "INSERT INTO robo (codigo, nome, status, chave_envelopada) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(code)
        .bind(name)
        .bind(RoboStatus::Ativo.as_str())
        .bind(wrapped_key)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        sqlx::query(
            "INSERT INTO parametros_iniciais (id_usuario_cognito, preferencias_iniciais, id_robo) \
             VALUES ($1, $2, $3)",
        )
        .bind(caller)
        .bind(sealed_prefs)
        .bind(robo_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO historico_conversa (historico, id_robo, id_usuario_cognito) \
             VALUES ($1, $2, $3)",
        )
        .bind(sealed_history)
        .bind(robo_id)
        .bind(caller)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(robo_id)
    }

    /// All robots owned by `caller`, one row per (robot, history) pair.
    pub async fn list_robots(&self, caller: &str) -> Result<Vec<RobotRow>, StoreError> {
        let rows = sqlx::query_as::<_, RobotRow>(
            "SELECT \
                 r.id AS robo_id, \
                 r.codigo AS robo_codigo, \
                 r.nome AS robo_nome, \
                 r.status AS robo_status, \
                 r.created_at AS robo_criacao, \
                 r.chave_envelopada, \
                 pi.id AS param_id, \
                 pi.id_usuario_cognito, \
                 pi.preferencias_iniciais, \
                 hc.id AS historico_id, \
                 hc.historico AS conteudo_conversa, \
                 hc.data_registro AS data_conversa \
             FROM robo r \
             INNER JOIN parametros_iniciais pi ON r.id = pi.id_robo \
             LEFT JOIN historico_conversa hc ON r.id = hc.id_robo \
             WHERE pi.id_usuario_cognito = $1 \
             ORDER BY r.id, hc.id",
        )
        .bind(caller)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Delete a robot the caller owns. Returns `false` when the row is
    /// absent or owned by someone else (indistinguishable on purpose).
    /// Preferences and history go with it via ON DELETE CASCADE.
    pub async fn delete_robot(&self, caller: &str, robo_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "DELETE FROM robo \
             WHERE id = $1 \
             AND id IN (SELECT id_robo FROM parametros_iniciais WHERE id_usuario_cognito = $2)",
        )
        .bind(robo_id)
        .bind(caller)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether `caller` owns the robot. Used as the gate before mutations
    /// that do not carry their own ownership predicate.
    pub async fn owns_robot(&self, caller: &str, robo_id: i64) -> Result<bool, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM parametros_iniciais \
             WHERE id_robo = $1 AND id_usuario_cognito = $2",
        )
        .bind(robo_id)
        .bind(caller)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Remove every history row of the caller's robot.
    pub async fn clear_history(&self, caller: &str, robo_id: i64) -> Result<(), StoreError> {
        sqlx::query(
            "DELETE FROM historico_conversa \
             WHERE id_robo = $1 AND id_usuario_cognito = $2",
        )
        .bind(robo_id)
        .bind(caller)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Ping the database; used by the health endpoint.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::DuplicateCode;
        }
    }
    StoreError::Sqlx(err)
}
