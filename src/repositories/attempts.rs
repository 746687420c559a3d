use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Attempt;
use crate::db::types::AttemptStatus;

pub(crate) const COLUMNS: &str =
    "id, user_id, test_id, status, score, started_at, completed_at, time_spent";

pub(crate) struct CreateAttempt<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) test_id: Option<i32>,
    pub(crate) status: AttemptStatus,
    pub(crate) started_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAttempt<'_>,
) -> Result<Attempt, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "INSERT INTO attempts (user_id, test_id, status, started_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}"
    ))
    .bind(params.user_id)
    .bind(params.test_id)
    .bind(params.status)
    .bind(params.started_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!("SELECT {COLUMNS} FROM attempts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {COLUMNS} FROM attempts WHERE user_id = $1 ORDER BY started_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// `time_spent` is derived in SQL from `started_at` whenever a completion
/// timestamp is supplied.
pub(crate) async fn update_status(
    executor: impl sqlx::PgExecutor<'_>,
    id: i32,
    status: AttemptStatus,
    score: Option<serde_json::Value>,
    completed_at: Option<PrimitiveDateTime>,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "UPDATE attempts
            SET status = $2,
                score = COALESCE($3, score),
                completed_at = COALESCE($4, completed_at),
                time_spent = CASE
                    WHEN $4::timestamp IS NULL THEN time_spent
                    ELSE FLOOR(EXTRACT(EPOCH FROM ($4::timestamp - started_at)))::int
                END
          WHERE id = $1
          RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .bind(score.map(Json))
    .bind(completed_at)
    .fetch_optional(executor)
    .await
}
