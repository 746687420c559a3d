use sqlx::types::Json;
use sqlx::PgPool;

use crate::db::models::AttemptAnswer;

pub(crate) const COLUMNS: &str =
    "id, attempt_id, question_id, answer, is_correct, score, ai_feedback";

pub(crate) struct UpsertAnswer {
    pub(crate) attempt_id: i32,
    pub(crate) question_id: i32,
    pub(crate) answer: Option<serde_json::Value>,
    pub(crate) is_correct: bool,
    pub(crate) score: i32,
}

/// One row per (attempt, question): a resubmission overwrites in place.
pub(crate) async fn upsert(
    executor: impl sqlx::PgExecutor<'_>,
    params: UpsertAnswer,
) -> Result<AttemptAnswer, sqlx::Error> {
    sqlx::query_as::<_, AttemptAnswer>(&format!(
        "INSERT INTO attempt_answers (attempt_id, question_id, answer, is_correct, score)
         VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (attempt_id, question_id) DO UPDATE
            SET answer = EXCLUDED.answer,
                is_correct = EXCLUDED.is_correct,
                score = EXCLUDED.score
         RETURNING {COLUMNS}"
    ))
    .bind(params.attempt_id)
    .bind(params.question_id)
    .bind(params.answer.map(Json))
    .bind(params.is_correct)
    .bind(params.score)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_by_attempt(
    pool: &PgPool,
    attempt_id: i32,
) -> Result<Vec<AttemptAnswer>, sqlx::Error> {
    sqlx::query_as::<_, AttemptAnswer>(&format!(
        "SELECT {COLUMNS} FROM attempt_answers WHERE attempt_id = $1 ORDER BY id"
    ))
    .bind(attempt_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn set_grade(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: i32,
    question_id: i32,
    is_correct: bool,
    score: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE attempt_answers SET is_correct = $3, score = $4
         WHERE attempt_id = $1 AND question_id = $2",
    )
    .bind(attempt_id)
    .bind(question_id)
    .bind(is_correct)
    .bind(score)
    .execute(executor)
    .await?;
    Ok(())
}
