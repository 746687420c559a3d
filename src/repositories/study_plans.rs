use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::StudyPlan;

pub(crate) const COLUMNS: &str =
    "id, user_id, target_band, exam_date, plan_data, progress, created_at";

pub(crate) struct CreateStudyPlan<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) target_band: i32,
    pub(crate) exam_date: PrimitiveDateTime,
    pub(crate) plan_data: serde_json::Value,
    pub(crate) created_at: PrimitiveDateTime,
}

/// The current plan is the newest row; older plans are kept but superseded.
pub(crate) async fn find_latest_by_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<StudyPlan>, sqlx::Error> {
    sqlx::query_as::<_, StudyPlan>(&format!(
        "SELECT {COLUMNS} FROM study_plans
         WHERE user_id = $1
         ORDER BY created_at DESC, id DESC
         LIMIT 1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateStudyPlan<'_>,
) -> Result<StudyPlan, sqlx::Error> {
    sqlx::query_as::<_, StudyPlan>(&format!(
        "INSERT INTO study_plans (user_id, target_band, exam_date, plan_data, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}"
    ))
    .bind(params.user_id)
    .bind(params.target_band)
    .bind(params.exam_date)
    .bind(Json(params.plan_data))
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}
