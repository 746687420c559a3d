use axum::{routing::get, Json, Router};
use time::OffsetDateTime;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::repositories;
use crate::schemas::plan::{band_to_storage, StudyPlanCreate, StudyPlanResponse};
use crate::services::study_plan;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(get_current_plan).post(create_plan))
}

async fn get_current_plan(
    CurrentUser(user_id): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<StudyPlanResponse>, ApiError> {
    let plan = repositories::study_plans::find_latest_by_user(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch study plan"))?;

    let Some(plan) = plan else {
        return Err(ApiError::NotFound("No study plan found".to_string()));
    };

    Ok(Json(StudyPlanResponse::from_model(plan)))
}

/// Generates a fresh schedule and stores it as the user's newest plan.
/// Earlier plans stay in place and are simply superseded.
async fn create_plan(
    CurrentUser(user_id): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<StudyPlanCreate>,
) -> Result<(axum::http::StatusCode, Json<StudyPlanResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = OffsetDateTime::now_utc();
    let days = study_plan::days_until_exam(now, payload.exam_date);
    if days < 1 {
        return Err(ApiError::BadRequest("exam_date must be in the future".to_string()));
    }

    let plan_data = study_plan::generate_plan(payload.target_band, days, now);
    let plan_value = serde_json::to_value(&plan_data)
        .map_err(|e| ApiError::internal(e, "Failed to serialize plan"))?;

    let plan = repositories::study_plans::create(
        state.db(),
        repositories::study_plans::CreateStudyPlan {
            user_id: &user_id,
            target_band: band_to_storage(payload.target_band),
            exam_date: to_primitive_utc(payload.exam_date),
            plan_data: plan_value,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create study plan"))?;

    tracing::info!(
        plan_id = plan.id,
        user_id = %user_id,
        mode = plan_data.mode,
        days_until_exam = days,
        action = "study_plan_create",
        "Study plan generated"
    );

    Ok((axum::http::StatusCode::CREATED, Json(StudyPlanResponse::from_model(plan))))
}
