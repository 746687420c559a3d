use axum::{routing::get, routing::post, Json, Router};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Attempt;
use crate::db::types::AttemptStatus;
use crate::repositories;
use crate::schemas::attempt::{
    AnswerResponse, AnswerSubmit, AttemptCreate, AttemptDetailsResponse, AttemptResponse,
    format_primitive,
};
use crate::schemas::question::PassageResponse;
use crate::schemas::test::ResolvedTestResponse;
use crate::services::{scoring, test_resolver};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_attempts).post(create_attempt))
        .route("/:attempt_id", get(get_attempt))
        .route("/:attempt_id/answers", post(submit_answer))
        .route("/:attempt_id/complete", post(complete_attempt))
}

async fn list_attempts(
    CurrentUser(user_id): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<Vec<AttemptResponse>>, ApiError> {
    let attempts = repositories::attempts::list_by_user(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list attempts"))?;

    Ok(Json(attempts.into_iter().map(AttemptResponse::from_model).collect()))
}

async fn create_attempt(
    CurrentUser(user_id): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<AttemptCreate>,
) -> Result<(axum::http::StatusCode, Json<AttemptResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let test = repositories::tests::find_by_id(state.db(), payload.test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch test"))?;

    let Some(test) = test else {
        return Err(ApiError::NotFound("Test not found".to_string()));
    };

    let attempt = repositories::attempts::create(
        state.db(),
        repositories::attempts::CreateAttempt {
            user_id: &user_id,
            test_id: Some(test.id),
            status: AttemptStatus::InProgress,
            started_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create attempt"))?;

    tracing::info!(
        attempt_id = attempt.id,
        user_id = %user_id,
        test_id = test.id,
        action = "attempt_create",
        "Attempt started"
    );

    Ok((axum::http::StatusCode::CREATED, Json(AttemptResponse::from_model(attempt))))
}

async fn get_attempt(
    axum::extract::Path(attempt_id): axum::extract::Path<i32>,
    CurrentUser(user_id): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<AttemptDetailsResponse>, ApiError> {
    let attempt = fetch_owned_attempt(&state, attempt_id, &user_id).await?;

    // A deleted test degrades to `test: null` instead of failing the view.
    let resolved = match attempt.test_id {
        Some(test_id) => test_resolver::resolve_test(state.db(), test_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to resolve test"))?,
        None => None,
    };

    let passages = match resolved.as_ref() {
        Some(resolved) => test_resolver::passages_for_questions(state.db(), &resolved.questions)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch passages"))?,
        None => Vec::new(),
    };

    let answers = repositories::answers::list_by_attempt(state.db(), attempt.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch answers"))?;

    let response = AttemptDetailsResponse {
        id: attempt.id,
        user_id: attempt.user_id,
        test_id: attempt.test_id,
        status: attempt.status,
        score: attempt.score.map(|value| value.0),
        started_at: format_primitive(attempt.started_at),
        completed_at: attempt.completed_at.map(format_primitive),
        time_spent: attempt.time_spent,
        test: resolved.map(ResolvedTestResponse::from_resolved),
        answers: answers.into_iter().map(AnswerResponse::from_model).collect(),
        passages: passages.into_iter().map(PassageResponse::from_model).collect(),
    };

    Ok(Json(response))
}

/// Records the raw value only; correctness stays a placeholder until the
/// attempt is completed and scored.
async fn submit_answer(
    axum::extract::Path(attempt_id): axum::extract::Path<i32>,
    CurrentUser(user_id): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<AnswerSubmit>,
) -> Result<Json<AnswerResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let attempt = fetch_owned_attempt(&state, attempt_id, &user_id).await?;

    if attempt.status == AttemptStatus::Completed {
        return Err(ApiError::Conflict("Attempt is already completed".to_string()));
    }

    let question = repositories::questions::find_by_id(state.db(), payload.question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?;
    if question.is_none() {
        return Err(ApiError::BadRequest(format!(
            "Question {} does not exist",
            payload.question_id
        )));
    }

    let answer = if payload.answer.is_null() { None } else { Some(payload.answer) };

    let row = repositories::answers::upsert(
        state.db(),
        repositories::answers::UpsertAnswer {
            attempt_id: attempt.id,
            question_id: payload.question_id,
            answer,
            is_correct: false,
            score: 0,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to save answer"))?;

    tracing::debug!(
        attempt_id = attempt.id,
        question_id = payload.question_id,
        action = "answer_submit",
        "Answer recorded"
    );

    Ok(Json(AnswerResponse::from_model(row)))
}

async fn complete_attempt(
    axum::extract::Path(attempt_id): axum::extract::Path<i32>,
    CurrentUser(user_id): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let attempt = fetch_owned_attempt(&state, attempt_id, &user_id).await?;

    // Completion is idempotent: a second call returns the stored result
    // without regrading.
    if attempt.status == AttemptStatus::Completed {
        return Ok(Json(AttemptResponse::from_model(attempt)));
    }

    let questions = match attempt.test_id {
        Some(test_id) => test_resolver::resolve_test(state.db(), test_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to resolve test"))?
            .map(|resolved| resolved.questions)
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let answers = repositories::answers::list_by_attempt(state.db(), attempt.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch answers"))?;

    let grades = scoring::grade_answers(&questions, &answers);
    let summary = scoring::summarize(&questions, &grades);
    let score = serde_json::to_value(summary)
        .map_err(|e| ApiError::internal(e, "Failed to serialize score"))?;

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    for grade in &grades {
        repositories::answers::set_grade(
            &mut *tx,
            attempt.id,
            grade.question_id,
            grade.is_correct,
            i32::from(grade.is_correct),
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store answer grade"))?;
    }

    let updated = repositories::attempts::update_status(
        &mut *tx,
        attempt.id,
        AttemptStatus::Completed,
        Some(score),
        Some(primitive_now_utc()),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to complete attempt"))?;

    let Some(updated) = updated else {
        return Err(ApiError::NotFound("Attempt not found".to_string()));
    };

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(
        attempt_id = updated.id,
        user_id = %user_id,
        correct = summary.correct,
        total = summary.total,
        band = summary.band,
        action = "attempt_complete",
        "Attempt completed"
    );

    Ok(Json(AttemptResponse::from_model(updated)))
}

async fn fetch_owned_attempt(
    state: &AppState,
    attempt_id: i32,
    user_id: &str,
) -> Result<Attempt, ApiError> {
    let attempt = repositories::attempts::find_by_id(state.db(), attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?;

    let Some(attempt) = attempt else {
        return Err(ApiError::NotFound("Attempt not found".to_string()));
    };

    if attempt.user_id != user_id {
        return Err(ApiError::Forbidden("Not your attempt"));
    }

    Ok(attempt)
}
