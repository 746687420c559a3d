use std::collections::HashSet;

use axum::{extract::Query, routing::get, routing::post, Json, Router};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Question;
use crate::db::types::{QuestionType, Section};
use crate::repositories;
use crate::schemas::question::{QuestionCreate, QuestionResponse};
use crate::schemas::test::{GenerateTestRequest, ResolvedTestResponse};
use crate::services::test_resolver::ResolvedTest;

// Pool fetched per section before sampling down to the configured count.
const CANDIDATE_POOL_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionListQuery {
    #[serde(default)]
    section: Option<Section>,
    #[serde(default)]
    #[serde(rename = "type", alias = "questionType")]
    question_type: Option<QuestionType>,
    #[serde(default)]
    difficulty: Option<i32>,
    #[serde(default = "default_limit")]
    limit: i64,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_questions).post(create_question))
        .route("/generate-test", post(generate_test))
}

async fn list_questions(
    Query(params): Query<QuestionListQuery>,
    state: axum::extract::State<AppState>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let questions = repositories::questions::list(
        state.db(),
        repositories::questions::QuestionFilters {
            section: params.section,
            question_type: params.question_type,
            difficulty: params.difficulty,
            limit: params.limit,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

    Ok(Json(questions.into_iter().map(QuestionResponse::from_model).collect()))
}

async fn create_question(
    state: axum::extract::State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(axum::http::StatusCode, Json<QuestionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if let Some(passage_id) = payload.passage_id {
        let passage = repositories::passages::find_by_id(state.db(), passage_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch passage"))?;
        if passage.is_none() {
            return Err(ApiError::BadRequest(format!("Passage {passage_id} does not exist")));
        }
    }

    let tags = if payload.tags.is_empty() { None } else { Some(payload.tags.clone()) };

    let question = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            section: payload.section,
            part: payload.part,
            question_type: payload.question_type,
            content: &payload.content,
            options: payload.options.clone(),
            correct_answer: payload.correct_answer.clone(),
            explanation: payload.explanation.as_deref(),
            passage_id: payload.passage_id,
            difficulty: payload.difficulty,
            tags,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    tracing::info!(question_id = question.id, action = "question_create", "Question created");

    Ok((axum::http::StatusCode::CREATED, Json(QuestionResponse::from_model(question))))
}

/// Assembles an ad-hoc test by sampling stored questions per requested
/// section and recording them in a fresh structure document.
async fn generate_test(
    state: axum::extract::State<AppState>,
    Json(payload): Json<GenerateTestRequest>,
) -> Result<(axum::http::StatusCode, Json<ResolvedTestResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if payload.sections.is_empty() {
        return Err(ApiError::BadRequest("sections must not be empty".to_string()));
    }

    let per_section = state.settings().content().generated_questions_per_section as usize;

    let mut requested = Vec::new();
    let mut seen = HashSet::new();
    for section in payload.sections.iter().copied() {
        if seen.insert(section) {
            requested.push(section);
        }
    }

    let mut sections_doc = serde_json::Map::new();
    let mut picked: Vec<Question> = Vec::new();

    for section in requested {
        let candidates = repositories::questions::list(
            state.db(),
            repositories::questions::QuestionFilters {
                section: Some(section),
                question_type: None,
                difficulty: payload.difficulty,
                limit: CANDIDATE_POOL_LIMIT,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;

        let chosen = sample_questions(candidates, per_section);
        sections_doc.insert(section.as_str().to_string(), section_node(section, &chosen));
        picked.extend(chosen);
    }

    let structure = json!({ "sections": Value::Object(sections_doc) });

    let now = primitive_now_utc();
    let title = format!("Generated Test - {}", now.date());

    let test = repositories::tests::create(
        state.db(),
        repositories::tests::CreateTest {
            title: &title,
            structure,
            is_system: false,
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create test"))?;

    tracing::info!(
        test_id = test.id,
        question_count = picked.len(),
        action = "test_generate",
        "Generated test"
    );

    let resolved = ResolvedTest { test, questions: picked };
    Ok((axum::http::StatusCode::CREATED, Json(ResolvedTestResponse::from_resolved(resolved))))
}

fn sample_questions(candidates: Vec<Question>, count: usize) -> Vec<Question> {
    let mut rng = rand::thread_rng();
    let mut chosen: Vec<Question> =
        candidates.choose_multiple(&mut rng, count).cloned().collect();
    chosen.sort_by_key(|question| question.id);
    chosen
}

/// Writing references live under `tasks`, speaking under `parts`, the two
/// objective sections as a flat `questionIds` list.
fn section_node(section: Section, questions: &[Question]) -> Value {
    let ids: Vec<i32> = questions.iter().map(|question| question.id).collect();
    match section {
        Section::Writing => json!({
            "tasks": ids.iter().map(|id| json!({"questionId": id})).collect::<Vec<_>>(),
        }),
        Section::Speaking => json!({
            "parts": ids.iter().map(|id| json!({"questionId": id})).collect::<Vec<_>>(),
        }),
        Section::Listening | Section::Reading => json!({ "questionIds": ids }),
    }
}

fn default_limit() -> i64 {
    100
}
