use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

pub(crate) use crate::core::time::format_primitive;
use crate::db::models::{Attempt, AttemptAnswer};
use crate::db::types::AttemptStatus;
use crate::schemas::question::PassageResponse;
use crate::schemas::test::ResolvedTestResponse;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AttemptCreate {
    #[serde(alias = "testId")]
    #[validate(range(min = 1, message = "test_id must be positive"))]
    pub(crate) test_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnswerSubmit {
    #[serde(alias = "questionId")]
    #[validate(range(min = 1, message = "question_id must be positive"))]
    pub(crate) question_id: i32,
    #[serde(default)]
    pub(crate) answer: Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: i32,
    pub(crate) user_id: String,
    pub(crate) test_id: Option<i32>,
    pub(crate) status: AttemptStatus,
    pub(crate) score: Option<Value>,
    pub(crate) started_at: String,
    pub(crate) completed_at: Option<String>,
    pub(crate) time_spent: Option<i32>,
}

impl AttemptResponse {
    pub(crate) fn from_model(attempt: Attempt) -> AttemptResponse {
        AttemptResponse {
            id: attempt.id,
            user_id: attempt.user_id,
            test_id: attempt.test_id,
            status: attempt.status,
            score: attempt.score.map(|value| value.0),
            started_at: format_primitive(attempt.started_at),
            completed_at: attempt.completed_at.map(format_primitive),
            time_spent: attempt.time_spent,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) id: i32,
    pub(crate) attempt_id: i32,
    pub(crate) question_id: i32,
    pub(crate) answer: Option<Value>,
    pub(crate) is_correct: Option<bool>,
    pub(crate) score: Option<i32>,
    pub(crate) ai_feedback: Option<Value>,
}

impl AnswerResponse {
    pub(crate) fn from_model(answer: AttemptAnswer) -> AnswerResponse {
        AnswerResponse {
            id: answer.id,
            attempt_id: answer.attempt_id,
            question_id: answer.question_id,
            answer: answer.answer.map(|value| value.0),
            is_correct: answer.is_correct,
            score: answer.score,
            ai_feedback: answer.ai_feedback.map(|value| value.0),
        }
    }
}

/// Attempt merged with its resolved test, submitted answers and the
/// passages the test's questions reference. `test` stays null when the
/// underlying test row is gone.
#[derive(Debug, Serialize)]
pub(crate) struct AttemptDetailsResponse {
    pub(crate) id: i32,
    pub(crate) user_id: String,
    pub(crate) test_id: Option<i32>,
    pub(crate) status: AttemptStatus,
    pub(crate) score: Option<Value>,
    pub(crate) started_at: String,
    pub(crate) completed_at: Option<String>,
    pub(crate) time_spent: Option<i32>,
    pub(crate) test: Option<ResolvedTestResponse>,
    pub(crate) answers: Vec<AnswerResponse>,
    pub(crate) passages: Vec<PassageResponse>,
}
