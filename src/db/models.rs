use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{AttemptStatus, QuestionType, Section};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Passage {
    pub(crate) id: i32,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) section: Section,
    pub(crate) metadata: Option<Json<serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: i32,
    pub(crate) section: Section,
    pub(crate) part: Option<i32>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub(crate) question_type: QuestionType,
    pub(crate) content: String,
    pub(crate) options: Option<Json<serde_json::Value>>,
    pub(crate) correct_answer: Option<Json<serde_json::Value>>,
    pub(crate) explanation: Option<String>,
    pub(crate) passage_id: Option<i32>,
    pub(crate) difficulty: i32,
    pub(crate) tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Test {
    pub(crate) id: i32,
    pub(crate) title: String,
    pub(crate) structure: Json<serde_json::Value>,
    pub(crate) is_system: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Attempt {
    pub(crate) id: i32,
    pub(crate) user_id: String,
    pub(crate) test_id: Option<i32>,
    pub(crate) status: AttemptStatus,
    pub(crate) score: Option<Json<serde_json::Value>>,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) completed_at: Option<PrimitiveDateTime>,
    pub(crate) time_spent: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AttemptAnswer {
    pub(crate) id: i32,
    pub(crate) attempt_id: i32,
    pub(crate) question_id: i32,
    pub(crate) answer: Option<Json<serde_json::Value>>,
    pub(crate) is_correct: Option<bool>,
    pub(crate) score: Option<i32>,
    pub(crate) ai_feedback: Option<Json<serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct StudyPlan {
    pub(crate) id: i32,
    pub(crate) user_id: String,
    pub(crate) target_band: i32,
    pub(crate) exam_date: PrimitiveDateTime,
    pub(crate) plan_data: Json<serde_json::Value>,
    pub(crate) progress: Option<Json<serde_json::Value>>,
    pub(crate) created_at: PrimitiveDateTime,
}
