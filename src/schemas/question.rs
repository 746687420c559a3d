use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::db::models::{Passage, Question};
use crate::db::types::{QuestionType, Section};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    pub(crate) section: Section,
    #[serde(default)]
    #[validate(range(min = 1, max = 4, message = "part must be between 1 and 4"))]
    pub(crate) part: Option<i32>,
    #[serde(rename = "type", alias = "questionType")]
    pub(crate) question_type: QuestionType,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub(crate) content: String,
    #[serde(default)]
    pub(crate) options: Option<Value>,
    #[serde(default)]
    #[serde(alias = "correctAnswer")]
    pub(crate) correct_answer: Option<Value>,
    #[serde(default)]
    pub(crate) explanation: Option<String>,
    #[serde(default)]
    #[serde(alias = "passageId")]
    pub(crate) passage_id: Option<i32>,
    #[serde(default = "default_difficulty")]
    #[validate(range(min = 1, max = 5, message = "difficulty must be between 1 and 5"))]
    pub(crate) difficulty: i32,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: i32,
    pub(crate) section: Section,
    pub(crate) part: Option<i32>,
    #[serde(rename = "type")]
    pub(crate) question_type: QuestionType,
    pub(crate) content: String,
    pub(crate) options: Option<Value>,
    pub(crate) correct_answer: Option<Value>,
    pub(crate) explanation: Option<String>,
    pub(crate) passage_id: Option<i32>,
    pub(crate) difficulty: i32,
    pub(crate) tags: Vec<String>,
}

impl QuestionResponse {
    pub(crate) fn from_model(question: Question) -> QuestionResponse {
        QuestionResponse {
            id: question.id,
            section: question.section,
            part: question.part,
            question_type: question.question_type,
            content: question.content,
            options: question.options.map(|value| value.0),
            correct_answer: question.correct_answer.map(|value| value.0),
            explanation: question.explanation,
            passage_id: question.passage_id,
            difficulty: question.difficulty,
            tags: question.tags.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PassageResponse {
    pub(crate) id: i32,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) section: Section,
    pub(crate) metadata: Option<Value>,
}

impl PassageResponse {
    pub(crate) fn from_model(passage: Passage) -> PassageResponse {
        PassageResponse {
            id: passage.id,
            title: passage.title,
            content: passage.content,
            section: passage.section,
            metadata: passage.metadata.map(|value| value.0),
        }
    }
}

fn default_difficulty() -> i32 {
    1
}
