use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::Question;
use crate::db::types::{QuestionType, Section};

pub(crate) const COLUMNS: &str = "\
    id, section, part, type, content, options, correct_answer, \
    explanation, passage_id, difficulty, tags";

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct QuestionFilters {
    pub(crate) section: Option<Section>,
    pub(crate) question_type: Option<QuestionType>,
    pub(crate) difficulty: Option<i32>,
    pub(crate) limit: i64,
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) section: Section,
    pub(crate) part: Option<i32>,
    pub(crate) question_type: QuestionType,
    pub(crate) content: &'a str,
    pub(crate) options: Option<serde_json::Value>,
    pub(crate) correct_answer: Option<serde_json::Value>,
    pub(crate) explanation: Option<&'a str>,
    pub(crate) passage_id: Option<i32>,
    pub(crate) difficulty: i32,
    pub(crate) tags: Option<Vec<String>>,
}

pub(crate) async fn list(
    pool: &PgPool,
    filters: QuestionFilters,
) -> Result<Vec<Question>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM questions WHERE TRUE"));

    if let Some(section) = filters.section {
        builder.push(" AND section = ");
        builder.push_bind(section);
    }

    if let Some(question_type) = filters.question_type {
        builder.push(" AND type = ");
        builder.push_bind(question_type);
    }

    if let Some(difficulty) = filters.difficulty {
        builder.push(" AND difficulty = ");
        builder.push_bind(difficulty);
    }

    builder.push(" ORDER BY id LIMIT ");
    builder.push_bind(filters.limit.clamp(1, 500));

    builder.build_query_as::<Question>().fetch_all(pool).await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    question_id: i32,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(question_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_ids(pool: &PgPool, ids: &[i32]) -> Result<Vec<Question>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            section, part, type, content, options, correct_answer,
            explanation, passage_id, difficulty, tags
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        RETURNING {COLUMNS}"
    ))
    .bind(params.section)
    .bind(params.part)
    .bind(params.question_type)
    .bind(params.content)
    .bind(params.options.map(Json))
    .bind(params.correct_answer.map(Json))
    .bind(params.explanation)
    .bind(params.passage_id)
    .bind(params.difficulty)
    .bind(params.tags)
    .fetch_one(executor)
    .await
}
