use sqlx::types::Json;
use sqlx::PgPool;

use crate::db::models::Passage;
use crate::db::types::Section;

pub(crate) const COLUMNS: &str = "id, title, content, section, metadata";

pub(crate) struct CreatePassage<'a> {
    pub(crate) title: &'a str,
    pub(crate) content: &'a str,
    pub(crate) section: Section,
    pub(crate) metadata: Option<serde_json::Value>,
}

pub(crate) async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Passage>, sqlx::Error> {
    sqlx::query_as::<_, Passage>(&format!("SELECT {COLUMNS} FROM passages WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_ids(pool: &PgPool, ids: &[i32]) -> Result<Vec<Passage>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Passage>(&format!("SELECT {COLUMNS} FROM passages WHERE id = ANY($1)"))
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreatePassage<'_>,
) -> Result<Passage, sqlx::Error> {
    sqlx::query_as::<_, Passage>(&format!(
        "INSERT INTO passages (title, content, section, metadata)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}"
    ))
    .bind(params.title)
    .bind(params.content)
    .bind(params.section)
    .bind(params.metadata.map(Json))
    .fetch_one(executor)
    .await
}
