use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use serde_json::Value;
use sqlx::PgPool;
use time::PrimitiveDateTime;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower::ServiceExt;
use uuid::Uuid;

use crate::api;
use crate::core::{config::Settings, state::AppState, time::primitive_now_utc};
use crate::db::models::{Passage, Question, Test};
use crate::db::types::{QuestionType, Section};
use crate::repositories;

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env(database_url: &str) {
    std::env::set_var("BANDPREP_ENV", "test");
    std::env::set_var("BANDPREP_STRICT_CONFIG", "0");
    std::env::set_var("DATABASE_URL", database_url);
    std::env::set_var("PROMETHEUS_ENABLED", "0");
    std::env::set_var("SEED_DEMO_CONTENT", "0");
    std::env::remove_var("USER_ID_HEADER");
}

/// Returns `None` when `BANDPREP_TEST_DATABASE_URL` is unset, so database
/// flow tests skip on machines without a disposable Postgres.
pub(crate) async fn try_setup_test_context() -> Option<TestContext> {
    let guard = env_lock().await;

    dotenvy::dotenv().ok();
    let database_url = match std::env::var("BANDPREP_TEST_DATABASE_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => return None,
    };
    set_test_env(&database_url);

    let settings = Settings::load().expect("settings");
    let db = prepare_db(&settings).await;

    let state = AppState::new(settings, db);
    let app = api::router::router(state.clone());

    Some(TestContext { state, app, _guard: guard })
}

async fn prepare_db(settings: &Settings) -> PgPool {
    let db = crate::db::init_pool(settings).await.expect("db pool");
    let current_db: String = sqlx::query_scalar("SELECT current_database()")
        .fetch_one(&db)
        .await
        .expect("current database");
    assert!(current_db.ends_with("_test"), "refusing to reset database {current_db}");

    reset_public_schema(&db).await.expect("reset schema");
    ensure_schema(&db).await.expect("schema");
    db
}

async fn reset_public_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("DROP SCHEMA IF EXISTS public CASCADE").execute(pool).await?;
    sqlx::query("CREATE SCHEMA public").execute(pool).await?;
    Ok(())
}

async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let migrations_dir =
        std::env::var("BANDPREP_MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
    let mut migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&migrations_dir))
        .await
        .map_err(|error| sqlx::Error::Migrate(Box::new(error)))?;
    migrator.set_ignore_missing(true);
    migrator.run(pool).await.map_err(|error| sqlx::Error::Migrate(Box::new(error)))?;
    Ok(())
}

pub(crate) fn user_id() -> String {
    format!("user-{}", Uuid::new_v4())
}

pub(crate) fn question_fixture(id: i32, section: Section, question_type: QuestionType) -> Question {
    Question {
        id,
        section,
        part: None,
        question_type,
        content: format!("Question {id}"),
        options: None,
        correct_answer: None,
        explanation: None,
        passage_id: None,
        difficulty: 1,
        tags: None,
    }
}

pub(crate) async fn insert_passage(pool: &PgPool, title: &str, section: Section) -> Passage {
    repositories::passages::create(
        pool,
        repositories::passages::CreatePassage {
            title,
            content: "Fixture passage content.",
            section,
            metadata: None,
        },
    )
    .await
    .expect("insert passage")
}

pub(crate) async fn insert_question(
    pool: &PgPool,
    section: Section,
    question_type: QuestionType,
    content: &str,
    correct_answer: Option<Value>,
) -> Question {
    insert_question_for_passage(pool, section, question_type, content, correct_answer, None).await
}

pub(crate) async fn insert_question_for_passage(
    pool: &PgPool,
    section: Section,
    question_type: QuestionType,
    content: &str,
    correct_answer: Option<Value>,
    passage_id: Option<i32>,
) -> Question {
    repositories::questions::create(
        pool,
        repositories::questions::CreateQuestion {
            section,
            part: None,
            question_type,
            content,
            options: None,
            correct_answer,
            explanation: None,
            passage_id,
            difficulty: 1,
            tags: None,
        },
    )
    .await
    .expect("insert question")
}

pub(crate) async fn insert_test(pool: &PgPool, title: &str, structure: Value) -> Test {
    insert_test_at(pool, title, structure, primitive_now_utc()).await
}

pub(crate) async fn insert_test_at(
    pool: &PgPool,
    title: &str,
    structure: Value,
    created_at: PrimitiveDateTime,
) -> Test {
    repositories::tests::create(
        pool,
        repositories::tests::CreateTest { title, structure, is_system: true, created_at },
    )
    .await
    .expect("insert test")
}

pub(crate) async fn start_attempt(ctx: &TestContext, user: &str, test_id: i32) -> i64 {
    let response = ctx
        .app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/attempts",
            Some(user),
            Some(serde_json::json!({"testId": test_id})),
        ))
        .await
        .expect("create attempt");

    let status = response.status();
    let body = read_json(response).await;
    assert_eq!(status, axum::http::StatusCode::CREATED, "response: {body}");
    body["id"].as_i64().expect("attempt id")
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    user_id: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id);
    }

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}
