use std::collections::{HashMap, HashSet};

use serde_json::Value;
use sqlx::PgPool;

use crate::db::models::{Passage, Question, Test};
use crate::repositories;

pub(crate) struct ResolvedTest {
    pub(crate) test: Test,
    pub(crate) questions: Vec<Question>,
}

/// Fetches a test and expands its structure document into the full
/// question list, batched into a single lookup.
pub(crate) async fn resolve_test(
    pool: &PgPool,
    test_id: i32,
) -> Result<Option<ResolvedTest>, sqlx::Error> {
    let Some(test) = repositories::tests::find_by_id(pool, test_id).await? else {
        return Ok(None);
    };

    let ids = collect_question_ids(&test.structure.0);
    let fetched = repositories::questions::list_by_ids(pool, &ids).await?;

    // Rows come back in id order; restore the order the structure listed them in.
    let mut by_id: HashMap<i32, Question> = fetched.into_iter().map(|q| (q.id, q)).collect();
    let questions = ids.iter().filter_map(|id| by_id.remove(id)).collect();

    Ok(Some(ResolvedTest { test, questions }))
}

pub(crate) async fn passages_for_questions(
    pool: &PgPool,
    questions: &[Question],
) -> Result<Vec<Passage>, sqlx::Error> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for question in questions {
        if let Some(passage_id) = question.passage_id {
            if seen.insert(passage_id) {
                ids.push(passage_id);
            }
        }
    }
    repositories::passages::list_by_ids(pool, &ids).await
}

/// Walks a test structure and returns every referenced question id once,
/// in first-seen order.
///
/// Question references live in `questionIds` arrays, `tasks[].questionId`
/// and `parts[].questionId`, either inside section nodes (`sections` as an
/// array or a name-keyed map) or directly at the top level in the legacy
/// layout. String entries among the sections carry no references and are
/// skipped.
pub(crate) fn collect_question_ids(structure: &Value) -> Vec<i32> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    collect_node_refs(structure, &mut seen, &mut ids);

    match structure.get("sections") {
        Some(Value::Array(entries)) => {
            for entry in entries {
                collect_node_refs(entry, &mut seen, &mut ids);
            }
        }
        Some(Value::Object(map)) => {
            for entry in map.values() {
                collect_node_refs(entry, &mut seen, &mut ids);
            }
        }
        _ => {}
    }

    ids
}

fn collect_node_refs(node: &Value, seen: &mut HashSet<i32>, ids: &mut Vec<i32>) {
    if let Some(direct) = node.get("questionIds").and_then(Value::as_array) {
        for id in direct.iter().filter_map(question_id) {
            if seen.insert(id) {
                ids.push(id);
            }
        }
    }

    for key in ["tasks", "parts"] {
        if let Some(entries) = node.get(key).and_then(Value::as_array) {
            for entry in entries {
                if let Some(id) = entry.get("questionId").and_then(question_id) {
                    if seen.insert(id) {
                        ids.push(id);
                    }
                }
            }
        }
    }
}

fn question_id(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|id| i32::try_from(id).ok())
}
