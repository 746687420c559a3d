use serde_json::json;

use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::{QuestionType, Section};
use crate::repositories;

const TEA_PASSAGE: &str = "Tea originated in China, where it was first consumed as a medicinal \
brew long before it became an everyday drink. During the Tang dynasty the scholar Lu Yu wrote \
The Classic of Tea, the first known monograph on the subject, describing cultivation, \
preparation and the etiquette of serving. Trade along the caravan routes later carried tea to \
Central Asia and eventually to Europe, where it arrived in the early seventeenth century. By \
the nineteenth century tea had become a staple of daily life in Britain and remains one of the \
most widely consumed beverages in the world.";

/// Seeds a small demo library on an empty database so a fresh deployment
/// has something to show. Skipped when any test already exists.
pub(crate) async fn ensure_demo_content(state: &AppState) -> anyhow::Result<()> {
    if !state.settings().content().seed_demo_content {
        tracing::info!("Demo content seeding disabled");
        return Ok(());
    }

    let existing = repositories::tests::count(state.db()).await?;
    if existing > 0 {
        tracing::info!(tests = existing, "Content already present; skipping demo seed");
        return Ok(());
    }

    let passage = repositories::passages::create(
        state.db(),
        repositories::passages::CreatePassage {
            title: "The History of Tea",
            content: TEA_PASSAGE,
            section: Section::Reading,
            metadata: Some(json!({"wordCount": 110, "source": "demo"})),
        },
    )
    .await?;

    let listening = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            section: Section::Listening,
            part: Some(1),
            question_type: QuestionType::MultipleChoice,
            content: "What time does the library open on Saturdays?",
            options: Some(json!({"a": "8 am", "b": "9 am", "c": "10 am"})),
            correct_answer: Some(json!("b")),
            explanation: Some("The speaker corrects herself: weekday hours start at 8, \
                               weekends at 9."),
            passage_id: None,
            difficulty: 1,
            tags: Some(vec!["section1".to_string(), "times".to_string()]),
        },
    )
    .await?;

    let reading_mcq = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            section: Section::Reading,
            part: None,
            question_type: QuestionType::MultipleChoice,
            content: "During which dynasty was The Classic of Tea written?",
            options: Some(json!({"a": "Han", "b": "Tang", "c": "Song"})),
            correct_answer: Some(json!("b")),
            explanation: None,
            passage_id: Some(passage.id),
            difficulty: 2,
            tags: None,
        },
    )
    .await?;

    let reading_short = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            section: Section::Reading,
            part: None,
            question_type: QuestionType::ShortAnswer,
            content: "Which scholar wrote the first known monograph on tea?",
            options: None,
            correct_answer: Some(json!("lu yu|the scholar lu yu")),
            explanation: None,
            passage_id: Some(passage.id),
            difficulty: 2,
            tags: None,
        },
    )
    .await?;

    let reading_tfng = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            section: Section::Reading,
            part: None,
            question_type: QuestionType::TrueFalseNotGiven,
            content: "The passage states that tea was discovered in India.",
            options: None,
            correct_answer: Some(json!("false")),
            explanation: Some("The passage says tea originated in China."),
            passage_id: Some(passage.id),
            difficulty: 1,
            tags: None,
        },
    )
    .await?;

    let writing = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            section: Section::Writing,
            part: Some(1),
            question_type: QuestionType::Letter,
            content: "You recently moved to a new town. Write a letter to a friend describing \
                      your new home and inviting them to visit.",
            options: None,
            correct_answer: None,
            explanation: None,
            passage_id: None,
            difficulty: 2,
            tags: Some(vec!["informal".to_string()]),
        },
    )
    .await?;

    let speaking = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            section: Section::Speaking,
            part: Some(1),
            question_type: QuestionType::SpeakingPart1,
            content: "Describe your hometown. What do you like most about living there?",
            options: None,
            correct_answer: None,
            explanation: None,
            passage_id: None,
            difficulty: 1,
            tags: None,
        },
    )
    .await?;

    let structure = json!({
        "sections": {
            "listening": {"questionIds": [listening.id]},
            "reading": {"questionIds": [reading_mcq.id, reading_short.id, reading_tfng.id]},
            "writing": {"tasks": [{"questionId": writing.id}]},
            "speaking": {"parts": [{"questionId": speaking.id}]}
        }
    });

    let test = repositories::tests::create(
        state.db(),
        repositories::tests::CreateTest {
            title: "IELTS GT Mock Test 1",
            structure,
            is_system: true,
            created_at: primitive_now_utc(),
        },
    )
    .await?;

    tracing::info!(test_id = test.id, action = "demo_seed", "Seeded demo content");

    Ok(())
}
