use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "section", rename_all = "lowercase")]
pub(crate) enum Section {
    Listening,
    Reading,
    Writing,
    Speaking,
}

impl Section {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Section::Listening => "listening",
            Section::Reading => "reading",
            Section::Writing => "writing",
            Section::Speaking => "speaking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "question_type", rename_all = "snake_case")]
pub(crate) enum QuestionType {
    MultipleChoice,
    TrueFalseNotGiven,
    MatchingHeadings,
    MatchingInformation,
    SentenceCompletion,
    ShortAnswer,
    Essay,
    Letter,
    #[serde(rename = "speaking_part_1")]
    #[sqlx(rename = "speaking_part_1")]
    SpeakingPart1,
    #[serde(rename = "speaking_part_2")]
    #[sqlx(rename = "speaking_part_2")]
    SpeakingPart2,
    #[serde(rename = "speaking_part_3")]
    #[sqlx(rename = "speaking_part_3")]
    SpeakingPart3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "attempt_status", rename_all = "snake_case")]
pub(crate) enum AttemptStatus {
    InProgress,
    Completed,
}
