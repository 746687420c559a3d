use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::db::models::{AttemptAnswer, Question};
use crate::db::types::QuestionType;

pub(crate) const BAND_FLOOR: f64 = 4.0;

const BAND_TABLE: &[(f64, f64)] = &[
    (90.0, 9.0),
    (80.0, 8.5),
    (70.0, 8.0),
    (65.0, 7.5),
    (60.0, 7.0),
    (55.0, 6.5),
    (50.0, 6.0),
    (45.0, 5.5),
    (40.0, 5.0),
    (35.0, 4.5),
];

/// Answer key shapes by question type. Essay, letter and speaking prompts
/// have no key and are excluded from auto-scoring entirely.
#[derive(Debug, Clone, PartialEq)]
enum AnswerKey {
    Choice(String),
    TrueFalseNotGiven(Verdict),
    Accepted(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    True,
    False,
    NotGiven,
}

impl Verdict {
    fn parse(value: &str) -> Option<Verdict> {
        match value.trim().to_lowercase().as_str() {
            "true" => Some(Verdict::True),
            "false" => Some(Verdict::False),
            "not given" => Some(Verdict::NotGiven),
            _ => None,
        }
    }
}

impl AnswerKey {
    fn from_question(question: &Question) -> Option<AnswerKey> {
        let raw = &question.correct_answer.as_ref()?.0;

        match question.question_type {
            QuestionType::Essay
            | QuestionType::Letter
            | QuestionType::SpeakingPart1
            | QuestionType::SpeakingPart2
            | QuestionType::SpeakingPart3 => None,
            QuestionType::MultipleChoice => Some(AnswerKey::Choice(canonical_text(raw))),
            QuestionType::TrueFalseNotGiven => {
                let text = canonical_text(raw);
                match Verdict::parse(&text) {
                    Some(verdict) => Some(AnswerKey::TrueFalseNotGiven(verdict)),
                    // Nonstandard key text still scores as a literal match.
                    None => Some(AnswerKey::Text(text)),
                }
            }
            QuestionType::ShortAnswer => {
                let text = canonical_text(raw);
                let accepted: Vec<String> = text
                    .split('|')
                    .map(|item| item.trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect();
                if accepted.is_empty() {
                    Some(AnswerKey::Text(text))
                } else {
                    Some(AnswerKey::Accepted(accepted))
                }
            }
            QuestionType::MatchingHeadings
            | QuestionType::MatchingInformation
            | QuestionType::SentenceCompletion => Some(AnswerKey::Text(canonical_text(raw))),
        }
    }

    fn matches(&self, submitted: &Value) -> bool {
        let submitted = normalize(&canonical_text(submitted));
        match self {
            AnswerKey::Choice(expected) | AnswerKey::Text(expected) => {
                normalize(expected) == submitted
            }
            AnswerKey::TrueFalseNotGiven(expected) => Verdict::parse(&submitted) == Some(*expected),
            AnswerKey::Accepted(options) => {
                options.iter().any(|option| normalize(option) == submitted)
            }
        }
    }
}

/// A JSON string compares as its text; any other value compares as its
/// compact serialization.
fn canonical_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct AnswerGrade {
    pub(crate) question_id: i32,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct ScoreSummary {
    pub(crate) correct: u32,
    pub(crate) total: u32,
    pub(crate) band: f64,
}

/// Verdict per answered, auto-scorable question. Rows without a submitted
/// value, and rows for questions outside `questions` or without a key, are
/// skipped.
pub(crate) fn grade_answers(questions: &[Question], answers: &[AttemptAnswer]) -> Vec<AnswerGrade> {
    let keys: HashMap<i32, AnswerKey> = questions
        .iter()
        .filter_map(|question| {
            AnswerKey::from_question(question).map(|key| (question.id, key))
        })
        .collect();

    answers
        .iter()
        .filter_map(|row| {
            let key = keys.get(&row.question_id)?;
            let submitted = row.answer.as_ref()?;
            Some(AnswerGrade { question_id: row.question_id, is_correct: key.matches(&submitted.0) })
        })
        .collect()
}

/// The denominator is every question holding an answer key, answered or not.
pub(crate) fn summarize(questions: &[Question], grades: &[AnswerGrade]) -> ScoreSummary {
    let total =
        questions.iter().filter(|question| AnswerKey::from_question(question).is_some()).count()
            as u32;

    if total == 0 {
        return ScoreSummary { correct: 0, total: 0, band: BAND_FLOOR };
    }

    let correct = grades.iter().filter(|grade| grade.is_correct).count() as u32;
    let accuracy = f64::from(correct) / f64::from(total) * 100.0;

    ScoreSummary { correct, total, band: band_for_accuracy(accuracy) }
}

pub(crate) fn band_for_accuracy(percent: f64) -> f64 {
    for (threshold, band) in BAND_TABLE {
        if percent >= *threshold {
            return *band;
        }
    }
    BAND_FLOOR
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sqlx::types::Json;

    use super::*;
    use crate::db::types::Section;

    fn question(id: i32, question_type: QuestionType, correct_answer: Option<Value>) -> Question {
        Question {
            id,
            section: Section::Reading,
            part: None,
            question_type,
            content: format!("Question {id}"),
            options: None,
            correct_answer: correct_answer.map(Json),
            explanation: None,
            passage_id: None,
            difficulty: 1,
            tags: None,
        }
    }

    fn answer(question_id: i32, value: Option<Value>) -> AttemptAnswer {
        AttemptAnswer {
            id: question_id,
            attempt_id: 1,
            question_id,
            answer: value.map(Json),
            is_correct: Some(false),
            score: Some(0),
            ai_feedback: None,
        }
    }

    fn score_attempt(questions: &[Question], answers: &[AttemptAnswer]) -> ScoreSummary {
        summarize(questions, &grade_answers(questions, answers))
    }

    #[test]
    fn band_table_boundaries() {
        assert_eq!(band_for_accuracy(100.0), 9.0);
        assert_eq!(band_for_accuracy(90.0), 9.0);
        assert_eq!(band_for_accuracy(89.99), 8.5);
        assert_eq!(band_for_accuracy(80.0), 8.5);
        assert_eq!(band_for_accuracy(70.0), 8.0);
        assert_eq!(band_for_accuracy(65.0), 7.5);
        assert_eq!(band_for_accuracy(60.0), 7.0);
        assert_eq!(band_for_accuracy(55.0), 6.5);
        assert_eq!(band_for_accuracy(50.0), 6.0);
        assert_eq!(band_for_accuracy(45.0), 5.5);
        assert_eq!(band_for_accuracy(40.0), 5.0);
        assert_eq!(band_for_accuracy(35.0), 4.5);
        assert_eq!(band_for_accuracy(34.9), 4.0);
        assert_eq!(band_for_accuracy(0.0), 4.0);
    }

    #[test]
    fn band_mapping_is_monotonic() {
        let mut previous = 0.0;
        let mut percent = 0.0;
        while percent <= 100.0 {
            let band = band_for_accuracy(percent);
            assert!(band >= previous, "band dropped at {percent}%");
            previous = band;
            percent += 0.5;
        }
    }

    #[test]
    fn eight_of_ten_scores_band_eight_and_a_half() {
        let questions: Vec<Question> = (1..=10)
            .map(|id| question(id, QuestionType::MultipleChoice, Some(json!("a"))))
            .collect();
        let answers: Vec<AttemptAnswer> = (1..=10)
            .map(|id| answer(id, Some(if id <= 8 { json!("a") } else { json!("b") })))
            .collect();

        let summary = score_attempt(&questions, &answers);
        assert_eq!(summary, ScoreSummary { correct: 8, total: 10, band: 8.5 });
    }

    #[test]
    fn questions_without_keys_are_excluded_from_total() {
        let questions = vec![
            question(1, QuestionType::MultipleChoice, Some(json!("a"))),
            question(2, QuestionType::Essay, None),
            question(3, QuestionType::SpeakingPart2, None),
            question(4, QuestionType::MultipleChoice, None),
        ];
        let answers = vec![
            answer(1, Some(json!("a"))),
            answer(2, Some(json!("My essay text"))),
        ];

        let summary = score_attempt(&questions, &answers);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.total, 1);
        assert_eq!(summary.band, 9.0);
    }

    #[test]
    fn zero_scorable_questions_defaults_to_floor() {
        let questions = vec![question(1, QuestionType::Letter, None)];
        let summary = score_attempt(&questions, &[answer(1, Some(json!("Dear sir")))]);
        assert_eq!(summary, ScoreSummary { correct: 0, total: 0, band: BAND_FLOOR });
    }

    #[test]
    fn unanswered_scorable_questions_stay_in_the_denominator() {
        let questions = vec![
            question(1, QuestionType::MultipleChoice, Some(json!("a"))),
            question(2, QuestionType::MultipleChoice, Some(json!("b"))),
        ];
        let answers = vec![answer(1, Some(json!("a")))];

        let summary = score_attempt(&questions, &answers);
        assert_eq!(summary, ScoreSummary { correct: 1, total: 2, band: 6.0 });
    }

    #[test]
    fn text_comparison_trims_and_ignores_case() {
        let questions =
            vec![question(1, QuestionType::SentenceCompletion, Some(json!("Lu Yu")))];
        let answers = vec![answer(1, Some(json!("  lu yu ")))];

        assert_eq!(score_attempt(&questions, &answers).correct, 1);
    }

    #[test]
    fn short_answer_accepts_any_listed_literal() {
        let questions =
            vec![question(1, QuestionType::ShortAnswer, Some(json!("cat|feline|the cat")))];

        let hit = score_attempt(&questions, &[answer(1, Some(json!("Feline")))]);
        assert_eq!(hit.correct, 1);

        let miss = score_attempt(&questions, &[answer(1, Some(json!("dog")))]);
        assert_eq!(miss.correct, 0);
    }

    #[test]
    fn true_false_not_given_matches_by_meaning() {
        let questions =
            vec![question(1, QuestionType::TrueFalseNotGiven, Some(json!("not given")))];

        assert_eq!(score_attempt(&questions, &[answer(1, Some(json!("Not Given")))]).correct, 1);
        assert_eq!(score_attempt(&questions, &[answer(1, Some(json!("true")))]).correct, 0);
        assert_eq!(score_attempt(&questions, &[answer(1, Some(json!("maybe")))]).correct, 0);
    }

    #[test]
    fn multiple_choice_compares_the_option_key() {
        let mut mcq = question(1, QuestionType::MultipleChoice, Some(json!("b")));
        mcq.options = Some(Json(json!({"a": "History", "b": "Science"})));

        assert_eq!(score_attempt(&[mcq.clone()], &[answer(1, Some(json!("B")))]).correct, 1);
        assert_eq!(score_attempt(&[mcq], &[answer(1, Some(json!("Science")))]).correct, 0);
    }

    #[test]
    fn structured_payloads_compare_canonically() {
        let questions =
            vec![question(1, QuestionType::MatchingHeadings, Some(json!(["ii", "iv"])))];

        assert_eq!(
            score_attempt(&questions, &[answer(1, Some(json!(["ii", "iv"])))]).correct,
            1
        );
        assert_eq!(
            score_attempt(&questions, &[answer(1, Some(json!(["iv", "ii"])))]).correct,
            0
        );
    }

    #[test]
    fn null_submissions_and_unknown_questions_are_skipped() {
        let questions = vec![question(1, QuestionType::MultipleChoice, Some(json!("a")))];
        let answers = vec![answer(1, None), answer(99, Some(json!("a")))];

        let grades = grade_answers(&questions, &answers);
        assert!(grades.is_empty());

        let summary = summarize(&questions, &grades);
        assert_eq!(summary, ScoreSummary { correct: 0, total: 1, band: BAND_FLOOR });
    }

    #[test]
    fn grade_answers_reports_each_verdict() {
        let questions = vec![
            question(1, QuestionType::MultipleChoice, Some(json!("a"))),
            question(2, QuestionType::ShortAnswer, Some(json!("tea"))),
        ];
        let answers = vec![answer(1, Some(json!("a"))), answer(2, Some(json!("coffee")))];

        let grades = grade_answers(&questions, &answers);
        assert_eq!(grades.len(), 2);
        assert!(grades.iter().find(|g| g.question_id == 1).unwrap().is_correct);
        assert!(!grades.iter().find(|g| g.question_id == 2).unwrap().is_correct);
    }
}
