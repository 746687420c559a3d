use serde::Serialize;
use time::{Duration, OffsetDateTime};

const FIFTEEN_DAY_CAP: i64 = 15;
const THIRTY_DAY_CAP: i64 = 30;

const FOCUS_HIGH: &[&str] = &[
    "Advanced vocabulary and collocations",
    "Complex sentence structures",
    "Nuanced opinion essays",
    "Fluent spontaneous speech",
];

const FOCUS_MID: &[&str] = &[
    "Paraphrasing and synonyms",
    "Essay structure and coherence",
    "Skimming and scanning speed",
    "Pronunciation and intonation",
];

const FOCUS_BASE: &[&str] = &[
    "Core grammar accuracy",
    "High-frequency vocabulary",
    "Basic letter and essay templates",
    "Listening for specific details",
];

const LISTENING_TASKS: &[&str] = &[
    "Complete one listening section under timed conditions",
    "Review the transcript and note every missed answer",
    "Practice spelling dictation for names and numbers",
];

const READING_TASKS: &[&str] = &[
    "Read one General Training passage and answer all questions",
    "Time yourself: 20 minutes per passage",
    "Log unfamiliar words with example sentences",
];

const WRITING_TASKS: &[&str] = &[
    "Write one Task 1 letter, formal or informal",
    "Outline two Task 2 essay questions",
    "Compare your structure against a model answer",
];

const SPEAKING_TASKS: &[&str] = &[
    "Record yourself answering Part 1 questions",
    "Prepare one Part 2 cue card and speak for 2 minutes",
    "Shadow a fluent speaker for 10 minutes",
];

const MIXED_TASKS: &[&str] = &[
    "Review this week's vocabulary notes",
    "Redo the hardest exercises from earlier in the week",
    "Run one short drill in each of your two weakest skills",
];

const FULL_MOCK_TASKS: &[&str] = &[
    "Sit a complete mock test under exam conditions",
    "Mark every section and work out your band",
    "List the three costliest mistakes to fix next week",
];

const HALF_TEST_TASKS: &[&str] = &[
    "Complete a half-length practice test: listening and reading",
    "Review every wrong answer in detail",
    "Note the question types that slow you down",
];

const REST_TASKS: &[&str] = &[
    "Take the day away from screens",
    "Light review only: flip through your vocabulary notes",
    "Plan next week's study slots",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlanMode {
    FifteenDay,
    ThirtyDay,
}

impl PlanMode {
    pub(crate) fn for_days(days_until_exam: i64) -> PlanMode {
        if days_until_exam <= FIFTEEN_DAY_CAP {
            PlanMode::FifteenDay
        } else {
            PlanMode::ThirtyDay
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            PlanMode::FifteenDay => "15-day",
            PlanMode::ThirtyDay => "30-day",
        }
    }

    fn cap(&self) -> i64 {
        match self {
            PlanMode::FifteenDay => FIFTEEN_DAY_CAP,
            PlanMode::ThirtyDay => THIRTY_DAY_CAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct DayTask {
    pub(crate) day: i64,
    pub(crate) week: i64,
    pub(crate) date: String,
    pub(crate) section: String,
    pub(crate) tasks: Vec<String>,
    pub(crate) estimated_minutes: i32,
    pub(crate) completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct WeeklyGoal {
    pub(crate) week: i64,
    pub(crate) goal: String,
    pub(crate) focus: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct PlanData {
    pub(crate) mode: &'static str,
    pub(crate) target_band: f64,
    pub(crate) total_days: i64,
    pub(crate) focus_areas: Vec<String>,
    pub(crate) weekly_goals: Vec<WeeklyGoal>,
    pub(crate) daily_tasks: Vec<DayTask>,
    pub(crate) tips: Vec<String>,
}

/// Whole days from `now` to the exam, rounded up so any remaining part of
/// a day counts as a full one.
pub(crate) fn days_until_exam(now: OffsetDateTime, exam_date: OffsetDateTime) -> i64 {
    let millis = (exam_date - now).whole_milliseconds();
    (millis as f64 / 86_400_000.0).ceil() as i64
}

pub(crate) fn focus_areas(target_band: f64) -> &'static [&'static str] {
    if target_band >= 7.5 {
        FOCUS_HIGH
    } else if target_band >= 6.5 {
        FOCUS_MID
    } else {
        FOCUS_BASE
    }
}

/// Builds a day-by-day schedule up to the exam, capped at the mode length.
/// `now` anchors the calendar dates stamped on each day; everything else is
/// a pure function of the target band and days remaining.
pub(crate) fn generate_plan(
    target_band: f64,
    days_until_exam: i64,
    now: OffsetDateTime,
) -> PlanData {
    let mode = PlanMode::for_days(days_until_exam);
    let focus = focus_areas(target_band);
    let schedule_days = days_until_exam.clamp(0, mode.cap());

    let mut daily_tasks = Vec::with_capacity(schedule_days.max(0) as usize);
    for day in 1..=schedule_days {
        let week = (day + 6) / 7;
        let position = ((day - 1) % 7) + 1;
        let (section, tasks) = day_blueprint(position, week);
        let date = (now + Duration::days(day - 1)).date().to_string();

        daily_tasks.push(DayTask {
            day,
            week,
            date,
            section: section.to_string(),
            tasks: tasks.iter().map(|task| task.to_string()).collect(),
            estimated_minutes: estimated_minutes(section),
            completed: false,
        });
    }

    PlanData {
        mode: mode.as_str(),
        target_band,
        total_days: daily_tasks.len() as i64,
        focus_areas: focus.iter().map(|area| area.to_string()).collect(),
        weekly_goals: weekly_goals(mode, focus),
        daily_tasks,
        tips: tips(target_band),
    }
}

fn day_blueprint(position: i64, week: i64) -> (&'static str, &'static [&'static str]) {
    match position {
        1 => ("listening", LISTENING_TASKS),
        2 => ("reading", READING_TASKS),
        3 => ("writing", WRITING_TASKS),
        4 => ("speaking", SPEAKING_TASKS),
        5 => ("mixed", MIXED_TASKS),
        6 if week % 2 == 0 => ("full_test", FULL_MOCK_TASKS),
        6 => ("full_test", HALF_TEST_TASKS),
        _ => ("rest", REST_TASKS),
    }
}

fn estimated_minutes(section: &str) -> i32 {
    match section {
        "full_test" => 180,
        "rest" => 30,
        _ => 90,
    }
}

fn weekly_goals(mode: PlanMode, focus: &[&str]) -> Vec<WeeklyGoal> {
    let skill_focus = match focus {
        [first, second, ..] => format!("{first}, {second}"),
        [only] => (*only).to_string(),
        [] => String::new(),
    };

    let mut goals = vec![
        WeeklyGoal {
            week: 1,
            goal: "Build a steady daily study habit".to_string(),
            focus: "Foundation: timing, question formats, and a baseline score".to_string(),
        },
        WeeklyGoal {
            week: 2,
            goal: "Strengthen your two weakest skills".to_string(),
            focus: skill_focus,
        },
    ];

    if mode == PlanMode::ThirtyDay {
        goals.push(WeeklyGoal {
            week: 3,
            goal: "Raise intensity with daily timed practice".to_string(),
            focus: "Intensive practice: full sections under exam timing".to_string(),
        });
        goals.push(WeeklyGoal {
            week: 4,
            goal: "Polish exam technique on full mocks".to_string(),
            focus: "Mock tests: pacing, transfer time, and answer sheets".to_string(),
        });
    }

    goals
}

fn tips(target_band: f64) -> Vec<String> {
    let mut tips: Vec<String> = [
        "Study at the same time every day to build momentum",
        "Always practice under timed conditions",
        "Keep an error log and review it before each session",
        "Simulate the full exam at least once a week",
    ]
    .iter()
    .map(|tip| tip.to_string())
    .collect();

    if target_band >= 7.0 {
        tips.push("Aim for precise vocabulary and natural coherence over memorized phrases".to_string());
    } else {
        tips.push("Prioritize accuracy and clear basic structures over ambitious language".to_string());
    }

    tips
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn anchor() -> OffsetDateTime {
        datetime!(2025-03-01 09:00 UTC)
    }

    #[test]
    fn days_until_exam_rounds_partial_days_up() {
        let now = anchor();
        assert_eq!(days_until_exam(now, now + Duration::hours(24)), 1);
        assert_eq!(days_until_exam(now, now + Duration::hours(36)), 2);
        assert_eq!(days_until_exam(now, now + Duration::minutes(1)), 1);
        assert_eq!(days_until_exam(now, now), 0);
        assert_eq!(days_until_exam(now, now - Duration::hours(1)), 0);
        assert_eq!(days_until_exam(now, now - Duration::hours(49)), -2);
    }

    #[test]
    fn mode_flips_between_fifteen_and_sixteen_days() {
        assert_eq!(PlanMode::for_days(15), PlanMode::FifteenDay);
        assert_eq!(PlanMode::for_days(16), PlanMode::ThirtyDay);
    }

    #[test]
    fn generator_is_deterministic() {
        let first = generate_plan(6.5, 20, anchor());
        let second = generate_plan(6.5, 20, anchor());
        assert_eq!(first, second);
    }

    #[test]
    fn schedule_is_capped_at_mode_length() {
        let short = generate_plan(6.0, 10, anchor());
        assert_eq!(short.total_days, 10);
        assert_eq!(short.daily_tasks.len(), 10);

        let capped = generate_plan(6.0, 45, anchor());
        assert_eq!(capped.mode, "30-day");
        assert_eq!(capped.total_days, 30);
    }

    #[test]
    fn sections_rotate_on_a_seven_day_cycle() {
        let plan = generate_plan(6.0, 15, anchor());
        let sections: Vec<&str> =
            plan.daily_tasks.iter().map(|task| task.section.as_str()).collect();

        assert_eq!(
            &sections[..8],
            &["listening", "reading", "writing", "speaking", "mixed", "full_test", "rest",
              "listening"]
        );
    }

    #[test]
    fn day_six_alternates_mock_scope_by_week_parity() {
        let plan = generate_plan(6.0, 30, anchor());

        let week_one = &plan.daily_tasks[5];
        assert_eq!(week_one.section, "full_test");
        assert_eq!(week_one.tasks[0], HALF_TEST_TASKS[0]);

        let week_two = &plan.daily_tasks[12];
        assert_eq!(week_two.section, "full_test");
        assert_eq!(week_two.tasks[0], FULL_MOCK_TASKS[0]);
        assert_eq!(week_two.estimated_minutes, 180);
    }

    #[test]
    fn estimated_minutes_follow_the_section() {
        let plan = generate_plan(6.0, 15, anchor());
        assert_eq!(plan.daily_tasks[0].estimated_minutes, 90);
        assert_eq!(plan.daily_tasks[5].estimated_minutes, 180);
        assert_eq!(plan.daily_tasks[6].estimated_minutes, 30);
    }

    #[test]
    fn dates_advance_one_day_from_now() {
        let plan = generate_plan(6.0, 3, anchor());
        let dates: Vec<&str> = plan.daily_tasks.iter().map(|task| task.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-03-01", "2025-03-02", "2025-03-03"]);
    }

    #[test]
    fn week_index_increments_every_seven_days() {
        let plan = generate_plan(6.0, 15, anchor());
        assert_eq!(plan.daily_tasks[6].week, 1);
        assert_eq!(plan.daily_tasks[7].week, 2);
        assert_eq!(plan.daily_tasks[14].week, 3);
    }

    #[test]
    fn focus_areas_follow_band_tiers() {
        assert_eq!(focus_areas(7.5), FOCUS_HIGH);
        assert_eq!(focus_areas(7.0), FOCUS_MID);
        assert_eq!(focus_areas(6.5), FOCUS_MID);
        assert_eq!(focus_areas(6.0), FOCUS_BASE);
    }

    #[test]
    fn skill_building_goal_joins_first_two_focus_areas() {
        let plan = generate_plan(7.0, 15, anchor());
        assert_eq!(plan.weekly_goals.len(), 2);
        assert_eq!(plan.weekly_goals[1].focus, "Paraphrasing and synonyms, Essay structure and coherence");

        let long = generate_plan(7.0, 30, anchor());
        assert_eq!(long.weekly_goals.len(), 4);
        assert_eq!(long.weekly_goals[2].week, 3);
    }

    #[test]
    fn fifth_tip_depends_on_target_band() {
        let upper = generate_plan(7.0, 15, anchor());
        assert_eq!(upper.tips.len(), 5);
        assert!(upper.tips[4].contains("coherence"));

        let lower = generate_plan(6.5, 15, anchor());
        assert_eq!(lower.tips.len(), 5);
        assert!(lower.tips[4].contains("accuracy"));
    }

    #[test]
    fn band_seven_ten_days_scenario() {
        let plan = generate_plan(7.0, 10, anchor());

        assert_eq!(plan.mode, "15-day");
        assert_eq!(plan.total_days, 10);
        assert_eq!(plan.focus_areas[0], FOCUS_MID[0]);

        let day_six = &plan.daily_tasks[5];
        assert_eq!(day_six.section, "full_test");
        assert_eq!(day_six.estimated_minutes, 180);
        assert_eq!(day_six.tasks[0], HALF_TEST_TASKS[0]);
        assert!(!day_six.completed);
    }

    #[test]
    fn payload_serializes_expected_field_names() {
        let plan = generate_plan(6.5, 2, anchor());
        let value = serde_json::to_value(&plan).unwrap();

        for key in ["mode", "target_band", "total_days", "focus_areas", "weekly_goals",
                    "daily_tasks", "tips"] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }

        let day = &value["daily_tasks"][0];
        for key in ["day", "week", "date", "section", "tasks", "estimated_minutes", "completed"] {
            assert!(day.get(key).is_some(), "missing day key {key}");
        }
    }
}
