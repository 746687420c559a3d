use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, Time,
};
use validator::Validate;

pub(crate) use crate::core::time::format_primitive;
use crate::db::models::StudyPlan;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StudyPlanCreate {
    #[serde(alias = "targetBand")]
    #[validate(range(min = 4.0, max = 9.0, message = "target_band must be between 4.0 and 9.0"))]
    pub(crate) target_band: f64,
    #[serde(alias = "examDate", deserialize_with = "deserialize_offset_datetime_flexible")]
    pub(crate) exam_date: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudyPlanResponse {
    pub(crate) id: i32,
    pub(crate) user_id: String,
    pub(crate) target_band: f64,
    pub(crate) exam_date: String,
    pub(crate) plan_data: Value,
    pub(crate) progress: Option<Value>,
    pub(crate) created_at: String,
}

impl StudyPlanResponse {
    pub(crate) fn from_model(plan: StudyPlan) -> StudyPlanResponse {
        StudyPlanResponse {
            id: plan.id,
            user_id: plan.user_id,
            target_band: band_from_storage(plan.target_band),
            exam_date: format_primitive(plan.exam_date),
            plan_data: plan.plan_data.0,
            progress: plan.progress.map(|value| value.0),
            created_at: format_primitive(plan.created_at),
        }
    }
}

/// Bands are stored doubled so half-steps stay integral: display 6.5 is
/// stored 13. Apply each direction exactly once, at this boundary.
pub(crate) fn band_to_storage(display: f64) -> i32 {
    (display * 2.0).round() as i32
}

pub(crate) fn band_from_storage(stored: i32) -> f64 {
    f64::from(stored) / 2.0
}

fn parse_offset_datetime_flexible(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    // Date pickers often send a bare calendar date.
    if let Ok(value) = Date::parse(raw, &format_description!("[year]-[month]-[day]")) {
        return Some(PrimitiveDateTime::new(value, Time::MIDNIGHT).assume_utc());
    }

    // Frontend's datetime-local often sends without timezone.
    if raw.len() == 16 && raw.as_bytes().get(10) == Some(&b'T') {
        let candidate = format!("{raw}:00Z");
        if let Ok(value) = OffsetDateTime::parse(&candidate, &Rfc3339) {
            return Some(value);
        }
    }

    if raw.len() == 19 && raw.as_bytes().get(10) == Some(&b'T') {
        let candidate = format!("{raw}Z");
        if let Ok(value) = OffsetDateTime::parse(&candidate, &Rfc3339) {
            return Some(value);
        }
    }

    None
}

fn deserialize_offset_datetime_flexible<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_offset_datetime_flexible(&raw)
        .ok_or_else(|| D::Error::custom(format!("invalid datetime: {raw}")))
}
