use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::SurveyStatus;

/// A collection of questions published by one panelist
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Survey {
    pub survey_id: i32,
    pub publisher_id: i32,
    pub category: String,
    pub title: String,
    pub description: String,
    pub sample_size: i32,
    pub min_age: i32,
    pub max_age: i32,
    pub num_questions: i32,
    pub point_value: i32,
    #[sqlx(try_from = "String")]
    pub status: SurveyStatus,
    pub completes: i32,
    pub create_date: DateTime<Utc>,
}

/// A survey together with the demographic names it targets
#[derive(Debug, Clone, Serialize)]
pub struct SurveyTargeting {
    #[serde(flatten)]
    pub survey: Survey,
    pub races: Vec<String>,
    pub genders: Vec<String>,
    pub regions: Vec<String>,
}
