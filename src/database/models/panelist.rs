use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered member of the panel. Panelists both publish and answer surveys.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Panelist {
    pub panelist_id: i32,
    pub email: String,
    /// bcrypt hash, never the password itself
    #[serde(skip_serializing, default)]
    pub password: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub dob: Option<NaiveDate>,
    pub race: Option<String>,
    pub gender: Option<String>,
    pub region: Option<String>,
    pub joined_date: DateTime<Utc>,
    pub point_balance: i32,
}

impl Panelist {
    /// Age as the difference between the current year and the birth year.
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        self.dob.map(|dob| today.year() - dob.year())
    }
}
