use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Points exchanged for a reward through one channel
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Redemption {
    pub redemption_id: i32,
    pub redemption: String,
    pub amount: i32,
    pub redemption_panelist_id: i32,
    pub redemption_date: DateTime<Utc>,
}

/// A fixed task with a one-time award
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Challenge {
    pub task_id: i32,
    pub task: String,
    pub award: i32,
}
