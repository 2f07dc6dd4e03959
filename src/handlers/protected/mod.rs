// handlers/protected/mod.rs - Session token required for everything below

pub mod admin;
pub mod answer;
pub mod ask;
pub mod redeem;
pub mod views;

use chrono::{NaiveDate, Utc};

use crate::database::models::Panelist;
use crate::error::ApiError;
use crate::middleware::CurrentPanelist;
use crate::state::AppState;

/// Fresh panelist row for the token holder
pub(crate) async fn load_panelist(state: &AppState, current: &CurrentPanelist) -> Result<Panelist, ApiError> {
    state
        .panelists()
        .find_by_id(current.panelist_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Session no longer valid"))
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
