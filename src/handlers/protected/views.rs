// handlers/protected/views.rs - dashboard, profile, challenges, results, export

use axum::extract::{Extension, Path, State};
use serde::Serialize;

use crate::database::models::{Panelist, Redemption, Survey};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Attachment, CurrentPanelist};
use crate::services::report_service::XLSX_CONTENT_TYPE;
use crate::services::{ChallengeStatus, ClaimOutcome, SurveyResults};
use crate::state::AppState;

use super::{load_panelist, today};

const HOME_CHALLENGES: i64 = 2;
const FEATURED_SURVEYS: i64 = 3;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub panelist: Panelist,
    pub point_balance: i32,
    pub eligible_surveys: Vec<Survey>,
    pub challenges: Vec<ChallengeStatus>,
    pub num_completed: i64,
    pub num_published: usize,
    pub featured_surveys: Vec<Survey>,
    pub my_surveys: Vec<Survey>,
}

/// GET /home/
pub async fn home_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPanelist>,
) -> ApiResult<Dashboard> {
    let panelist = load_panelist(&state, &current).await?;
    let surveys = state.surveys();

    let eligible_surveys = surveys.eligible_surveys(&panelist, today()).await?;
    let challenges = state.rewards().challenges(panelist.panelist_id, Some(HOME_CHALLENGES)).await?;
    let num_completed = surveys.count_completed_by(panelist.panelist_id).await?;
    let my_surveys = surveys.published_by(panelist.panelist_id).await?;
    let featured_surveys = surveys.featured(FEATURED_SURVEYS).await?;

    Ok(ApiResponse::success(Dashboard {
        point_balance: panelist.point_balance,
        panelist,
        eligible_surveys,
        challenges,
        num_completed,
        num_published: my_surveys.len(),
        featured_surveys,
        my_surveys,
    }))
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub panelist: Panelist,
    pub surveys_responded: Vec<Survey>,
    pub redemptions: Vec<Redemption>,
}

/// GET /profile/
pub async fn profile_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPanelist>,
) -> ApiResult<Profile> {
    let panelist = load_panelist(&state, &current).await?;
    let surveys_responded = state.surveys().responded_to_by(panelist.panelist_id).await?;
    let redemptions = state.rewards().redemptions_for(panelist.panelist_id).await?;

    Ok(ApiResponse::success(Profile {
        panelist,
        surveys_responded,
        redemptions,
    }))
}

/// GET|POST /challenge/:id - claim once, repeat claims are a conflict
pub async fn challenge_claim(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPanelist>,
    Path(challenge_id): Path<i32>,
) -> ApiResult<ClaimOutcome> {
    let outcome = state.rewards().claim_challenge(current.panelist_id, challenge_id).await?;
    Ok(ApiResponse::success(outcome))
}

/// GET /results/:survey_id
pub async fn results_get(State(state): State<AppState>, Path(survey_id): Path<i32>) -> ApiResult<SurveyResults> {
    Ok(ApiResponse::success(state.surveys().results(survey_id).await?))
}

/// GET /export/:survey_id - xlsx workbook of every response with respondent demographics
pub async fn export_get(State(state): State<AppState>, Path(survey_id): Path<i32>) -> Result<Attachment, ApiError> {
    let export = state.reports().export(survey_id, today()).await?;
    Ok(Attachment {
        filename: export.filename,
        content_type: XLSX_CONTENT_TYPE,
        body: export.body,
    })
}
