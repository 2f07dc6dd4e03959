// handlers/protected/ask.rs - survey authoring

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    response::Json,
};
use serde::Serialize;

use crate::database::models::{QuestionWithAnswers, Survey, SurveyTargeting};
use crate::middleware::{ApiResponse, ApiResult, CurrentPanelist};
use crate::services::{DemographicOptions, NewQuestion, NewSurvey};
use crate::state::AppState;

use super::load_panelist;

/// GET /ask/ - choices for the targeting fields
pub async fn ask_get(State(state): State<AppState>) -> ApiResult<DemographicOptions> {
    Ok(ApiResponse::success(state.panelists().demographic_options().await?))
}

/// POST /ask/
pub async fn ask_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPanelist>,
    payload: Result<Json<NewSurvey>, JsonRejection>,
) -> ApiResult<SurveyTargeting> {
    let Json(input) = payload?;
    let survey = state.surveys().create_survey(current.panelist_id, &input).await?;
    Ok(ApiResponse::created(survey))
}

#[derive(Debug, Serialize)]
pub struct SurveyDraft {
    #[serde(flatten)]
    pub targeting: SurveyTargeting,
    pub questions: Vec<QuestionWithAnswers>,
    pub is_publisher: bool,
}

/// GET /ask/:survey_id - the survey as built so far
pub async fn survey_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPanelist>,
    Path(survey_id): Path<i32>,
) -> ApiResult<SurveyDraft> {
    let surveys = state.surveys();
    let targeting = surveys.targeting(survey_id).await?;
    let questions = surveys.questions(survey_id).await?;

    Ok(ApiResponse::success(SurveyDraft {
        is_publisher: targeting.survey.publisher_id == current.panelist_id,
        targeting,
        questions,
    }))
}

#[derive(Debug, Serialize)]
pub struct QuestionAdded {
    pub survey: Survey,
    pub question: QuestionWithAnswers,
}

/// POST /ask/:survey_id - append a question; publisher only
pub async fn question_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPanelist>,
    Path(survey_id): Path<i32>,
    payload: Result<Json<NewQuestion>, JsonRejection>,
) -> ApiResult<QuestionAdded> {
    let Json(input) = payload?;
    let publisher = load_panelist(&state, &current).await?;
    let (survey, question) = state.surveys().add_question(&publisher, survey_id, &input).await?;
    Ok(ApiResponse::created(QuestionAdded { survey, question }))
}
