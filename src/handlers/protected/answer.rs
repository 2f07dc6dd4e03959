// handlers/protected/answer.rs - browse and answer surveys

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::database::models::Survey;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentPanelist};
use crate::services::{AnswerForm, SubmissionReceipt};
use crate::state::AppState;
use crate::types::BrowseSort;

use super::{load_panelist, today};

#[derive(Debug, Serialize)]
pub struct BrowseList {
    pub sort: String,
    pub surveys: Vec<Survey>,
}

/// GET /answer/:sort/
pub async fn browse_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPanelist>,
    Path(sort_name): Path<String>,
) -> ApiResult<BrowseList> {
    let sort: BrowseSort = sort_name
        .parse()
        .map_err(|_| ApiError::not_found(format!("Unknown sort order '{}'", sort_name)))?;
    let panelist = load_panelist(&state, &current).await?;
    let surveys = state.surveys().browse(&panelist, sort, today()).await?;

    Ok(ApiResponse::success(BrowseList { sort: sort_name, surveys }))
}

/// GET /answer/:survey_id - the answering form, if the panelist is eligible
pub async fn form_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPanelist>,
    Path(survey_id): Path<i32>,
) -> ApiResult<AnswerForm> {
    let panelist = load_panelist(&state, &current).await?;
    let form = state.responses().answer_form(&panelist, survey_id, today()).await?;
    Ok(ApiResponse::success(form))
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Field name (`q<question_id>`) to chosen answer
    pub responses: HashMap<String, String>,
}

/// POST /answer/:survey_id
pub async fn form_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPanelist>,
    Path(survey_id): Path<i32>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> ApiResult<SubmissionReceipt> {
    let Json(input) = payload?;
    let receipt = state
        .responses()
        .submit(current.panelist_id, survey_id, &input.responses, today())
        .await?;
    Ok(ApiResponse::created(receipt))
}
