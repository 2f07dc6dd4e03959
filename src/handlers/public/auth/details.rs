// handlers/public/auth/details.rs - GET/POST /auth/details/ (registration token)

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    response::Json,
};
use serde::Serialize;

use crate::auth::Claims;
use crate::database::models::Panelist;
use crate::error::ApiError;
use crate::handlers::TokenResponse;
use crate::middleware::{ApiResponse, ApiResult, RegistrationSession};
use crate::services::{DemographicOptions, DetailsInput};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DetailsForm {
    pub panelist: Panelist,
    pub options: DemographicOptions,
}

pub async fn details_get(
    State(state): State<AppState>,
    Extension(registration): Extension<RegistrationSession>,
) -> ApiResult<DetailsForm> {
    let panelists = state.panelists();
    let panelist = panelists
        .find_by_id(registration.panelist_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Registration no longer valid"))?;

    Ok(ApiResponse::success(DetailsForm {
        panelist,
        options: panelists.demographic_options().await?,
    }))
}

/// POST /auth/details/ - completing details logs the panelist in
pub async fn details_post(
    State(state): State<AppState>,
    Extension(registration): Extension<RegistrationSession>,
    payload: Result<Json<DetailsInput>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(input) = payload?;
    let panelist = state.panelists().update_details(registration.panelist_id, &input).await?;

    let claims = Claims::session(panelist.panelist_id, panelist.email.clone());
    Ok(ApiResponse::success(TokenResponse::issue(claims, Some(panelist))?))
}
