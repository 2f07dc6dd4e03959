// handlers/protected/redeem.rs - exchange points through a reward channel

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentPanelist};
use crate::services::RedemptionOutcome;
use crate::state::AppState;
use crate::types::RewardChannel;

use super::load_panelist;

#[derive(Debug, Serialize)]
pub struct ChannelInfo {
    pub name: &'static str,
    pub slug: &'static str,
}

impl From<RewardChannel> for ChannelInfo {
    fn from(channel: RewardChannel) -> Self {
        Self {
            name: channel.as_str(),
            slug: channel.slug(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RedeemPage {
    pub point_balance: i32,
    pub channels: Vec<ChannelInfo>,
}

/// GET /redeem/
pub async fn redeem_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPanelist>,
) -> ApiResult<RedeemPage> {
    let panelist = load_panelist(&state, &current).await?;
    Ok(ApiResponse::success(RedeemPage {
        point_balance: panelist.point_balance,
        channels: RewardChannel::ALL.into_iter().map(ChannelInfo::from).collect(),
    }))
}

fn parse_channel(slug: &str) -> Result<RewardChannel, ApiError> {
    slug.parse()
        .map_err(|_| ApiError::not_found(format!("Unknown reward channel '{}'", slug)))
}

#[derive(Debug, Serialize)]
pub struct ChannelPage {
    pub channel: ChannelInfo,
    pub point_balance: i32,
}

/// GET /redeem/:channel/
pub async fn channel_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPanelist>,
    Path(slug): Path<String>,
) -> ApiResult<ChannelPage> {
    let channel = parse_channel(&slug)?;
    let panelist = load_panelist(&state, &current).await?;
    Ok(ApiResponse::success(ChannelPage {
        channel: channel.into(),
        point_balance: panelist.point_balance,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub amount: i32,
}

/// POST /redeem/:channel/ - an amount over the balance answers `redeemed: false`
pub async fn channel_post(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPanelist>,
    Path(slug): Path<String>,
    payload: Result<Json<RedeemRequest>, JsonRejection>,
) -> ApiResult<RedemptionOutcome> {
    let channel = parse_channel(&slug)?;
    let Json(input) = payload?;
    let outcome = state.rewards().redeem(current.panelist_id, channel, input.amount).await?;
    Ok(ApiResponse::success(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_channel_is_not_found() {
        assert_eq!(parse_channel("venmo").unwrap(), RewardChannel::Venmo);
        assert_eq!(parse_channel("bitcoin").unwrap_err().status_code(), 404);
    }
}
