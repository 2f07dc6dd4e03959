// handlers/protected/admin.rs - GET /admin/tables

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AdminTables;
use crate::state::AppState;

pub async fn tables_get(State(state): State<AppState>) -> ApiResult<AdminTables> {
    Ok(ApiResponse::success(state.reports().admin_tables().await?))
}
