//! Shared handler state

use sqlx::PgPool;

use crate::services::{PanelistService, ReportService, ResponseService, RewardService, SurveyService};

/// Cloned into every handler; the pool is reference counted
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub version: String,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn panelists(&self) -> PanelistService {
        PanelistService::new(self.pool.clone())
    }

    pub fn surveys(&self) -> SurveyService {
        SurveyService::new(self.pool.clone())
    }

    pub fn responses(&self) -> ResponseService {
        ResponseService::new(self.pool.clone())
    }

    pub fn rewards(&self) -> RewardService {
        RewardService::new(self.pool.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.pool.clone())
    }
}
