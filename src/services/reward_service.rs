use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::database::models::{Challenge, Panelist, Redemption};
use crate::rules::points;
use crate::services::ServiceError;
use crate::types::RewardChannel;

#[derive(Debug, Clone, Serialize)]
pub struct RedemptionOutcome {
    pub redeemed: bool,
    pub channel: RewardChannel,
    pub amount: i32,
    pub point_balance: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redemption: Option<Redemption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChallengeStatus {
    #[serde(flatten)]
    pub challenge: Challenge,
    pub claimed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimOutcome {
    pub challenge: Challenge,
    pub awarded: i32,
    pub point_balance: i32,
}

pub struct RewardService {
    pool: PgPool,
}

impl RewardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Exchange points through a channel.
    ///
    /// An amount above the balance leaves everything untouched and reports
    /// `redeemed: false`; it is not an error.
    pub async fn redeem(
        &self,
        panelist_id: i32,
        channel: RewardChannel,
        amount: i32,
    ) -> Result<RedemptionOutcome, ServiceError> {
        if amount <= 0 {
            let mut field_errors = HashMap::new();
            field_errors.insert("amount".to_string(), "Amount must be positive".to_string());
            return Err(ServiceError::validation("Invalid redemption", field_errors));
        }

        let mut tx = self.pool.begin().await?;
        let panelist = lock_panelist(&mut tx, panelist_id).await?;

        let Some(balance) = points::redeem(panelist.point_balance, amount) else {
            warn!(
                "Panelist {} tried to redeem {} with balance {}",
                panelist_id, amount, panelist.point_balance
            );
            return Ok(RedemptionOutcome {
                redeemed: false,
                channel,
                amount,
                point_balance: panelist.point_balance,
                redemption: None,
            });
        };

        set_balance(&mut tx, panelist_id, balance).await?;
        let redemption = sqlx::query_as::<_, Redemption>(
            r#"
            INSERT INTO redemptions (redemption, amount, redemption_panelist_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(channel.as_str())
        .bind(amount)
        .bind(panelist_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("Panelist {} redeemed {} points via {}", panelist_id, amount, channel.as_str());
        Ok(RedemptionOutcome {
            redeemed: true,
            channel,
            amount,
            point_balance: balance,
            redemption: Some(redemption),
        })
    }

    pub async fn redemptions_for(&self, panelist_id: i32) -> Result<Vec<Redemption>, ServiceError> {
        let rows = sqlx::query_as::<_, Redemption>(
            "SELECT * FROM redemptions WHERE redemption_panelist_id = $1 ORDER BY redemption_id",
        )
        .bind(panelist_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Challenges in id order, flagged with whether this panelist claimed them
    pub async fn challenges(&self, panelist_id: i32, limit: Option<i64>) -> Result<Vec<ChallengeStatus>, ServiceError> {
        let rows: Vec<(i32, String, i32, bool)> = sqlx::query_as(
            r#"
            SELECT c.task_id, c.task, c.award,
                   EXISTS (SELECT 1 FROM challenge_claims cc
                           WHERE cc.challenge_id = c.task_id AND cc.panelist_id = $1)
            FROM challenges c
            ORDER BY c.task_id
            LIMIT $2
            "#,
        )
        .bind(panelist_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(task_id, task, award, claimed)| ChallengeStatus {
                challenge: Challenge { task_id, task, award },
                claimed,
            })
            .collect())
    }

    /// Credit a challenge's award once; a repeat claim is a conflict
    pub async fn claim_challenge(&self, panelist_id: i32, challenge_id: i32) -> Result<ClaimOutcome, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let challenge = sqlx::query_as::<_, Challenge>("SELECT * FROM challenges WHERE task_id = $1")
            .bind(challenge_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Challenge {}", challenge_id)))?;
        let panelist = lock_panelist(&mut tx, panelist_id).await?;

        let claimed = sqlx::query(
            "INSERT INTO challenge_claims (panelist_id, challenge_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(panelist_id)
        .bind(challenge_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if claimed == 0 {
            return Err(ServiceError::Conflict(format!("Challenge '{}' was already claimed", challenge.task)));
        }

        let balance = panelist.point_balance + challenge.award;
        set_balance(&mut tx, panelist_id, balance).await?;
        tx.commit().await?;

        info!(
            "Panelist {} claimed challenge {} for {} points",
            panelist_id, challenge.task_id, challenge.award
        );
        Ok(ClaimOutcome {
            awarded: challenge.award,
            challenge,
            point_balance: balance,
        })
    }
}

async fn lock_panelist(conn: &mut PgConnection, panelist_id: i32) -> Result<Panelist, ServiceError> {
    sqlx::query_as::<_, Panelist>("SELECT * FROM panelists WHERE panelist_id = $1 FOR UPDATE")
        .bind(panelist_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Panelist {}", panelist_id)))
}

async fn set_balance(conn: &mut PgConnection, panelist_id: i32, balance: i32) -> Result<(), ServiceError> {
    sqlx::query("UPDATE panelists SET point_balance = $2 WHERE panelist_id = $1")
        .bind(panelist_id)
        .bind(balance)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
