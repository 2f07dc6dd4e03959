use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::database::models::{Panelist, Survey};
use crate::rules::{self, points, FormField};
use crate::services::survey_service::{find_survey, load_questions, load_targeting};
use crate::services::ServiceError;
use crate::types::SurveyStatus;

/// A survey together with the form a panelist fills in to answer it
#[derive(Debug, Clone, Serialize)]
pub struct AnswerForm {
    pub survey: Survey,
    pub fields: Vec<FormField>,
}

/// What changed after a successful submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub survey_id: i32,
    pub points_awarded: i32,
    pub point_balance: i32,
    pub completes: i32,
    pub status: SurveyStatus,
}

pub struct ResponseService {
    pool: PgPool,
}

impl ResponseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build the answering form, refusing panelists who may not answer
    pub async fn answer_form(&self, panelist: &Panelist, survey_id: i32, today: NaiveDate) -> Result<AnswerForm, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let survey = find_survey(&mut conn, survey_id, false).await?;
        let targeting = load_targeting(&mut conn, survey).await?;
        let responded = has_responded(&mut conn, panelist.panelist_id, survey_id).await?;
        rules::check_eligibility(panelist, &targeting, responded, today)?;

        let questions = load_questions(&mut conn, survey_id).await?;
        Ok(AnswerForm {
            survey: targeting.survey,
            fields: rules::build_form(&questions),
        })
    }

    /// Record one response per question and settle points.
    ///
    /// The survey row and then the panelist row are locked for the whole
    /// transaction, so concurrent submissions serialize on the survey.
    pub async fn submit(
        &self,
        panelist_id: i32,
        survey_id: i32,
        submitted: &HashMap<String, String>,
        today: NaiveDate,
    ) -> Result<SubmissionReceipt, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let mut survey = find_survey(&mut tx, survey_id, true).await?;
        let mut panelist = sqlx::query_as::<_, Panelist>("SELECT * FROM panelists WHERE panelist_id = $1 FOR UPDATE")
            .bind(panelist_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Panelist {}", panelist_id)))?;

        let targeting = load_targeting(&mut tx, survey.clone()).await?;
        let responded = has_responded(&mut tx, panelist_id, survey_id).await?;
        if let Err(reason) = rules::check_eligibility(&panelist, &targeting, responded, today) {
            warn!("Panelist {} rejected from survey {}: {:?}", panelist_id, survey_id, reason);
            return Err(reason.into());
        }

        let questions = load_questions(&mut tx, survey_id).await?;
        if questions.is_empty() {
            return Err(ServiceError::validation("This survey has no questions yet", HashMap::new()));
        }
        let chosen = rules::match_submission(&questions, submitted)
            .map_err(|field_errors| ServiceError::validation("Every question needs a valid answer", field_errors))?;

        for (question_id, answer) in &chosen {
            sqlx::query(
                r#"
                INSERT INTO responses (parent_survey_id, parent_question_id, response_panelist_id, response)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(survey_id)
            .bind(question_id)
            .bind(panelist_id)
            .bind(answer)
            .execute(&mut *tx)
            .await?;
        }

        points::award_completion(&mut panelist, &survey);
        points::record_completion(&mut survey);

        sqlx::query("UPDATE panelists SET point_balance = $2 WHERE panelist_id = $1")
            .bind(panelist_id)
            .bind(panelist.point_balance)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE surveys SET completes = $2, status = $3 WHERE survey_id = $1")
            .bind(survey_id)
            .bind(survey.completes)
            .bind(survey.status.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(
            "Panelist {} completed survey {} (+{} points, {}/{} completes)",
            panelist_id, survey_id, survey.point_value, survey.completes, survey.sample_size
        );
        if survey.status == SurveyStatus::Completed {
            info!("Survey {} reached its sample size", survey_id);
        }

        Ok(SubmissionReceipt {
            survey_id,
            points_awarded: survey.point_value,
            point_balance: panelist.point_balance,
            completes: survey.completes,
            status: survey.status,
        })
    }
}

pub(crate) async fn has_responded(conn: &mut PgConnection, panelist_id: i32, survey_id: i32) -> Result<bool, ServiceError> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM responses WHERE parent_survey_id = $1 AND response_panelist_id = $2)",
    )
    .bind(survey_id)
    .bind(panelist_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(exists)
}
