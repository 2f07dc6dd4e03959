use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::info;

use crate::database::models::{
    Answer, DemographicKind, Panelist, Question, QuestionWithAnswers, Survey, SurveyTargeting,
};
use crate::rules::points;
use crate::services::validation::FieldErrors;
use crate::services::ServiceError;
use crate::types::{BrowseSort, SurveyStatus};

pub const MAX_AGE: i32 = 120;

/// Survey metadata plus the lookup ids it targets
#[derive(Debug, Clone, Deserialize)]
pub struct NewSurvey {
    pub category: String,
    pub title: String,
    pub description: String,
    pub sample_size: i32,
    pub min_age: i32,
    pub max_age: i32,
    #[serde(default)]
    pub race: Vec<i32>,
    #[serde(default)]
    pub gender: Vec<i32>,
    #[serde(default)]
    pub region: Vec<i32>,
}

impl NewSurvey {
    fn targets(&self, kind: DemographicKind) -> Vec<i32> {
        let ids = match kind {
            DemographicKind::Race => &self.race,
            DemographicKind::Gender => &self.gender,
            DemographicKind::Region => &self.region,
        };
        ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
    }

    fn validate(&self) -> Result<(), ServiceError> {
        let mut errors = FieldErrors::new();
        errors.require_text("category", &self.category, 64);
        errors.require_text("title", &self.title, 64);
        errors.require_text("description", &self.description, 64);
        if self.sample_size < 1 {
            errors.add("sample_size", "Sample size must be at least 1");
        }
        if !(0..=MAX_AGE).contains(&self.min_age) {
            errors.add("min_age", format!("Age must be between 0 and {}", MAX_AGE));
        }
        if !(0..=MAX_AGE).contains(&self.max_age) {
            errors.add("max_age", format!("Age must be between 0 and {}", MAX_AGE));
        } else if self.max_age < self.min_age {
            errors.add("max_age", "Maximum age must not be below minimum age");
        }
        for kind in DemographicKind::ALL {
            if self.targets(kind).is_empty() {
                errors.add(kind.name_column(), format!("Choose at least one {}", kind.name_column()));
            }
        }
        errors.into_result("Invalid survey")
    }
}

/// A question and its choices as typed by the publisher
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
    pub question: String,
    #[serde(default)]
    pub answers: Vec<String>,
}

impl NewQuestion {
    /// Trimmed answers with blanks and repeats dropped, first occurrence kept
    fn answers(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.answers
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty() && seen.insert(*a))
            .map(str::to_string)
            .collect()
    }

    fn validate(&self) -> Result<(), ServiceError> {
        let mut errors = FieldErrors::new();
        errors.require_text("question", &self.question, 140);
        let answers = self.answers();
        if answers.is_empty() {
            errors.add("answers", "Provide at least one answer");
        } else if answers.iter().any(|a| a.chars().count() > 140) {
            errors.add("answers", "Answers must be at most 140 characters");
        }
        errors.into_result("Invalid question")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerTally {
    pub answer: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionResults {
    pub question_id: i32,
    pub question: String,
    pub tallies: Vec<AnswerTally>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SurveyResults {
    pub survey: Survey,
    pub respondents: i64,
    pub questions: Vec<QuestionResults>,
}

pub struct SurveyService {
    pool: PgPool,
}

impl SurveyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn targeting(&self, survey_id: i32) -> Result<SurveyTargeting, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let survey = find_survey(&mut conn, survey_id, false).await?;
        load_targeting(&mut conn, survey).await
    }

    pub async fn questions(&self, survey_id: i32) -> Result<Vec<QuestionWithAnswers>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        load_questions(&mut conn, survey_id).await
    }

    /// Insert a survey and its targeting rows in one transaction
    pub async fn create_survey(&self, publisher_id: i32, input: &NewSurvey) -> Result<SurveyTargeting, ServiceError> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        let survey = sqlx::query_as::<_, Survey>(
            r#"
            INSERT INTO surveys (publisher_id, category, title, description, sample_size, min_age, max_age)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(publisher_id)
        .bind(input.category.trim())
        .bind(input.title.trim())
        .bind(input.description.trim())
        .bind(input.sample_size)
        .bind(input.min_age)
        .bind(input.max_age)
        .fetch_one(&mut *tx)
        .await?;

        let mut errors = FieldErrors::new();
        for kind in DemographicKind::ALL {
            let ids = input.targets(kind);
            let sql = format!(
                "INSERT INTO {junction} (survey_id, {id}) SELECT $1, {id} FROM {table} WHERE {id} = ANY($2)",
                junction = kind.junction_table(),
                id = kind.id_column(),
                table = kind.table()
            );
            let inserted = sqlx::query(&sql)
                .bind(survey.survey_id)
                .bind(&ids)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            if inserted != ids.len() as u64 {
                errors.add(kind.name_column(), format!("Unknown {} id", kind.name_column()));
            }
        }
        // dropping the transaction rolls the survey back
        errors.into_result("Invalid survey")?;

        let targeting = load_targeting(&mut tx, survey).await?;
        tx.commit().await?;

        info!(
            "Panelist {} published survey {} '{}'",
            publisher_id, targeting.survey.survey_id, targeting.survey.title
        );
        Ok(targeting)
    }

    /// Append a question with its answers; only the publisher may do this
    pub async fn add_question(
        &self,
        publisher: &Panelist,
        survey_id: i32,
        input: &NewQuestion,
    ) -> Result<(Survey, QuestionWithAnswers), ServiceError> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        let mut survey = find_survey(&mut tx, survey_id, true).await?;
        if survey.publisher_id != publisher.panelist_id {
            return Err(ServiceError::Forbidden("Only the publisher can add questions".to_string()));
        }

        let question = sqlx::query_as::<_, Question>(
            "INSERT INTO questions (parent_survey_id, question) VALUES ($1, $2) RETURNING *",
        )
        .bind(survey_id)
        .bind(input.question.trim())
        .fetch_one(&mut *tx)
        .await?;

        let mut answers = Vec::new();
        for text in input.answers() {
            let answer = sqlx::query_as::<_, Answer>(
                "INSERT INTO answers (parent_question_id, answer) VALUES ($1, $2) RETURNING *",
            )
            .bind(question.question_id)
            .bind(text)
            .fetch_one(&mut *tx)
            .await?;
            answers.push(answer);
        }

        points::record_question_added(&mut survey);
        sqlx::query("UPDATE surveys SET num_questions = $2, point_value = $3 WHERE survey_id = $1")
            .bind(survey.survey_id)
            .bind(survey.num_questions)
            .bind(survey.point_value)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(
            "Survey {} now has {} questions worth {} points",
            survey.survey_id, survey.num_questions, survey.point_value
        );
        Ok((survey, QuestionWithAnswers { question, answers }))
    }

    /// Open surveys this panelist may answer, ordered by id.
    ///
    /// Mirrors `rules::check_eligibility`.
    pub async fn eligible_surveys(&self, panelist: &Panelist, today: NaiveDate) -> Result<Vec<Survey>, ServiceError> {
        let (Some(age), Some(race), Some(gender), Some(region)) = (
            panelist.age_on(today),
            panelist.race.as_deref(),
            panelist.gender.as_deref(),
            panelist.region.as_deref(),
        ) else {
            return Ok(Vec::new());
        };

        let surveys = sqlx::query_as::<_, Survey>(
            r#"
            SELECT s.* FROM surveys s
            WHERE s.min_age <= $1
              AND s.max_age >= $1
              AND s.status = $2
              AND s.publisher_id <> $3
              AND EXISTS (
                  SELECT 1 FROM survey_races sr JOIN races r ON r.race_id = sr.race_id
                  WHERE sr.survey_id = s.survey_id AND r.race = $4)
              AND EXISTS (
                  SELECT 1 FROM survey_genders sg JOIN genders g ON g.gender_id = sg.gender_id
                  WHERE sg.survey_id = s.survey_id AND g.gender = $5)
              AND EXISTS (
                  SELECT 1 FROM survey_regions sn JOIN regions n ON n.region_id = sn.region_id
                  WHERE sn.survey_id = s.survey_id AND n.region = $6)
              AND NOT EXISTS (
                  SELECT 1 FROM responses rs
                  WHERE rs.parent_survey_id = s.survey_id AND rs.response_panelist_id = $3)
            ORDER BY s.survey_id
            "#,
        )
        .bind(age)
        .bind(SurveyStatus::Open.as_str())
        .bind(panelist.panelist_id)
        .bind(race)
        .bind(gender)
        .bind(region)
        .fetch_all(&self.pool)
        .await?;
        Ok(surveys)
    }

    /// Surveys for the browse page; only `Recommended` filters
    pub async fn browse(&self, panelist: &Panelist, sort: BrowseSort, today: NaiveDate) -> Result<Vec<Survey>, ServiceError> {
        if sort == BrowseSort::Recommended {
            return self.eligible_surveys(panelist, today).await;
        }
        let sql = format!("SELECT * FROM surveys ORDER BY {}", sort.order_by());
        Ok(sqlx::query_as::<_, Survey>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn published_by(&self, panelist_id: i32) -> Result<Vec<Survey>, ServiceError> {
        let surveys = sqlx::query_as::<_, Survey>("SELECT * FROM surveys WHERE publisher_id = $1 ORDER BY survey_id")
            .bind(panelist_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(surveys)
    }

    pub async fn responded_to_by(&self, panelist_id: i32) -> Result<Vec<Survey>, ServiceError> {
        let surveys = sqlx::query_as::<_, Survey>(
            r#"
            SELECT s.* FROM surveys s
            WHERE EXISTS (
                SELECT 1 FROM responses r
                WHERE r.parent_survey_id = s.survey_id AND r.response_panelist_id = $1)
            ORDER BY s.survey_id
            "#,
        )
        .bind(panelist_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(surveys)
    }

    /// Number of distinct surveys the panelist has answered
    pub async fn count_completed_by(&self, panelist_id: i32) -> Result<i64, ServiceError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(DISTINCT parent_survey_id) FROM responses WHERE response_panelist_id = $1")
                .bind(panelist_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    pub async fn featured(&self, limit: i64) -> Result<Vec<Survey>, ServiceError> {
        let surveys = sqlx::query_as::<_, Survey>("SELECT * FROM surveys WHERE status = $1 ORDER BY survey_id LIMIT $2")
            .bind(SurveyStatus::Completed.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(surveys)
    }

    /// Per question, how many responses chose each answer
    pub async fn results(&self, survey_id: i32) -> Result<SurveyResults, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let survey = find_survey(&mut conn, survey_id, false).await?;
        let questions = load_questions(&mut conn, survey_id).await?;

        let counts: Vec<(i32, String, i64)> = sqlx::query_as(
            r#"
            SELECT parent_question_id, response, COUNT(*)
            FROM responses
            WHERE parent_survey_id = $1
            GROUP BY parent_question_id, response
            "#,
        )
        .bind(survey_id)
        .fetch_all(&mut *conn)
        .await?;

        let (respondents,): (i64,) =
            sqlx::query_as("SELECT COUNT(DISTINCT response_panelist_id) FROM responses WHERE parent_survey_id = $1")
                .bind(survey_id)
                .fetch_one(&mut *conn)
                .await?;

        Ok(SurveyResults {
            survey,
            respondents,
            questions: tally(&questions, &counts),
        })
    }
}

/// Lay counts out per question in answer order, zero for unchosen answers
fn tally(questions: &[QuestionWithAnswers], counts: &[(i32, String, i64)]) -> Vec<QuestionResults> {
    let by_key: HashMap<(i32, &str), i64> = counts
        .iter()
        .map(|(question_id, response, count)| ((*question_id, response.as_str()), *count))
        .collect();

    questions
        .iter()
        .map(|q| QuestionResults {
            question_id: q.question.question_id,
            question: q.question.question.clone(),
            tallies: q
                .answers
                .iter()
                .map(|a| AnswerTally {
                    answer: a.answer.clone(),
                    count: by_key
                        .get(&(q.question.question_id, a.answer.as_str()))
                        .copied()
                        .unwrap_or(0),
                })
                .collect(),
        })
        .collect()
}

pub(crate) async fn find_survey(
    conn: &mut PgConnection,
    survey_id: i32,
    for_update: bool,
) -> Result<Survey, ServiceError> {
    let sql = if for_update {
        "SELECT * FROM surveys WHERE survey_id = $1 FOR UPDATE"
    } else {
        "SELECT * FROM surveys WHERE survey_id = $1"
    };
    sqlx::query_as::<_, Survey>(sql)
        .bind(survey_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Survey {}", survey_id)))
}

pub(crate) async fn load_targeting(conn: &mut PgConnection, survey: Survey) -> Result<SurveyTargeting, ServiceError> {
    let mut names = Vec::with_capacity(DemographicKind::ALL.len());
    for kind in DemographicKind::ALL {
        let rows: Vec<(String,)> = sqlx::query_as(&kind.targeted_names_sql())
            .bind(survey.survey_id)
            .fetch_all(&mut *conn)
            .await?;
        names.push(rows.into_iter().map(|(name,)| name).collect::<Vec<_>>());
    }
    let regions = names.pop().unwrap_or_default();
    let genders = names.pop().unwrap_or_default();
    let races = names.pop().unwrap_or_default();

    Ok(SurveyTargeting {
        survey,
        races,
        genders,
        regions,
    })
}

pub(crate) async fn load_questions(
    conn: &mut PgConnection,
    survey_id: i32,
) -> Result<Vec<QuestionWithAnswers>, ServiceError> {
    let questions = sqlx::query_as::<_, Question>(
        "SELECT * FROM questions WHERE parent_survey_id = $1 ORDER BY question_id",
    )
    .bind(survey_id)
    .fetch_all(&mut *conn)
    .await?;

    let answers = sqlx::query_as::<_, Answer>(
        r#"
        SELECT a.* FROM answers a
        JOIN questions q ON q.question_id = a.parent_question_id
        WHERE q.parent_survey_id = $1
        ORDER BY a.answer_id
        "#,
    )
    .bind(survey_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut grouped: HashMap<i32, Vec<Answer>> = HashMap::new();
    for answer in answers {
        grouped.entry(answer.parent_question_id).or_default().push(answer);
    }

    Ok(questions
        .into_iter()
        .map(|question| {
            let answers = grouped.remove(&question.question_id).unwrap_or_default();
            QuestionWithAnswers { question, answers }
        })
        .collect())
}
