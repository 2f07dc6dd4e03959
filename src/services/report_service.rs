use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::database::models::{Answer, Demographic, DemographicKind, Panelist, Question, Response, Survey};
use crate::services::survey_service::find_survey;
use crate::services::ServiceError;

/// Every table, for the admin view. Password hashes never serialize.
#[derive(Debug, Serialize)]
pub struct AdminTables {
    pub panelists: Vec<Panelist>,
    pub surveys: Vec<Survey>,
    pub races: Vec<Demographic>,
    pub genders: Vec<Demographic>,
    pub regions: Vec<Demographic>,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
    pub responses: Vec<Response>,
}

/// One response joined with its question and the respondent's demographics
#[derive(Debug, Clone, FromRow)]
pub struct ExportRow {
    pub question: String,
    pub response: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub race: Option<String>,
    pub region: Option<String>,
}

pub const EXPORT_HEADER: [&str; 6] = ["Question", "Response", "Age", "Gender", "Race", "Region"];

pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// One spreadsheet cell of the export
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    Text(String),
    Number(i32),
    Blank,
}

/// A rendered spreadsheet ready to send as an attachment
#[derive(Debug)]
pub struct Export {
    pub filename: String,
    pub body: Vec<u8>,
}

pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn admin_tables(&self) -> Result<AdminTables, ServiceError> {
        Ok(AdminTables {
            panelists: sqlx::query_as("SELECT * FROM panelists ORDER BY panelist_id")
                .fetch_all(&self.pool)
                .await?,
            surveys: sqlx::query_as("SELECT * FROM surveys ORDER BY survey_id")
                .fetch_all(&self.pool)
                .await?,
            races: self.lookup(DemographicKind::Race).await?,
            genders: self.lookup(DemographicKind::Gender).await?,
            regions: self.lookup(DemographicKind::Region).await?,
            questions: sqlx::query_as("SELECT * FROM questions ORDER BY question_id")
                .fetch_all(&self.pool)
                .await?,
            answers: sqlx::query_as("SELECT * FROM answers ORDER BY answer_id")
                .fetch_all(&self.pool)
                .await?,
            responses: sqlx::query_as("SELECT * FROM responses ORDER BY response_id")
                .fetch_all(&self.pool)
                .await?,
        })
    }

    async fn lookup(&self, kind: DemographicKind) -> Result<Vec<Demographic>, ServiceError> {
        Ok(sqlx::query_as(&kind.select_all_sql()).fetch_all(&self.pool).await?)
    }

    /// All responses to a survey as a workbook, one row per answered question
    pub async fn export(&self, survey_id: i32, today: NaiveDate) -> Result<Export, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let survey = find_survey(&mut conn, survey_id, false).await?;

        let rows = sqlx::query_as::<_, ExportRow>(
            r#"
            SELECT q.question, r.response, p.dob, p.gender, p.race, p.region
            FROM responses r
            JOIN questions q ON q.question_id = r.parent_question_id
            JOIN panelists p ON p.panelist_id = r.response_panelist_id
            WHERE r.parent_survey_id = $1
            ORDER BY r.response_id
            "#,
        )
        .bind(survey_id)
        .fetch_all(&mut *conn)
        .await?;

        let body = render_workbook(&rows, today)?;
        tracing::info!("Exported {} responses of survey {}", rows.len(), survey_id);
        Ok(Export {
            filename: export_filename(&survey.title, survey.survey_id),
            body,
        })
    }
}

/// Header plus one row of cells per response; age is blank without a dob
pub fn export_cells(rows: &[ExportRow], today: NaiveDate) -> Vec<[ExportCell; 6]> {
    let header = EXPORT_HEADER.map(|title| ExportCell::Text(title.to_string()));
    let body = rows.iter().map(|row| {
        [
            ExportCell::Text(row.question.clone()),
            ExportCell::Text(row.response.clone()),
            row.dob
                .map(|dob| ExportCell::Number(today.year() - dob.year()))
                .unwrap_or(ExportCell::Blank),
            text_or_blank(row.gender.as_deref()),
            text_or_blank(row.race.as_deref()),
            text_or_blank(row.region.as_deref()),
        ]
    });
    std::iter::once(header).chain(body).collect()
}

fn text_or_blank(value: Option<&str>) -> ExportCell {
    value.map_or(ExportCell::Blank, |v| ExportCell::Text(v.to_string()))
}

/// An xlsx workbook with a single "Responses" sheet
pub fn render_workbook(rows: &[ExportRow], today: NaiveDate) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Responses")?;

    for (r, cells) in export_cells(rows, today).iter().enumerate() {
        let r = r as u32;
        for (c, cell) in cells.iter().enumerate() {
            let c = c as u16;
            match cell {
                ExportCell::Text(text) if r == 0 => {
                    sheet.write_string_with_format(r, c, text.as_str(), &bold)?;
                }
                ExportCell::Text(text) => {
                    sheet.write_string(r, c, text.as_str())?;
                }
                ExportCell::Number(n) => {
                    sheet.write_number(r, c, f64::from(*n))?;
                }
                ExportCell::Blank => {}
            }
        }
    }

    workbook.save_to_buffer()
}

/// `<title>.xlsx`, dropping control and quoting characters but keeping
/// non-ASCII letters
pub fn export_filename(title: &str, survey_id: i32) -> String {
    let stem: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.'))
        .collect();
    let stem = stem.trim();
    if stem.is_empty() {
        format!("survey-{}.xlsx", survey_id)
    } else {
        format!("{}.xlsx", stem)
    }
}
