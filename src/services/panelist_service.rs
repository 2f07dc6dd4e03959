use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth;
use crate::database::models::{Demographic, DemographicKind, Panelist};
use crate::services::validation::{validate_email_format, FieldErrors, MIN_PASSWORD_LENGTH};
use crate::services::ServiceError;

const BAD_CREDENTIALS: &str = "Incorrect username or password.";

/// Demographic fields captured after registration
#[derive(Debug, Clone, Deserialize)]
pub struct DetailsInput {
    pub firstname: String,
    pub lastname: String,
    /// YYYY-MM-DD
    pub dob: String,
    pub race: String,
    pub gender: String,
    pub region: String,
}

/// Choices offered by the details and survey-targeting forms
#[derive(Debug, Clone, Serialize)]
pub struct DemographicOptions {
    pub races: Vec<Demographic>,
    pub genders: Vec<Demographic>,
    pub regions: Vec<Demographic>,
}

impl DemographicOptions {
    pub fn of(&self, kind: DemographicKind) -> &[Demographic] {
        match kind {
            DemographicKind::Race => &self.races,
            DemographicKind::Gender => &self.genders,
            DemographicKind::Region => &self.regions,
        }
    }
}

pub struct PanelistService {
    pool: PgPool,
}

impl PanelistService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, panelist_id: i32) -> Result<Option<Panelist>, ServiceError> {
        let panelist = sqlx::query_as::<_, Panelist>("SELECT * FROM panelists WHERE panelist_id = $1")
            .bind(panelist_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(panelist)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Panelist>, ServiceError> {
        let panelist = sqlx::query_as::<_, Panelist>("SELECT * FROM panelists WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(panelist)
    }

    /// Create a panelist with only email and hashed password; details come later
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Panelist, ServiceError> {
        let email = email.trim();
        let mut errors = FieldErrors::new();
        if let Err(msg) = validate_email_format(email) {
            errors.add("email", msg);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add("password", format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH));
        }
        if password != confirm_password {
            errors.add("confirm_password", "Passwords must match");
        }
        errors.into_result("Invalid registration")?;

        if self.find_by_email(email).await?.is_some() {
            return Err(ServiceError::Conflict(format!("User {} is already registered.", email)));
        }

        let hash = auth::hash_password(password)?;
        let inserted = sqlx::query_as::<_, Panelist>(
            "INSERT INTO panelists (email, password) VALUES ($1, $2) RETURNING *",
        )
        .bind(email)
        .bind(hash)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(panelist) => {
                info!("Registered panelist {} ({})", panelist.panelist_id, panelist.email);
                Ok(panelist)
            }
            Err(e) if ServiceError::is_unique_violation(&e) => {
                Err(ServiceError::Conflict(format!("User {} is already registered.", email)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check credentials. Unknown email and wrong password are indistinguishable.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Panelist, ServiceError> {
        let Some(panelist) = self.find_by_email(email.trim()).await? else {
            warn!("Login rejected: unknown email");
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };

        if !auth::verify_password(password, &panelist.password)? {
            warn!("Login rejected: bad password for panelist {}", panelist.panelist_id);
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        info!("Panelist {} logged in", panelist.panelist_id);
        Ok(panelist)
    }

    pub async fn demographic_options(&self) -> Result<DemographicOptions, ServiceError> {
        Ok(DemographicOptions {
            races: self.demographics(DemographicKind::Race).await?,
            genders: self.demographics(DemographicKind::Gender).await?,
            regions: self.demographics(DemographicKind::Region).await?,
        })
    }

    async fn demographics(&self, kind: DemographicKind) -> Result<Vec<Demographic>, ServiceError> {
        let rows = sqlx::query_as::<_, Demographic>(&kind.select_all_sql())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Fill in name, birth date and demographics of a registered panelist
    pub async fn update_details(&self, panelist_id: i32, input: &DetailsInput) -> Result<Panelist, ServiceError> {
        let options = self.demographic_options().await?;
        let dob = validate_details(input, &options, Utc::now().date_naive())?;

        let updated = sqlx::query_as::<_, Panelist>(
            r#"
            UPDATE panelists
            SET firstname = $2, lastname = $3, dob = $4, race = $5, gender = $6, region = $7
            WHERE panelist_id = $1
            RETURNING *
            "#,
        )
        .bind(panelist_id)
        .bind(input.firstname.trim())
        .bind(input.lastname.trim())
        .bind(dob)
        .bind(&input.race)
        .bind(&input.gender)
        .bind(&input.region)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Panelist {}", panelist_id)))?;

        info!("Panelist {} completed details", updated.panelist_id);
        Ok(updated)
    }
}

/// Field checks for the details form; returns the parsed birth date
fn validate_details(
    input: &DetailsInput,
    options: &DemographicOptions,
    today: NaiveDate,
) -> Result<NaiveDate, ServiceError> {
    let mut errors = FieldErrors::new();
    errors.require_text("firstname", &input.firstname, 64);
    errors.require_text("lastname", &input.lastname, 64);

    let dob = match NaiveDate::parse_from_str(input.dob.trim(), "%Y-%m-%d") {
        Ok(dob) if dob > today => {
            errors.add("dob", "Date of birth cannot be in the future");
            None
        }
        Ok(dob) => Some(dob),
        Err(_) => {
            errors.add("dob", "Use the format YYYY-MM-DD");
            None
        }
    };

    let chosen = [
        (DemographicKind::Race, &input.race),
        (DemographicKind::Gender, &input.gender),
        (DemographicKind::Region, &input.region),
    ];
    for (kind, value) in chosen {
        if !options.of(kind).iter().any(|d| &d.name == value) {
            errors.add(kind.name_column(), format!("Unknown {}", kind.name_column()));
        }
    }

    errors.into_result("Invalid details")?;
    // into_result only passes when dob parsed
    dob.ok_or_else(|| ServiceError::validation("Invalid details", Default::default()))
}
