// Table definitions and lookup seed data.
//
// Every statement is idempotent so `DatabaseManager::initialize` can run on
// each startup.

pub const CREATE_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS panelists (
        panelist_id   SERIAL PRIMARY KEY,
        email         VARCHAR(120) NOT NULL UNIQUE,
        password      VARCHAR(128) NOT NULL,
        firstname     VARCHAR(64),
        lastname      VARCHAR(64),
        dob           DATE,
        race          VARCHAR(64),
        gender        VARCHAR(64),
        region        VARCHAR(64),
        joined_date   TIMESTAMPTZ NOT NULL DEFAULT now(),
        point_balance INTEGER NOT NULL DEFAULT 0 CHECK (point_balance >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS races (
        race_id SERIAL PRIMARY KEY,
        race    VARCHAR(140) NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS genders (
        gender_id SERIAL PRIMARY KEY,
        gender    VARCHAR(140) NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS regions (
        region_id SERIAL PRIMARY KEY,
        region    VARCHAR(140) NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS surveys (
        survey_id     SERIAL PRIMARY KEY,
        publisher_id  INTEGER NOT NULL REFERENCES panelists (panelist_id),
        category      VARCHAR(64) NOT NULL,
        title         VARCHAR(64) NOT NULL,
        description   VARCHAR(64) NOT NULL,
        sample_size   INTEGER NOT NULL,
        min_age       INTEGER NOT NULL,
        max_age       INTEGER NOT NULL,
        num_questions INTEGER NOT NULL DEFAULT 0,
        point_value   INTEGER NOT NULL DEFAULT 0,
        status        VARCHAR(64) NOT NULL DEFAULT 'Open',
        completes     INTEGER NOT NULL DEFAULT 0,
        create_date   TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS survey_races (
        survey_id INTEGER NOT NULL REFERENCES surveys (survey_id),
        race_id   INTEGER NOT NULL REFERENCES races (race_id),
        PRIMARY KEY (survey_id, race_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS survey_genders (
        survey_id INTEGER NOT NULL REFERENCES surveys (survey_id),
        gender_id INTEGER NOT NULL REFERENCES genders (gender_id),
        PRIMARY KEY (survey_id, gender_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS survey_regions (
        survey_id INTEGER NOT NULL REFERENCES surveys (survey_id),
        region_id INTEGER NOT NULL REFERENCES regions (region_id),
        PRIMARY KEY (survey_id, region_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS questions (
        question_id      SERIAL PRIMARY KEY,
        parent_survey_id INTEGER NOT NULL REFERENCES surveys (survey_id),
        question         VARCHAR(140) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS answers (
        answer_id          SERIAL PRIMARY KEY,
        parent_question_id INTEGER NOT NULL REFERENCES questions (question_id),
        answer             VARCHAR(140) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS responses (
        response_id          SERIAL PRIMARY KEY,
        parent_survey_id     INTEGER NOT NULL REFERENCES surveys (survey_id),
        parent_question_id   INTEGER NOT NULL REFERENCES questions (question_id),
        response_panelist_id INTEGER NOT NULL REFERENCES panelists (panelist_id),
        response             VARCHAR(140) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS challenges (
        task_id SERIAL PRIMARY KEY,
        task    VARCHAR(140) NOT NULL UNIQUE,
        award   INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS challenge_claims (
        panelist_id  INTEGER NOT NULL REFERENCES panelists (panelist_id),
        challenge_id INTEGER NOT NULL REFERENCES challenges (task_id),
        claimed_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (panelist_id, challenge_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS redemptions (
        redemption_id          SERIAL PRIMARY KEY,
        redemption             VARCHAR(64) NOT NULL,
        amount                 INTEGER NOT NULL,
        redemption_panelist_id INTEGER NOT NULL REFERENCES panelists (panelist_id),
        redemption_date        TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS responses_survey_panelist_idx ON responses (parent_survey_id, response_panelist_id)",
];

/// Reverse dependency order
pub const DROP_TABLES: &[&str] = &[
    "redemptions",
    "challenge_claims",
    "challenges",
    "responses",
    "answers",
    "questions",
    "survey_regions",
    "survey_genders",
    "survey_races",
    "surveys",
    "regions",
    "genders",
    "races",
    "panelists",
];

pub const RACES: &[&str] = &[
    "Black or African American",
    "White",
    "Asian",
    "Hispanic or Latino",
    "American Indian or Alaska Native",
    "Native Hawaiian or Other Pacific Islander",
];

pub const GENDERS: &[&str] = &["Male", "Female", "Non-binary"];

pub const REGIONS: &[&str] = &["Northeast", "Midwest", "West", "South"];

/// (task, award)
pub const CHALLENGES: &[(&str, i32)] = &[
    ("Complete a survey", 20),
    ("Publish a survey", 20),
    ("Redeem a reward", 10),
];
