//! End-to-end flow against a real Postgres.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.

mod common;

use axum::{
    http::{header, StatusCode},
    Router,
};
use common::{database_config, get, post};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

use survey_exchange::database::DatabaseManager;
use survey_exchange::state::AppState;

async fn live_app() -> (Router, sqlx::PgPool) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for ignored tests");
    let pool = DatabaseManager::connect(&database_config(&url)).await.expect("database reachable");
    DatabaseManager::initialize(&pool, true).await.expect("schema created");
    (survey_exchange::app(AppState::new(pool.clone())), pool)
}

fn unique_email(prefix: &str) -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock").as_nanos();
    format!("{}-{}@example.com", prefix, nanos)
}

/// Register and fill in details; returns (session token, panelist id)
async fn sign_up(app: &Router, prefix: &str) -> (String, i64) {
    let email = unique_email(prefix);
    let res = post(
        app,
        "/auth/register",
        None,
        json!({"email": email, "password": "correct horse", "confirm_password": "correct horse"}),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);
    let registration = res.json()["data"]["token"].as_str().expect("token").to_string();

    let res = post(
        app,
        "/auth/details/",
        Some(&registration),
        json!({
            "firstname": "Test",
            "lastname": prefix,
            "dob": "1990-06-01",
            "race": "White",
            "gender": "Female",
            "region": "Midwest"
        }),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text);
    let data = res.json()["data"].clone();
    (
        data["token"].as_str().expect("session token").to_string(),
        data["panelist"]["panelist_id"].as_i64().expect("panelist id"),
    )
}

fn option_id(options: &Value, list: &str, name: &str) -> i64 {
    options[list]
        .as_array()
        .expect("option list")
        .iter()
        .find(|o| o["name"] == name)
        .and_then(|o| o["id"].as_i64())
        .unwrap_or_else(|| panic!("{} missing from {}", name, list))
}

/// Who a seeded survey targets
struct Audience {
    min_age: i32,
    max_age: i32,
    races: Vec<&'static str>,
    genders: Vec<&'static str>,
    regions: Vec<&'static str>,
}

impl Audience {
    /// Includes the demographics `sign_up` fills in
    fn matching() -> Self {
        Self {
            min_age: 18,
            max_age: 99,
            races: vec!["White", "Asian"],
            genders: vec!["Female"],
            regions: vec!["Midwest", "South"],
        }
    }
}

async fn publish(app: &Router, token: &str, title: &str, audience: &Audience) -> i64 {
    let options = get(app, "/ask/", Some(token)).await.json()["data"].clone();
    let ids = |list: &str, names: &[&str]| -> Vec<i64> { names.iter().map(|n| option_id(&options, list, n)).collect() };
    let res = post(
        app,
        "/ask/",
        Some(token),
        json!({
            "category": "Eligibility",
            "title": title,
            "description": "Seeded by the eligibility test",
            "sample_size": 10,
            "min_age": audience.min_age,
            "max_age": audience.max_age,
            "race": ids("races", &audience.races),
            "gender": ids("genders", &audience.genders),
            "region": ids("regions", &audience.regions)
        }),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);
    res.json()["data"]["survey_id"].as_i64().expect("survey id")
}

/// Ids of recommended surveys that are among `seeded`
async fn recommended_among(app: &Router, token: &str, seeded: &[i64]) -> Vec<i64> {
    let res = get(app, "/answer/recommended/", Some(token)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text);
    res.json()["data"]["surveys"]
        .as_array()
        .expect("surveys")
        .iter()
        .filter_map(|s| s["survey_id"].as_i64())
        .filter(|id| seeded.contains(id))
        .collect()
}

#[tokio::test]
#[ignore]
async fn publish_answer_and_redeem() {
    let (app, pool) = live_app().await;
    let (publisher, _) = sign_up(&app, "publisher").await;
    let (respondent, respondent_id) = sign_up(&app, "respondent").await;

    // duplicate registration
    let res = post(
        &app,
        "/auth/register",
        None,
        json!({"email": "dup@example.com", "password": "correct horse", "confirm_password": "correct horse"}),
    )
    .await;
    if res.status == StatusCode::CREATED {
        let again = post(
            &app,
            "/auth/register",
            None,
            json!({"email": "dup@example.com", "password": "correct horse", "confirm_password": "correct horse"}),
        )
        .await;
        assert_eq!(again.status, StatusCode::CONFLICT);
        assert_eq!(again.json()["message"], "User dup@example.com is already registered.");
    } else {
        assert_eq!(res.status, StatusCode::CONFLICT);
    }

    // publish a survey for one respondent
    let options = get(&app, "/ask/", Some(&publisher)).await.json()["data"].clone();
    let res = post(
        &app,
        "/ask/",
        Some(&publisher),
        json!({
            "category": "Food",
            "title": "Breakfast habits",
            "description": "How do you start the day",
            "sample_size": 1,
            "min_age": 18,
            "max_age": 99,
            "race": [option_id(&options, "races", "White")],
            "gender": [option_id(&options, "genders", "Female")],
            "region": [option_id(&options, "regions", "Midwest")]
        }),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);
    let survey_id = res.json()["data"]["survey_id"].as_i64().expect("survey id");

    // nothing to submit yet
    let res = post(&app, &format!("/answer/{}", survey_id), Some(&respondent), json!({"responses": {}})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    for (question, answers) in [("Coffee or tea?", json!(["Coffee", "Tea", " "])), ("Eggs?", json!(["Yes", "No", "Yes"]))] {
        let res = post(
            &app,
            &format!("/ask/{}", survey_id),
            Some(&publisher),
            json!({"question": question, "answers": answers}),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);
    }
    let res = get(&app, &format!("/ask/{}", survey_id), Some(&publisher)).await.json();
    assert_eq!(res["data"]["num_questions"], 2);
    assert_eq!(res["data"]["point_value"], 10);
    assert_eq!(res["data"]["questions"][0]["answers"].as_array().map(Vec::len), Some(2));
    // repeated answer text is stored once
    assert_eq!(res["data"]["questions"][1]["answers"].as_array().map(Vec::len), Some(2));

    // only the publisher may add questions, and cannot answer their own survey
    let res = post(
        &app,
        &format!("/ask/{}", survey_id),
        Some(&respondent),
        json!({"question": "Toast?", "answers": ["Yes"]}),
    )
    .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = get(&app, &format!("/answer/{}", survey_id), Some(&publisher)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    // the respondent sees it and answers it
    let recommended = get(&app, "/answer/recommended/", Some(&respondent)).await.json();
    assert!(recommended["data"]["surveys"]
        .as_array()
        .expect("surveys")
        .iter()
        .any(|s| s["survey_id"].as_i64() == Some(survey_id)));

    let form = get(&app, &format!("/answer/{}", survey_id), Some(&respondent)).await.json();
    let fields = form["data"]["fields"].as_array().expect("fields").clone();
    assert_eq!(fields.len(), 2);
    let responses: serde_json::Map<String, Value> = fields
        .iter()
        .map(|f| (f["name"].as_str().expect("name").to_string(), f["choices"][0].clone()))
        .collect();

    let res = post(
        &app,
        &format!("/answer/{}", survey_id),
        Some(&respondent),
        json!({"responses": responses}),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);
    let receipt = res.json()["data"].clone();
    assert_eq!(receipt["points_awarded"], 10);
    assert_eq!(receipt["point_balance"], 10);
    assert_eq!(receipt["completes"], 1);
    assert_eq!(receipt["status"], "Completed");

    // second submission is refused
    let res = post(
        &app,
        &format!("/answer/{}", survey_id),
        Some(&respondent),
        json!({"responses": responses}),
    )
    .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let results = get(&app, &format!("/results/{}", survey_id), Some(&publisher)).await.json();
    assert_eq!(results["data"]["respondents"], 1);
    assert_eq!(results["data"]["questions"][0]["tallies"][0]["count"], 1);

    let export = get(&app, &format!("/export/{}", survey_id), Some(&publisher)).await;
    assert_eq!(export.status, StatusCode::OK);
    assert_eq!(
        export.headers[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        export.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Breakfast habits.xlsx\"; filename*=UTF-8''Breakfast%20habits.xlsx"
    );
    assert!(export.bytes.starts_with(b"PK\x03\x04"), "export is not a zip archive");

    // redemption: over balance is a silent no-op, then 100 → 50 through Venmo
    let res = post(&app, "/redeem/venmo/", Some(&respondent), json!({"amount": 1000})).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["data"]["redeemed"], false);

    sqlx::query("UPDATE panelists SET point_balance = 100 WHERE panelist_id = $1")
        .bind(respondent_id as i32)
        .execute(&pool)
        .await
        .expect("balance reset");
    let res = post(&app, "/redeem/venmo/", Some(&respondent), json!({"amount": 50})).await;
    let data = res.json()["data"].clone();
    assert_eq!(data["redeemed"], true);
    assert_eq!(data["point_balance"], 50);
    assert_eq!(data["redemption"]["redemption"], "Venmo");
    assert_eq!(data["redemption"]["amount"], 50);

    let profile = get(&app, "/profile/", Some(&respondent)).await.json();
    assert_eq!(profile["data"]["redemptions"].as_array().map(Vec::len), Some(1));
    assert_eq!(profile["data"]["surveys_responded"].as_array().map(Vec::len), Some(1));

    // challenges pay out once
    let home = get(&app, "/home/", Some(&respondent)).await.json();
    assert_eq!(home["data"]["num_completed"], 1);
    let challenge_id = home["data"]["challenges"][0]["task_id"].as_i64().expect("seeded challenge");
    let res = post(&app, &format!("/challenge/{}", challenge_id), Some(&respondent), json!({})).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text);
    let res = get(&app, &format!("/challenge/{}", challenge_id), Some(&respondent)).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn wrong_password_is_indistinguishable_from_unknown_email() {
    let (app, _) = live_app().await;
    let email = unique_email("login");
    let res = post(
        &app,
        "/auth/register",
        None,
        json!({"email": email, "password": "correct horse", "confirm_password": "correct horse"}),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let wrong = post(&app, "/auth/login/", None, json!({"email": email, "password": "battery staple"})).await;
    let unknown = post(
        &app,
        "/auth/login/",
        None,
        json!({"email": unique_email("nobody"), "password": "battery staple"}),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.json()["message"], "Incorrect username or password.");
    assert_eq!(wrong.json()["message"], unknown.json()["message"]);

    let ok = post(&app, "/auth/login/", None, json!({"email": email, "password": "correct horse"})).await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.json()["data"]["scope"], "session");
}

#[tokio::test]
#[ignore]
async fn recommended_excludes_each_failing_condition() {
    let (app, pool) = live_app().await;
    let (publisher, _) = sign_up(&app, "targeter").await;
    let (respondent, _) = sign_up(&app, "targeted").await;

    let control = publish(&app, &publisher, "Control", &Audience::matching()).await;

    let too_old = publish(
        &app,
        &publisher,
        "Retirees only",
        &Audience {
            min_age: 80,
            ..Audience::matching()
        },
    )
    .await;

    let closed = publish(&app, &publisher, "Closed", &Audience::matching()).await;
    sqlx::query("UPDATE surveys SET status = 'Completed' WHERE survey_id = $1")
        .bind(closed as i32)
        .execute(&pool)
        .await
        .expect("survey closed");

    let own = publish(&app, &respondent, "Own survey", &Audience::matching()).await;

    let other_race = publish(
        &app,
        &publisher,
        "Other race",
        &Audience {
            races: vec!["Asian"],
            ..Audience::matching()
        },
    )
    .await;

    let other_gender = publish(
        &app,
        &publisher,
        "Other gender",
        &Audience {
            genders: vec!["Male"],
            ..Audience::matching()
        },
    )
    .await;

    let other_region = publish(
        &app,
        &publisher,
        "Other region",
        &Audience {
            regions: vec!["West"],
            ..Audience::matching()
        },
    )
    .await;

    let answered = publish(&app, &publisher, "Already answered", &Audience::matching()).await;
    let res = post(
        &app,
        &format!("/ask/{}", answered),
        Some(&publisher),
        json!({"question": "Seen this before?", "answers": ["Yes", "No"]}),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);
    let form = get(&app, &format!("/answer/{}", answered), Some(&respondent)).await.json();
    let field = form["data"]["fields"][0].clone();
    let mut responses = serde_json::Map::new();
    responses.insert(field["name"].as_str().expect("field name").to_string(), field["choices"][0].clone());
    let res = post(
        &app,
        &format!("/answer/{}", answered),
        Some(&respondent),
        json!({"responses": responses}),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);

    let excluded = [too_old, closed, own, other_race, other_gender, other_region, answered];
    let seeded: Vec<i64> = std::iter::once(control).chain(excluded).collect();

    assert_eq!(recommended_among(&app, &respondent, &seeded).await, vec![control]);

    // the form refuses exactly what the list leaves out
    let res = get(&app, &format!("/answer/{}", control), Some(&respondent)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text);
    for survey_id in excluded {
        let res = get(&app, &format!("/answer/{}", survey_id), Some(&respondent)).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN, "survey {}: {}", survey_id, res.text);
    }

    // a panelist without details sees nothing
    let email = unique_email("undetailed");
    let res = post(
        &app,
        "/auth/register",
        None,
        json!({"email": email, "password": "correct horse", "confirm_password": "correct horse"}),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);
    let login = post(&app, "/auth/login/", None, json!({"email": email, "password": "correct horse"})).await;
    let undetailed = login.json()["data"]["token"].as_str().expect("session token").to_string();

    assert!(recommended_among(&app, &undetailed, &seeded).await.is_empty());
    let res = get(&app, &format!("/answer/{}", control), Some(&undetailed)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}
