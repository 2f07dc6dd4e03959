mod common;

use axum::http::StatusCode;
use common::{get, offline_app, post};
use serde_json::json;

#[tokio::test]
async fn root_describes_the_service() -> anyhow::Result<()> {
    let app = offline_app();
    let res = get(&app, "/", None).await;

    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Survey Exchange");
    Ok(())
}

#[tokio::test]
async fn health_reports_unreachable_database() -> anyhow::Result<()> {
    let app = offline_app();
    let res = get(&app, "/health", None).await;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.json()["data"]["status"], "degraded");
    Ok(())
}

#[tokio::test]
async fn landing_email_prefills_registration() -> anyhow::Result<()> {
    let app = offline_app();
    let res = post(&app, "/", None, json!({"email": "  ada@example.com "})).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["data"]["scope"], "pending");
    let token = body["data"]["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("no token in {}", body))?
        .to_string();

    let res = get(&app, "/auth/register", Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["data"]["email"], "ada@example.com");

    // no token, no prefill
    let res = get(&app, "/auth/register", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.json()["data"]["email"].is_null());
    Ok(())
}

#[tokio::test]
async fn landing_rejects_malformed_email() -> anyhow::Result<()> {
    let app = offline_app();
    let res = post(&app, "/", None, json!({"email": "not-an-email"})).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let body = res.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["email"].is_string());
    Ok(())
}

#[tokio::test]
async fn logout_always_succeeds() -> anyhow::Result<()> {
    let app = offline_app();
    let res = get(&app, "/auth/logout/", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["data"]["logged_out"], true);
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_not_found() -> anyhow::Result<()> {
    let app = offline_app();
    let res = get(&app, "/nope", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}
