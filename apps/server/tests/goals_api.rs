use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use goaltrack_server::{api::app_router, build_state, config::Config};

async fn build_test_router() -> (axum::Router, TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config {
        listen_addr: "127.0.0.1:0".to_string(),
        db_path: tmp.path().join("test.db").to_string_lossy().into_owned(),
        cors_origin: None,
        fcm_server_key: None,
        expiration_check_interval_secs: 60 * 60,
        archive_check_interval_secs: 24 * 60 * 60,
        warning_interval_secs: 24 * 60 * 60,
        urgent_interval_secs: 3 * 60 * 60,
    };
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

async fn request(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn goal_crud_and_completion_flow() {
    let (app, _tmp) = build_test_router().await;

    // Create a weekly root goal.
    let (status, parent) = request(
        &app,
        Method::POST,
        "/api/goals",
        Some(json!({ "title": "Weekly review", "goalType": "WEEKLY" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(parent["status"], "ACTIVE");
    let parent_id = parent["id"].as_str().unwrap().to_string();

    // A MONTHLY goal cannot sit under a WEEKLY parent.
    let (status, _) = request(
        &app,
        Method::POST,
        "/api/goals",
        Some(json!({
            "title": "Bad child",
            "goalType": "MONTHLY",
            "parentId": parent_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A DAILY child is legal.
    let (status, child) = request(
        &app,
        Method::POST,
        "/api/goals",
        Some(json!({
            "title": "Daily step",
            "goalType": "DAILY",
            "parentId": parent_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let child_id = child["id"].as_str().unwrap().to_string();

    // Complete the child and check the parent's derived progress.
    let (status, completed) = request(
        &app,
        Method::PATCH,
        &format!("/api/goals/{child_id}/complete"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "COMPLETED");
    assert!(completed["completedAt"].is_string());

    let (_, progress) = request(
        &app,
        Method::GET,
        &format!("/api/goals/{parent_id}/progress"),
        None,
    )
    .await;
    assert_eq!(progress["progressPercentage"], 100.0);

    // Uncomplete reverts status and clears the completion timestamp.
    let (_, reverted) = request(
        &app,
        Method::PATCH,
        &format!("/api/goals/{child_id}/uncomplete"),
        None,
    )
    .await;
    assert_eq!(reverted["status"], "ACTIVE");
    assert!(reverted["completedAt"].is_null());

    // Deleting the parent cascades to the child.
    let (status, _) = request(
        &app,
        Method::DELETE,
        &format!("/api/goals/{parent_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = request(&app, Method::GET, &format!("/api/goals/{child_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn expiration_check_and_extend_flow() {
    let (app, _tmp) = build_test_router().await;
    let now = Utc::now().naive_utc();

    let (_, overdue) = request(
        &app,
        Method::POST,
        "/api/goals",
        Some(json!({
            "title": "Already late",
            "goalType": "DAILY",
            "dueDate": now - Duration::hours(2),
        })),
    )
    .await;
    let overdue_id = overdue["id"].as_str().unwrap().to_string();

    let (_, current) = request(
        &app,
        Method::POST,
        "/api/goals",
        Some(json!({
            "title": "Still on track",
            "goalType": "DAILY",
            "dueDate": now + Duration::hours(2),
        })),
    )
    .await;
    let current_id = current["id"].as_str().unwrap().to_string();

    // Manual trigger expires exactly the overdue goal.
    let (status, result) = request(
        &app,
        Method::POST,
        "/api/admin/run-expiration-check",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["processed"], 1);

    let (_, goal) = request(&app, Method::GET, &format!("/api/goals/{overdue_id}"), None).await;
    assert_eq!(goal["status"], "EXPIRED");
    let (_, goal) = request(&app, Method::GET, &format!("/api/goals/{current_id}"), None).await;
    assert_eq!(goal["status"], "ACTIVE");

    // Re-running is a no-op.
    let (_, result) = request(
        &app,
        Method::POST,
        "/api/admin/run-expiration-check",
        None,
    )
    .await;
    assert_eq!(result["processed"], 0);

    // Extending reactivates the expired goal.
    let (status, extended) = request(
        &app,
        Method::POST,
        &format!("/api/goals/{overdue_id}/extend?days=3"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(extended["status"], "ACTIVE");

    // Extending a goal without a due date is rejected.
    let (_, undated) = request(
        &app,
        Method::POST,
        "/api/goals",
        Some(json!({ "title": "No deadline", "goalType": "DAILY" })),
    )
    .await;
    let undated_id = undated["id"].as_str().unwrap();
    let (status, _) = request(
        &app,
        Method::POST,
        &format!("/api/goals/{undated_id}/extend?days=3"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn device_token_registration_flow() {
    let (app, _tmp) = build_test_router().await;

    let (status, registered) = request(
        &app,
        Method::POST,
        "/api/device-tokens",
        Some(json!({
            "pushToken": "tok-1",
            "deviceName": "Pixel 9",
            "platform": "android",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(registered["success"], true);
    let token_id = registered["tokenId"].as_str().unwrap().to_string();

    let (_, active) = request(&app, Method::GET, "/api/device-tokens", None).await;
    assert_eq!(active.as_array().unwrap().len(), 1);

    // Removal deactivates instead of deleting.
    let (status, removed) = request(
        &app,
        Method::DELETE,
        &format!("/api/device-tokens/{token_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["success"], true);

    let (_, active) = request(&app, Method::GET, "/api/device-tokens", None).await;
    assert!(active.as_array().unwrap().is_empty());

    let (status, stored) = request(
        &app,
        Method::GET,
        &format!("/api/device-tokens/{token_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["isActive"], false);

    // Registration without a token is a validation error.
    let (status, _) = request(
        &app,
        Method::POST,
        "/api/device-tokens",
        Some(json!({ "pushToken": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (app, _tmp) = build_test_router().await;
    let (status, body) = request(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
