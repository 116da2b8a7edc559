use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::{error::ApiResult, main_lib::AppState};
use goaltrack_core::devices::{DeviceToken, RegisterDeviceToken};

async fn register_token(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<RegisterDeviceToken>,
) -> ApiResult<Json<Value>> {
    let token = state.device_token_service.register(registration).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Token registered successfully",
        "tokenId": token.id,
    })))
}

async fn get_active_tokens(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<DeviceToken>>> {
    Ok(Json(state.device_token_service.get_active_tokens()?))
}

async fn get_token(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DeviceToken>> {
    Ok(Json(state.device_token_service.get_token(&id)?))
}

#[derive(Deserialize)]
struct ByTokenParams {
    token: String,
}

async fn get_token_by_push_token(
    Query(params): Query<ByTokenParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Option<DeviceToken>>> {
    Ok(Json(
        state.device_token_service.find_by_push_token(&params.token)?,
    ))
}

async fn deactivate_token(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Value>> {
    state.device_token_service.deactivate(&id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Token deactivated successfully",
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestNotificationRequest {
    push_token: String,
    title: Option<String>,
    body: Option<String>,
}

/// Fires a one-off notification at a single token, outside any tier.
async fn send_test_notification(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TestNotificationRequest>,
) -> ApiResult<Json<Value>> {
    let title = request.title.unwrap_or_else(|| "Test notification".to_string());
    let body = request
        .body
        .unwrap_or_else(|| "Goaltrack notification test".to_string());

    let sent = state
        .notifier
        .send(&request.push_token, &title, &body, HashMap::new())
        .await;

    match sent {
        Ok(()) => {
            if let Some(token) = state
                .device_token_service
                .find_by_push_token(&request.push_token)?
            {
                state
                    .device_token_service
                    .touch(&token.id, Utc::now().naive_utc())
                    .await?;
            }
            Ok(Json(json!({
                "success": true,
                "message": "Test notification sent successfully",
            })))
        }
        Err(e) => {
            tracing::warn!("Test notification failed: {}", e);
            Ok(Json(json!({
                "success": false,
                "message": "Failed to send notification",
            })))
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/device-tokens", get(get_active_tokens).post(register_token))
        .route("/device-tokens/by-token", get(get_token_by_push_token))
        .route("/device-tokens/test-notification", post(send_test_notification))
        .route(
            "/device-tokens/{id}",
            get(get_token).delete(deactivate_token),
        )
}
