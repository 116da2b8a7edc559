//! Administrative triggers for the scheduled passes.
//!
//! Operational tooling and tests use these to run a pass on demand instead of
//! waiting for its cadence. Each returns the number of goals transitioned.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{error::ApiResult, main_lib::AppState};

async fn run_expiration_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    tracing::info!("Manual expiration check triggered");
    let processed = state
        .expiration_service
        .check_and_expire(Utc::now().naive_utc())
        .await?;
    Ok(Json(json!({ "processed": processed })))
}

async fn run_archive_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    tracing::info!("Manual archive check triggered");
    let processed = state
        .expiration_service
        .check_and_archive(Utc::now().naive_utc())
        .await?;
    Ok(Json(json!({ "processed": processed })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/run-expiration-check", post(run_expiration_check))
        .route("/admin/run-archive-check", post(run_archive_check))
}
