use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{error::ApiResult, main_lib::AppState};
use goaltrack_core::constants::WARNING_HORIZON_HOURS;
use goaltrack_core::goals::{Goal, GoalStatus, GoalType, GoalUpdate, NewGoal};

async fn get_goals(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Goal>>> {
    let goals = state.goal_service.get_goals()?;
    Ok(Json(goals))
}

async fn create_goal(
    State(state): State<Arc<AppState>>,
    Json(goal): Json<NewGoal>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let g = state.goal_service.create_goal(goal).await?;
    Ok((StatusCode::CREATED, Json(g)))
}

async fn get_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    Ok(Json(state.goal_service.get_goal(&id)?))
}

async fn update_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<GoalUpdate>,
) -> ApiResult<Json<Goal>> {
    let g = state.goal_service.update_goal(&id, update).await?;
    Ok(Json(g))
}

async fn delete_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let _ = state.goal_service.delete_goal(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_goals_by_type(
    Path(goal_type): Path<GoalType>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Goal>>> {
    Ok(Json(state.goal_service.get_goals_by_type(goal_type)?))
}

async fn get_available_sub_types(
    Path(goal_type): Path<GoalType>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<GoalType>>> {
    Ok(Json(state.goal_service.available_sub_types(goal_type)))
}

async fn get_goals_by_status(
    Path(status): Path<GoalStatus>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Goal>>> {
    Ok(Json(state.goal_service.get_goals_by_status(status)?))
}

async fn get_root_goals(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Goal>>> {
    Ok(Json(state.goal_service.get_root_goals()?))
}

async fn get_child_goals(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Goal>>> {
    Ok(Json(state.goal_service.get_child_goals(&id)?))
}

async fn get_goal_progress(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Value>> {
    let progress = state.goal_service.get_progress(&id)?;
    Ok(Json(json!({
        "goalId": id,
        "progressPercentage": progress,
    })))
}

async fn complete_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    Ok(Json(state.goal_service.complete_goal(&id).await?))
}

async fn uncomplete_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    Ok(Json(state.goal_service.uncomplete_goal(&id).await?))
}

async fn expire_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    Ok(Json(state.goal_service.expire_goal(&id).await?))
}

async fn archive_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    Ok(Json(state.goal_service.archive_goal(&id).await?))
}

#[derive(Deserialize)]
struct ExtendParams {
    days: i64,
}

async fn extend_goal_due_date(
    Path(id): Path<String>,
    Query(params): Query<ExtendParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Goal>> {
    let g = state
        .goal_service
        .extend_goal_due_date(&id, params.days)
        .await?;
    Ok(Json(g))
}

async fn get_expired_goals(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Goal>>> {
    Ok(Json(state.goal_service.get_expired_goals()?))
}

async fn get_archived_goals(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Goal>>> {
    Ok(Json(state.goal_service.get_archived_goals()?))
}

#[derive(Deserialize)]
struct ExpiringSoonParams {
    #[serde(default = "default_horizon")]
    hours: i64,
}

fn default_horizon() -> i64 {
    WARNING_HORIZON_HOURS
}

async fn get_expiring_soon_goals(
    Query(params): Query<ExpiringSoonParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Goal>>> {
    Ok(Json(state.goal_service.get_expiring_soon_goals(params.hours)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/goals", get(get_goals).post(create_goal))
        .route("/goals/root", get(get_root_goals))
        .route("/goals/expired", get(get_expired_goals))
        .route("/goals/archived", get(get_archived_goals))
        .route("/goals/expiring-soon", get(get_expiring_soon_goals))
        .route("/goals/type/{goal_type}", get(get_goals_by_type))
        .route(
            "/goals/types/{goal_type}/available-subtypes",
            get(get_available_sub_types),
        )
        .route("/goals/status/{status}", get(get_goals_by_status))
        .route(
            "/goals/{id}",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
        .route("/goals/{id}/children", get(get_child_goals))
        .route("/goals/{id}/progress", get(get_goal_progress))
        .route("/goals/{id}/complete", patch(complete_goal))
        .route("/goals/{id}/uncomplete", patch(uncomplete_goal))
        .route("/goals/{id}/expire", post(expire_goal))
        .route("/goals/{id}/archive", post(archive_goal))
        .route("/goals/{id}/extend", post(extend_goal_due_date))
}
