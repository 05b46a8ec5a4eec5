// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User routes: profiles, per-user task state, completions, and the XP
//! audit trail.

use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::ledger;
use crate::middleware::RequireAdmin;
use crate::models::{NewUser, ProfileUpdate, User, UserSummary, UserTaskView, XpTransaction};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/search", get(search_users))
        .route(
            "/api/users/{wallet}",
            get(get_user)
                .put(replace_profile)
                .patch(patch_profile)
                .delete(delete_user),
        )
        .route(
            "/api/users/{wallet}/tasks",
            get(get_user_tasks).post(complete_task).put(reset_tasks),
        )
        .route("/api/users/{wallet}/xp", get(get_xp_history))
}

#[derive(Deserialize)]
struct PageQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Vec<UserSummary>>> {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let offset = params.offset.unwrap_or(0).max(0);
    let users = state.store.list_users(limit, offset).await?;
    Ok(Json(users))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    if payload.wallet_address.is_empty() {
        return Err(AppError::BadRequest(
            "Wallet address is required".to_string(),
        ));
    }
    let user = state.store.create_user(&payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
    limit: Option<i64>,
}

async fn search_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<UserSummary>>> {
    let query = params.q.unwrap_or_default();
    if query.len() < 3 {
        return Err(AppError::BadRequest(
            "Search query must be at least 3 characters".to_string(),
        ));
    }
    let limit = params.limit.unwrap_or(10).clamp(1, 50);
    let users = state.store.search_users(&query, limit).await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(wallet): Path<String>,
) -> Result<Json<User>> {
    let user = state
        .store
        .get_user(&wallet)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

/// Full profile update. Requires a username; other fields left out of the
/// payload keep their stored values.
async fn replace_profile(
    State(state): State<Arc<AppState>>,
    Path(wallet): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>> {
    if update.username.as_deref().unwrap_or("").is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }
    let user = state
        .store
        .update_profile(&wallet, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

/// Typed partial update. XP and level are not part of the payload type;
/// they change only through task completions.
async fn patch_profile(
    State(state): State<Arc<AppState>>,
    Path(wallet): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>> {
    if update.is_empty() {
        // Nothing to change; echo the current profile
        return get_user(State(state), Path(wallet)).await;
    }
    let user = state
        .store
        .update_profile(&wallet, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

#[derive(Deserialize)]
struct DeleteQuery {
    confirmed: Option<String>,
}

#[derive(Serialize)]
struct StatusResponse {
    success: bool,
    message: String,
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(wallet): Path<String>,
    Query(params): Query<DeleteQuery>,
) -> Result<Json<StatusResponse>> {
    if params.confirmed.as_deref() != Some("true") {
        return Err(AppError::BadRequest(
            "Confirmation required. Add ?confirmed=true to confirm deletion".to_string(),
        ));
    }

    if !state.store.delete_user(&wallet).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(wallet = %wallet, "Deleted user and all associated data");
    Ok(Json(StatusResponse {
        success: true,
        message: "User and all associated data have been deleted".to_string(),
    }))
}

async fn get_user_tasks(
    State(state): State<Arc<AppState>>,
    Path(wallet): Path<String>,
) -> Result<Json<Vec<UserTaskView>>> {
    let tasks = state
        .store
        .tasks_for_user(&wallet)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(tasks))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteTaskPayload {
    task_id: i64,
    verification_data: Option<serde_json::Value>,
}

/// Completion response shared with the `/api/tasks/complete` route.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CompletionResponse {
    pub success: bool,
    pub task_id: i64,
    pub xp_earned: i64,
    pub new_total_xp: i64,
    pub new_level: i64,
    pub leveled_up: bool,
    pub message: String,
}

pub(super) async fn run_completion(
    state: &AppState,
    wallet: &str,
    task_id: i64,
    verification: Option<serde_json::Value>,
) -> Result<Json<CompletionResponse>> {
    let outcome = state
        .store
        .complete_task(wallet, task_id, verification)
        .await?;

    let message = if outcome.already_completed {
        "Task already completed".to_string()
    } else {
        ledger::completion_message(outcome.leveled_up, outcome.new_level, outcome.xp_earned)
    };

    Ok(Json(CompletionResponse {
        success: true,
        task_id: outcome.task_id,
        xp_earned: outcome.xp_earned,
        new_total_xp: outcome.new_total_xp,
        new_level: outcome.new_level,
        leveled_up: outcome.leveled_up,
        message,
    }))
}

async fn complete_task(
    State(state): State<Arc<AppState>>,
    Path(wallet): Path<String>,
    Json(payload): Json<CompleteTaskPayload>,
) -> Result<Json<CompletionResponse>> {
    run_completion(&state, &wallet, payload.task_id, payload.verification_data).await
}

/// Admin-only reset of a user's completions and history.
async fn reset_tasks(
    State(state): State<Arc<AppState>>,
    Path(wallet): Path<String>,
    _admin: RequireAdmin,
) -> Result<Json<StatusResponse>> {
    if !state.store.reset_user_tasks(&wallet).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(Json(StatusResponse {
        success: true,
        message: "All tasks have been reset for this user".to_string(),
    }))
}

async fn get_xp_history(
    State(state): State<Arc<AppState>>,
    Path(wallet): Path<String>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Vec<XpTransaction>>> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);
    let history = state
        .store
        .xp_history(&wallet, limit, offset)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(history))
}
