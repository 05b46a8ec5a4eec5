// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task routes: definitions, admin mutations, completion, and statistics.

use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::middleware::RequireAdmin;
use crate::models::{CompletionStats, NewTask, ReviewAction, Task, TaskUpdate};
use crate::routes::users::{run_completion, CompletionResponse};
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/tasks",
            get(list_tasks)
                .post(create_task)
                .patch(update_tasks)
                .delete(delete_task),
        )
        .route(
            "/api/tasks/complete",
            get(completion_stats)
                .post(complete_task)
                .patch(review_completions),
        )
}

async fn list_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>> {
    let tasks = state.store.list_tasks().await?;
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Json(payload): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>)> {
    if payload.title.is_empty()
        || payload.description.is_empty()
        || payload.difficulty.is_empty()
        || payload.task_type.is_empty()
        || payload.xp <= 0
    {
        return Err(AppError::BadRequest(
            "Missing required fields: title, description, xp, difficulty, taskType".to_string(),
        ));
    }
    let task = state.store.create_task(&payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[derive(Deserialize)]
struct UpdateTasksPayload {
    tasks: Vec<TaskUpdate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTasksResponse {
    success: bool,
    updated_count: usize,
    tasks: Vec<Task>,
}

/// Bulk partial update; one unknown id fails the whole batch.
async fn update_tasks(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Json(payload): Json<UpdateTasksPayload>,
) -> Result<Json<UpdateTasksResponse>> {
    let updates: Vec<TaskUpdate> = payload
        .tasks
        .into_iter()
        .filter(|u| !u.is_empty())
        .collect();
    if updates.is_empty() {
        return Err(AppError::BadRequest("No tasks to update".to_string()));
    }

    let tasks = state
        .store
        .update_tasks(&updates)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

    Ok(Json(UpdateTasksResponse {
        success: true,
        updated_count: tasks.len(),
        tasks,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteTaskPayload {
    task_id: i64,
}

#[derive(Serialize)]
struct StatusResponse {
    success: bool,
    message: String,
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Json(payload): Json<DeleteTaskPayload>,
) -> Result<Json<StatusResponse>> {
    if !state.store.delete_task(payload.task_id).await? {
        return Err(AppError::NotFound("Task not found".to_string()));
    }
    Ok(Json(StatusResponse {
        success: true,
        message: format!("Task {} has been deleted", payload.task_id),
    }))
}

async fn completion_stats(State(state): State<Arc<AppState>>) -> Result<Json<CompletionStats>> {
    let stats = state.store.completion_stats().await?;
    Ok(Json(stats))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteTaskPayload {
    wallet_address: String,
    task_id: i64,
    verification_data: Option<serde_json::Value>,
}

async fn complete_task(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CompleteTaskPayload>,
) -> Result<Json<CompletionResponse>> {
    if payload.wallet_address.is_empty() {
        return Err(AppError::BadRequest(
            "Wallet address is required".to_string(),
        ));
    }
    run_completion(
        &state,
        &payload.wallet_address,
        payload.task_id,
        payload.verification_data,
    )
    .await
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewPayload {
    completion_ids: Vec<i64>,
    action: ReviewAction,
}

/// Bulk approve or reject completion rows (admin only).
async fn review_completions(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Json(payload): Json<ReviewPayload>,
) -> Result<Json<StatusResponse>> {
    if payload.completion_ids.is_empty() {
        return Err(AppError::BadRequest(
            "Valid completion IDs array is required".to_string(),
        ));
    }

    let affected = state
        .store
        .review_completions(&payload.completion_ids, payload.action)
        .await?;

    let verb = match payload.action {
        ReviewAction::Approve => "approved",
        ReviewAction::Reject => "rejected",
    };
    Ok(Json(StatusResponse {
        success: true,
        message: format!("{} task completion(s) have been {}", affected, verb),
    }))
}
