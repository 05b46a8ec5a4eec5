// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task definitions, completions, and the XP audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An earnable unit of XP.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// XP value awarded per completion (positive)
    pub xp: i64,
    pub difficulty: String,
    pub task_type: String,
    pub requires_verification: bool,
    pub is_repeatable: bool,
    /// Cooldown between completions; only meaningful when repeatable
    pub repeat_cooldown_hours: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a task (admin).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub xp: i64,
    pub difficulty: String,
    pub task_type: String,
    #[serde(default)]
    pub requires_verification: bool,
    #[serde(default)]
    pub is_repeatable: bool,
    pub repeat_cooldown_hours: Option<i64>,
}

/// Typed partial task update: a `None` field means "leave unchanged".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub xp: Option<i64>,
    pub difficulty: Option<String>,
    pub task_type: Option<String>,
    pub requires_verification: Option<bool>,
    pub is_repeatable: Option<bool>,
    pub repeat_cooldown_hours: Option<i64>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.xp.is_none()
            && self.difficulty.is_none()
            && self.task_type.is_none()
            && self.requires_verification.is_none()
            && self.is_repeatable.is_none()
            && self.repeat_cooldown_hours.is_none()
    }

    pub fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(v) = &self.title {
            task.title = v.clone();
        }
        if let Some(v) = &self.description {
            task.description = v.clone();
        }
        if let Some(v) = self.xp {
            task.xp = v;
        }
        if let Some(v) = &self.difficulty {
            task.difficulty = v.clone();
        }
        if let Some(v) = &self.task_type {
            task.task_type = v.clone();
        }
        if let Some(v) = self.requires_verification {
            task.requires_verification = v;
        }
        if let Some(v) = self.is_repeatable {
            task.is_repeatable = v;
        }
        if let Some(v) = self.repeat_cooldown_hours {
            task.repeat_cooldown_hours = Some(v);
        }
        task.updated_at = now;
    }
}

/// A task joined with one user's completion state.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserTaskView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub xp: i64,
    pub difficulty: String,
    pub task_type: String,
    pub requires_verification: bool,
    pub is_repeatable: bool,
    pub repeat_cooldown_hours: Option<i64>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Result of a successful (or idempotently repeated) task completion.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub task_id: i64,
    pub xp_earned: i64,
    pub new_total_xp: i64,
    pub new_level: i64,
    pub leveled_up: bool,
    /// True when a non-repeatable task had already been completed
    pub already_completed: bool,
}

/// Append-only XP audit entry.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct XpTransaction {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub source: String,
    pub source_id: Option<i64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-task completion count for the statistics endpoint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TaskCompletionCount {
    pub id: i64,
    pub title: String,
    pub completion_count: i64,
    pub xp: i64,
    pub difficulty: String,
    pub task_type: String,
}

/// A recent completion for the statistics endpoint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RecentCompletion {
    pub username: String,
    pub wallet_address: String,
    pub task_title: String,
    pub task_id: i64,
    pub completed_at: DateTime<Utc>,
}

/// Completion statistics (per-task counts plus recent activity).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStats {
    pub task_stats: Vec<TaskCompletionCount>,
    pub recent_completions: Vec<RecentCompletion>,
}

/// Administrative action on pending completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}
