// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer.
//!
//! All handlers talk to the [`Store`] trait; the backend is chosen at
//! startup from configuration. `PgStore` is the production Postgres
//! implementation, `MemStore` is the in-memory double used for local
//! development and tests.

pub mod memory;
pub mod postgres;

pub use memory::MemStore;
pub use postgres::PgStore;

use crate::config::Config;
use crate::error::Result;
use crate::models::{
    CompletionOutcome, CompletionStats, LeaderboardEntry, NewTask, NewTransaction, NewUser,
    ProfileUpdate, ReviewAction, Task, TaskUpdate, Timeframe, TransactionFilter,
    TransactionRecord, TransactionView, User, UserSummary, UserTaskView, XpTransaction,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Typed operations over the engagement schema.
///
/// Every mutating operation is atomic within a single backend transaction;
/// a mid-sequence failure leaves state as if the call never started.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    /// Create a user; an existing wallet is rejected with `Conflict`.
    async fn create_user(&self, new: &NewUser) -> Result<User>;
    async fn get_user(&self, wallet: &str) -> Result<Option<User>>;
    async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<UserSummary>>;
    async fn search_users(&self, query: &str, limit: i64) -> Result<Vec<UserSummary>>;
    /// Apply a typed partial update; `None` when the user does not exist.
    async fn update_profile(&self, wallet: &str, update: &ProfileUpdate) -> Result<Option<User>>;
    /// Delete a user and purge all dependent records. Returns false if absent.
    async fn delete_user(&self, wallet: &str) -> Result<bool>;

    // ─── Tasks ───────────────────────────────────────────────────

    async fn list_tasks(&self) -> Result<Vec<Task>>;
    async fn create_task(&self, new: &NewTask) -> Result<Task>;
    /// Apply a batch of partial updates atomically; `None` if any id is unknown.
    async fn update_tasks(&self, updates: &[TaskUpdate]) -> Result<Option<Vec<Task>>>;
    async fn delete_task(&self, id: i64) -> Result<bool>;
    /// All tasks with this user's completion state; `None` if the user is absent.
    async fn tasks_for_user(&self, wallet: &str) -> Result<Option<Vec<UserTaskView>>>;
    /// Clear a user's completions and history. Returns false if absent.
    async fn reset_user_tasks(&self, wallet: &str) -> Result<bool>;

    // ─── Engagement ledger ───────────────────────────────────────

    /// Apply a task completion: gate via the ledger rules, then atomically
    /// record the completion, bump XP/level, and append the audit row.
    async fn complete_task(
        &self,
        wallet: &str,
        task_id: i64,
        verification: Option<serde_json::Value>,
    ) -> Result<CompletionOutcome>;
    /// XP audit trail for a user; `None` if the user is absent.
    async fn xp_history(
        &self,
        wallet: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Option<Vec<XpTransaction>>>;
    async fn completion_stats(&self) -> Result<CompletionStats>;
    /// Bulk approve or reject completion rows; returns the affected count.
    async fn review_completions(&self, ids: &[i64], action: ReviewAction) -> Result<u64>;

    // ─── Leaderboard ─────────────────────────────────────────────

    async fn leaderboard_page(
        &self,
        timeframe: Timeframe,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaderboardEntry>>;
    async fn leaderboard_total(&self, timeframe: Timeframe) -> Result<i64>;
    async fn leaderboard_entry(
        &self,
        timeframe: Timeframe,
        wallet: &str,
    ) -> Result<Option<LeaderboardEntry>>;
    /// Entries with rank in `[rank-2, rank+2]`, ascending.
    async fn surrounding_entries(
        &self,
        timeframe: Timeframe,
        rank: i64,
    ) -> Result<Vec<LeaderboardEntry>>;
    async fn search_leaderboard(
        &self,
        timeframe: Timeframe,
        query: &str,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>>;

    // ─── Transactions & staking ──────────────────────────────────

    async fn create_transaction(&self, new: &NewTransaction) -> Result<TransactionRecord>;
    async fn update_transaction_status(
        &self,
        hash: &str,
        status: &str,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<TransactionRecord>>;
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<(Vec<TransactionView>, i64)>;
}

/// Build the store selected by configuration.
pub async fn from_config(config: &Config) -> Result<Arc<dyn Store>> {
    match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await?;
            tracing::info!("Connected to Postgres");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Ok(Arc::new(MemStore::new()))
        }
    }
}
