// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store.
//!
//! A test double for `PgStore` holding the whole schema behind one
//! `tokio::sync::RwLock`. Mutations validate before touching state, so a
//! rejected operation leaves the store exactly as it was (the same
//! all-or-nothing guarantee the Postgres transactions provide).

use crate::error::{AppError, Result};
use crate::ledger::{self, CompletionDecision};
use crate::models::{
    CompletionOutcome, CompletionStats, LeaderboardEntry, NewTask, NewTransaction, NewUser,
    ProfileUpdate, RecentCompletion, ReviewAction, Task, TaskCompletionCount, TaskUpdate,
    Timeframe, TransactionFilter, TransactionRecord, TransactionView, User, UserSummary,
    UserTaskView, XpTransaction,
};
use crate::store::Store;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CompletionRow {
    id: i64,
    user_id: i64,
    task_id: i64,
    completed_at: DateTime<Utc>,
    verification_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
struct HistoryRow {
    user_id: i64,
    task_id: i64,
    xp_earned: i64,
}

#[derive(Debug, Clone)]
struct PredictionRow {
    user_id: i64,
    timestamp: DateTime<Utc>,
    outcome: Option<String>,
}

#[derive(Debug, Clone)]
struct StakingRow {
    transaction_id: i64,
    user_id: i64,
    is_active: bool,
}

#[derive(Default)]
struct MemInner {
    users: Vec<User>,
    tasks: Vec<Task>,
    completions: Vec<CompletionRow>,
    history: Vec<HistoryRow>,
    xp_log: Vec<XpTransaction>,
    transactions: Vec<TransactionRecord>,
    staking: Vec<StakingRow>,
    predictions: Vec<PredictionRow>,
    next_id: i64,
}

impl MemInner {
    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, wallet: &str) -> Option<&User> {
        self.users.iter().find(|u| u.wallet_address == wallet)
    }

    fn user_mut(&mut self, wallet: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.wallet_address == wallet)
    }

    /// Materialize a leaderboard: descending XP, ties broken by lower id.
    fn ranking(&self, timeframe: Timeframe, now: DateTime<Utc>) -> Vec<LeaderboardEntry> {
        let cutoff = timeframe
            .window_hours()
            .map(|hours| now - Duration::hours(hours));

        let mut ordered: Vec<&User> = self.users.iter().collect();
        ordered.sort_by(|a, b| b.xp.cmp(&a.xp).then(a.id.cmp(&b.id)));

        ordered
            .iter()
            .enumerate()
            .map(|(i, u)| {
                let in_window = |p: &&PredictionRow| {
                    p.user_id == u.id && cutoff.map_or(true, |c| p.timestamp > c)
                };
                let predictions_count =
                    self.predictions.iter().filter(in_window).count() as i64;
                let correct_predictions = self
                    .predictions
                    .iter()
                    .filter(in_window)
                    .filter(|p| p.outcome.as_deref() == Some("correct"))
                    .count() as i64;

                LeaderboardEntry {
                    id: u.id,
                    wallet_address: u.wallet_address.clone(),
                    username: u.username.clone(),
                    level: u.level,
                    xp: u.xp,
                    predictions_count,
                    correct_predictions,
                    rank: (i + 1) as i64,
                }
            })
            .collect()
    }
}

/// In-memory store (test double).
pub struct MemStore {
    inner: RwLock<MemInner>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemInner::default()),
        }
    }

    /// Seed a prediction row (used to exercise the leaderboard activity counts).
    pub async fn record_prediction(
        &self,
        wallet: &str,
        outcome: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let user_id = inner
            .user(wallet)
            .map(|u| u.id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        inner.predictions.push(PredictionRow {
            user_id,
            timestamp,
            outcome: outcome.map(|s| s.to_string()),
        });
        Ok(())
    }
}

#[async_trait]
impl Store for MemStore {
    // ─── Users ───────────────────────────────────────────────────

    async fn create_user(&self, new: &NewUser) -> Result<User> {
        let mut inner = self.inner.write().await;
        if inner.user(&new.wallet_address).is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let now = Utc::now();
        let id = inner.alloc_id();
        let user = User {
            id,
            wallet_address: new.wallet_address.clone(),
            username: new
                .username
                .clone()
                .unwrap_or_else(|| new.default_username()),
            bio: None,
            occupation: None,
            quote: None,
            preferred_assets: Some(serde_json::json!(["MATIC", "ETH", "BTC"])),
            trading_type: Some("Spot".to_string()),
            email: None,
            email_verified: false,
            xp: 0,
            level: 1,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, wallet: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.user(wallet).cloned())
    }

    async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<UserSummary>> {
        let inner = self.inner.read().await;
        let mut ordered: Vec<&User> = inner.users.iter().collect();
        ordered.sort_by(|a, b| b.xp.cmp(&a.xp).then(a.id.cmp(&b.id)));
        Ok(ordered
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(summary)
            .collect())
    }

    async fn search_users(&self, query: &str, limit: i64) -> Result<Vec<UserSummary>> {
        let needle = query.to_lowercase();
        let inner = self.inner.read().await;
        let mut matched: Vec<&User> = inner
            .users
            .iter()
            .filter(|u| {
                u.username.to_lowercase().contains(&needle)
                    || u.wallet_address.to_lowercase().contains(&needle)
            })
            .collect();
        matched.sort_by(|a, b| b.xp.cmp(&a.xp).then(a.id.cmp(&b.id)));
        Ok(matched
            .into_iter()
            .take(limit.max(0) as usize)
            .map(summary)
            .collect())
    }

    async fn update_profile(&self, wallet: &str, update: &ProfileUpdate) -> Result<Option<User>> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        match inner.user_mut(wallet) {
            Some(user) => {
                update.apply(user, now);
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_user(&self, wallet: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some(user_id) = inner.user(wallet).map(|u| u.id) else {
            return Ok(false);
        };

        inner.completions.retain(|c| c.user_id != user_id);
        inner.history.retain(|h| h.user_id != user_id);
        inner.xp_log.retain(|x| x.user_id != user_id);
        inner.staking.retain(|s| s.user_id != user_id);
        inner.transactions.retain(|t| t.user_id != user_id);
        inner.predictions.retain(|p| p.user_id != user_id);
        inner.users.retain(|u| u.id != user_id);
        Ok(true)
    }

    // ─── Tasks ───────────────────────────────────────────────────

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.clone())
    }

    async fn create_task(&self, new: &NewTask) -> Result<Task> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let id = inner.alloc_id();
        let task = Task {
            id,
            title: new.title.clone(),
            description: new.description.clone(),
            xp: new.xp,
            difficulty: new.difficulty.clone(),
            task_type: new.task_type.clone(),
            requires_verification: new.requires_verification,
            is_repeatable: new.is_repeatable,
            repeat_cooldown_hours: new.repeat_cooldown_hours,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_tasks(&self, updates: &[TaskUpdate]) -> Result<Option<Vec<Task>>> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        // Validate the whole batch before mutating anything.
        if updates
            .iter()
            .any(|u| !inner.tasks.iter().any(|t| t.id == u.id))
        {
            return Ok(None);
        }

        let mut updated = Vec::with_capacity(updates.len());
        for update in updates {
            let task = inner
                .tasks
                .iter_mut()
                .find(|t| t.id == update.id)
                .expect("ids validated above");
            update.apply(task, now);
            updated.push(task.clone());
        }
        Ok(Some(updated))
    }

    async fn delete_task(&self, id: i64) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| t.id != id);
        if inner.tasks.len() == before {
            return Ok(false);
        }
        // Cascade, as the schema's foreign keys would
        inner.completions.retain(|c| c.task_id != id);
        inner.history.retain(|h| h.task_id != id);
        Ok(true)
    }

    async fn tasks_for_user(&self, wallet: &str) -> Result<Option<Vec<UserTaskView>>> {
        let inner = self.inner.read().await;
        let Some(user_id) = inner.user(wallet).map(|u| u.id) else {
            return Ok(None);
        };

        Ok(Some(
            inner
                .tasks
                .iter()
                .map(|t| {
                    let completion = inner
                        .completions
                        .iter()
                        .find(|c| c.user_id == user_id && c.task_id == t.id);
                    UserTaskView {
                        id: t.id,
                        title: t.title.clone(),
                        description: t.description.clone(),
                        xp: t.xp,
                        difficulty: t.difficulty.clone(),
                        task_type: t.task_type.clone(),
                        requires_verification: t.requires_verification,
                        is_repeatable: t.is_repeatable,
                        repeat_cooldown_hours: t.repeat_cooldown_hours,
                        completed: completion.is_some(),
                        completed_at: completion.map(|c| c.completed_at),
                    }
                })
                .collect(),
        ))
    }

    async fn reset_user_tasks(&self, wallet: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some(user_id) = inner.user(wallet).map(|u| u.id) else {
            return Ok(false);
        };
        inner.completions.retain(|c| c.user_id != user_id);
        inner.history.retain(|h| h.user_id != user_id);
        Ok(true)
    }

    // ─── Engagement ledger ───────────────────────────────────────

    async fn complete_task(
        &self,
        wallet: &str,
        task_id: i64,
        verification: Option<serde_json::Value>,
    ) -> Result<CompletionOutcome> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        let user = inner
            .user(wallet)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let task = inner
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        let last_completed_at = inner
            .completions
            .iter()
            .filter(|c| c.user_id == user.id && c.task_id == task_id)
            .map(|c| c.completed_at)
            .max();

        let xp_earned =
            match ledger::evaluate_completion(&task, last_completed_at, verification.is_some(), now)
            {
                CompletionDecision::Grant { xp } => xp,
                CompletionDecision::AlreadyCompleted => {
                    return Ok(CompletionOutcome {
                        task_id,
                        xp_earned: 0,
                        new_total_xp: user.xp,
                        new_level: user.level,
                        leveled_up: false,
                        already_completed: true,
                    });
                }
                CompletionDecision::MissingVerification => {
                    return Err(AppError::BadRequest(
                        "This task requires verification data".to_string(),
                    ));
                }
                CompletionDecision::CooldownActive { hours_remaining } => {
                    return Err(AppError::CooldownActive { hours_remaining });
                }
            };

        // All checks passed; apply every write while holding the lock.
        match inner
            .completions
            .iter_mut()
            .find(|c| c.user_id == user.id && c.task_id == task_id)
        {
            Some(row) => {
                row.completed_at = now;
                row.verification_data = verification.clone();
            }
            None => {
                let id = inner.alloc_id();
                inner.completions.push(CompletionRow {
                    id,
                    user_id: user.id,
                    task_id,
                    completed_at: now,
                    verification_data: verification.clone(),
                });
            }
        }

        if task.is_repeatable {
            inner.history.push(HistoryRow {
                user_id: user.id,
                task_id,
                xp_earned,
            });
        }

        let new_total_xp = user.xp + xp_earned;
        let new_level = ledger::level_for_xp(new_total_xp);
        {
            let u = inner.user_mut(wallet).expect("user checked above");
            u.xp = new_total_xp;
            u.level = new_level;
            u.updated_at = now;
        }

        let id = inner.alloc_id();
        inner.xp_log.push(XpTransaction {
            id,
            user_id: user.id,
            amount: xp_earned,
            source: "task".to_string(),
            source_id: Some(task_id),
            description: Some(format!("Completed: {}", task.title)),
            created_at: now,
        });

        Ok(CompletionOutcome {
            task_id,
            xp_earned,
            new_total_xp,
            new_level,
            leveled_up: new_level > user.level,
            already_completed: false,
        })
    }

    async fn xp_history(
        &self,
        wallet: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Option<Vec<XpTransaction>>> {
        let inner = self.inner.read().await;
        let Some(user_id) = inner.user(wallet).map(|u| u.id) else {
            return Ok(None);
        };

        let mut rows: Vec<XpTransaction> = inner
            .xp_log
            .iter()
            .filter(|x| x.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Some(
            rows.into_iter()
                .skip(offset.max(0) as usize)
                .take(limit.max(0) as usize)
                .collect(),
        ))
    }

    async fn completion_stats(&self) -> Result<CompletionStats> {
        let inner = self.inner.read().await;

        let mut task_stats: Vec<TaskCompletionCount> = inner
            .tasks
            .iter()
            .map(|t| TaskCompletionCount {
                id: t.id,
                title: t.title.clone(),
                completion_count: inner
                    .completions
                    .iter()
                    .filter(|c| c.task_id == t.id)
                    .count() as i64,
                xp: t.xp,
                difficulty: t.difficulty.clone(),
                task_type: t.task_type.clone(),
            })
            .collect();
        task_stats.sort_by(|a, b| b.completion_count.cmp(&a.completion_count));

        let mut recent: Vec<&CompletionRow> = inner.completions.iter().collect();
        recent.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        let recent_completions = recent
            .into_iter()
            .take(10)
            .filter_map(|c| {
                let user = inner.users.iter().find(|u| u.id == c.user_id)?;
                let task = inner.tasks.iter().find(|t| t.id == c.task_id)?;
                Some(RecentCompletion {
                    username: user.username.clone(),
                    wallet_address: user.wallet_address.clone(),
                    task_title: task.title.clone(),
                    task_id: task.id,
                    completed_at: c.completed_at,
                })
            })
            .collect();

        Ok(CompletionStats {
            task_stats,
            recent_completions,
        })
    }

    async fn review_completions(&self, ids: &[i64], action: ReviewAction) -> Result<u64> {
        let mut inner = self.inner.write().await;
        match action {
            ReviewAction::Approve => {
                let mut affected = 0;
                for row in inner
                    .completions
                    .iter_mut()
                    .filter(|c| ids.contains(&c.id))
                {
                    let mut data = row
                        .verification_data
                        .take()
                        .unwrap_or_else(|| serde_json::json!({}));
                    if let Some(obj) = data.as_object_mut() {
                        obj.insert("admin_verified".to_string(), serde_json::json!(true));
                    }
                    row.verification_data = Some(data);
                    affected += 1;
                }
                Ok(affected)
            }
            ReviewAction::Reject => {
                let before = inner.completions.len();
                inner.completions.retain(|c| !ids.contains(&c.id));
                Ok((before - inner.completions.len()) as u64)
            }
        }
    }

    // ─── Leaderboard ─────────────────────────────────────────────

    async fn leaderboard_page(
        &self,
        timeframe: Timeframe,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaderboardEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ranking(timeframe, Utc::now())
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn leaderboard_total(&self, timeframe: Timeframe) -> Result<i64> {
        let _ = timeframe;
        let inner = self.inner.read().await;
        Ok(inner.users.len() as i64)
    }

    async fn leaderboard_entry(
        &self,
        timeframe: Timeframe,
        wallet: &str,
    ) -> Result<Option<LeaderboardEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ranking(timeframe, Utc::now())
            .into_iter()
            .find(|e| e.wallet_address == wallet))
    }

    async fn surrounding_entries(
        &self,
        timeframe: Timeframe,
        rank: i64,
    ) -> Result<Vec<LeaderboardEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ranking(timeframe, Utc::now())
            .into_iter()
            .filter(|e| e.rank >= rank - 2 && e.rank <= rank + 2)
            .collect())
    }

    async fn search_leaderboard(
        &self,
        timeframe: Timeframe,
        query: &str,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>> {
        let needle = query.to_lowercase();
        let inner = self.inner.read().await;
        Ok(inner
            .ranking(timeframe, Utc::now())
            .into_iter()
            .filter(|e| {
                e.username.to_lowercase().contains(&needle) || e.wallet_address.contains(query)
            })
            .take(limit.max(0) as usize)
            .collect())
    }

    // ─── Transactions & staking ──────────────────────────────────

    async fn create_transaction(&self, new: &NewTransaction) -> Result<TransactionRecord> {
        let mut inner = self.inner.write().await;

        let user_id = inner
            .user(&new.wallet_address)
            .map(|u| u.id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(hash) = &new.transaction_hash {
            if inner
                .transactions
                .iter()
                .any(|t| t.transaction_hash.as_deref() == Some(hash))
            {
                return Err(AppError::Conflict(
                    "Transaction with this hash already exists".to_string(),
                ));
            }
        }

        let id = inner.alloc_id();
        let record = TransactionRecord {
            id,
            user_id,
            transaction_type: new.transaction_type.clone(),
            transaction_hash: new.transaction_hash.clone(),
            amount: new.amount,
            token_symbol: new.token_symbol.clone(),
            status: new.status.clone(),
            created_at: Utc::now(),
            completed_at: None,
        };
        inner.transactions.push(record.clone());

        if new.transaction_type == "stake" && new.amount.is_some() {
            inner.staking.push(StakingRow {
                transaction_id: record.id,
                user_id,
                is_active: true,
            });
        }

        Ok(record)
    }

    async fn update_transaction_status(
        &self,
        hash: &str,
        status: &str,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<TransactionRecord>> {
        let mut inner = self.inner.write().await;
        let completed_at = completed_at.or_else(|| (status == "completed").then(Utc::now));

        let Some(record) = inner
            .transactions
            .iter_mut()
            .find(|t| t.transaction_hash.as_deref() == Some(hash))
        else {
            return Ok(None);
        };

        record.status = status.to_string();
        record.completed_at = completed_at;
        let record = record.clone();

        if record.transaction_type == "stake" {
            let is_active = match status {
                "completed" => Some(true),
                "canceled" | "reverted" => Some(false),
                _ => None,
            };
            if let Some(is_active) = is_active {
                for row in inner
                    .staking
                    .iter_mut()
                    .filter(|s| s.transaction_id == record.id)
                {
                    row.is_active = is_active;
                }
            }
        }

        Ok(Some(record))
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<(Vec<TransactionView>, i64)> {
        let inner = self.inner.read().await;

        let mut views: Vec<TransactionView> = inner
            .transactions
            .iter()
            .filter_map(|t| {
                let user = inner.users.iter().find(|u| u.id == t.user_id)?;
                if let Some(wallet) = &filter.wallet_address {
                    if &user.wallet_address != wallet {
                        return None;
                    }
                }
                if let Some(tx_type) = &filter.transaction_type {
                    if &t.transaction_type != tx_type {
                        return None;
                    }
                }
                Some(TransactionView {
                    id: t.id,
                    transaction_type: t.transaction_type.clone(),
                    transaction_hash: t.transaction_hash.clone(),
                    amount: t.amount,
                    token_symbol: t.token_symbol.clone(),
                    status: t.status.clone(),
                    created_at: t.created_at,
                    completed_at: t.completed_at,
                    username: user.username.clone(),
                    wallet_address: user.wallet_address.clone(),
                })
            })
            .collect();

        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = views.len() as i64;
        let page = views
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }
}

fn summary(user: &User) -> UserSummary {
    UserSummary {
        id: user.id,
        wallet_address: user.wallet_address.clone(),
        username: user.username.clone(),
        level: user.level,
        xp: user.xp,
        created_at: user.created_at,
        email_verified: user.email_verified,
        trading_type: user.trading_type.clone(),
    }
}
