// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Postgres store backed by a sqlx connection pool.
//!
//! Multi-statement mutations run inside `sqlx::Transaction`, which rolls
//! back on drop unless committed, so every exit path (including errors)
//! leaves the database consistent. Reads are non-transactional and tolerate
//! snapshot drift between the count and row queries.

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
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};

const MAX_CONNECTIONS: u32 = 10;

/// Postgres store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to Postgres and run pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Postgres: {}", e)))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;

        Ok(Self { pool })
    }

    async fn user_id(&self, wallet: &str) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE wallet_address = $1")
            .bind(wallet)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }
}

#[async_trait]
impl Store for PgStore {
    // ─── Users ───────────────────────────────────────────────────

    async fn create_user(&self, new: &NewUser) -> Result<User> {
        let username = new
            .username
            .clone()
            .unwrap_or_else(|| new.default_username());

        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (wallet_address, username, xp, level, preferred_assets, trading_type)
             VALUES ($1, $2, 0, 1, $3, 'Spot')
             RETURNING *",
        )
        .bind(&new.wallet_address)
        .bind(&username)
        .bind(serde_json::json!(["MATIC", "ETH", "BTC"]))
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AppError::Conflict("User already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_user(&self, wallet: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE wallet_address = $1")
            .bind(wallet)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, wallet_address, username, level, xp, created_at, email_verified, trading_type
             FROM users
             ORDER BY xp DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn search_users(&self, query: &str, limit: i64) -> Result<Vec<UserSummary>> {
        let pattern = format!("%{}%", query);
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, wallet_address, username, level, xp, created_at, email_verified, trading_type
             FROM users
             WHERE LOWER(username) LIKE LOWER($1) OR LOWER(wallet_address) LIKE LOWER($1)
             ORDER BY xp DESC
             LIMIT $2",
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn update_profile(&self, wallet: &str, update: &ProfileUpdate) -> Result<Option<User>> {
        // Fixed field mapping: absent fields keep their current value.
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET
                 username = COALESCE($2, username),
                 bio = COALESCE($3, bio),
                 occupation = COALESCE($4, occupation),
                 quote = COALESCE($5, quote),
                 preferred_assets = COALESCE($6, preferred_assets),
                 trading_type = COALESCE($7, trading_type),
                 email = COALESCE($8, email),
                 email_verified = COALESCE($9, email_verified),
                 updated_at = NOW()
             WHERE wallet_address = $1
             RETURNING *",
        )
        .bind(wallet)
        .bind(update.username.as_deref())
        .bind(update.bio.as_deref())
        .bind(update.occupation.as_deref())
        .bind(update.quote.as_deref())
        .bind(update.preferred_assets.as_ref())
        .bind(update.trading_type.as_deref())
        .bind(update.email.as_deref())
        .bind(update.email_verified)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, wallet: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE wallet_address = $1")
            .bind(wallet)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(user_id) = user_id else {
            return Ok(false);
        };

        // ON DELETE CASCADE would cover these, but the purge is explicit so
        // the statement list documents exactly what user deletion removes.
        for table in [
            "user_task_completions",
            "user_task_history",
            "xp_transactions",
            "staking",
            "transactions",
            "predictions",
        ] {
            let sql = format!("DELETE FROM {} WHERE user_id = $1", table);
            sqlx::query(&sql).bind(user_id).execute(&mut *tx).await?;
        }
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    // ─── Tasks ───────────────────────────────────────────────────

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>("SELECT * FROM tasks ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn create_task(&self, new: &NewTask) -> Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks
                 (title, description, xp, difficulty, task_type,
                  requires_verification, is_repeatable, repeat_cooldown_hours)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.xp)
        .bind(&new.difficulty)
        .bind(&new.task_type)
        .bind(new.requires_verification)
        .bind(new.is_repeatable)
        .bind(new.repeat_cooldown_hours)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update_tasks(&self, updates: &[TaskUpdate]) -> Result<Option<Vec<Task>>> {
        // All-or-nothing: one unknown id rolls back the whole batch.
        let mut tx = self.pool.begin().await?;
        let mut updated = Vec::with_capacity(updates.len());

        for update in updates {
            let task = sqlx::query_as::<_, Task>(
                "UPDATE tasks SET
                     title = COALESCE($2, title),
                     description = COALESCE($3, description),
                     xp = COALESCE($4, xp),
                     difficulty = COALESCE($5, difficulty),
                     task_type = COALESCE($6, task_type),
                     requires_verification = COALESCE($7, requires_verification),
                     is_repeatable = COALESCE($8, is_repeatable),
                     repeat_cooldown_hours = COALESCE($9, repeat_cooldown_hours),
                     updated_at = NOW()
                 WHERE id = $1
                 RETURNING *",
            )
            .bind(update.id)
            .bind(update.title.as_deref())
            .bind(update.description.as_deref())
            .bind(update.xp)
            .bind(update.difficulty.as_deref())
            .bind(update.task_type.as_deref())
            .bind(update.requires_verification)
            .bind(update.is_repeatable)
            .bind(update.repeat_cooldown_hours)
            .fetch_optional(&mut *tx)
            .await?;

            match task {
                Some(task) => updated.push(task),
                None => return Ok(None),
            }
        }

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_task(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn tasks_for_user(&self, wallet: &str) -> Result<Option<Vec<UserTaskView>>> {
        let Some(user_id) = self.user_id(wallet).await? else {
            return Ok(None);
        };

        let tasks = sqlx::query_as::<_, UserTaskView>(
            "SELECT t.id, t.title, t.description, t.xp, t.difficulty, t.task_type,
                    t.requires_verification, t.is_repeatable, t.repeat_cooldown_hours,
                    (utc.id IS NOT NULL) AS completed,
                    utc.completed_at
             FROM tasks t
             LEFT JOIN user_task_completions utc
                 ON t.id = utc.task_id AND utc.user_id = $1
             ORDER BY t.id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(Some(tasks))
    }

    async fn reset_user_tasks(&self, wallet: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE wallet_address = $1")
            .bind(wallet)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(user_id) = user_id else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM user_task_completions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_task_history WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    // ─── Engagement ledger ───────────────────────────────────────

    async fn complete_task(
        &self,
        wallet: &str,
        task_id: i64,
        verification: Option<serde_json::Value>,
    ) -> Result<CompletionOutcome> {
        let mut tx = self.pool.begin().await?;

        // Lock the user row so concurrent completions for the same user
        // serialize; the UNIQUE(user_id, task_id) constraint is the backstop.
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE wallet_address = $1 FOR UPDATE",
        )
        .bind(wallet)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(task_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        let last_completed_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT completed_at FROM user_task_completions
             WHERE user_id = $1 AND task_id = $2",
        )
        .bind(user.id)
        .bind(task_id)
        .fetch_optional(&mut *tx)
        .await?;

        let xp_earned = match ledger::evaluate_completion(
            &task,
            last_completed_at,
            verification.is_some(),
            Utc::now(),
        ) {
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

        // Record the completion. Repeatable tasks refresh the unique row;
        // non-repeatable tasks treat a racing duplicate as already done.
        if task.is_repeatable {
            sqlx::query(
                "INSERT INTO user_task_completions (user_id, task_id, verification_data)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (user_id, task_id)
                 DO UPDATE SET completed_at = NOW(), verification_data = EXCLUDED.verification_data",
            )
            .bind(user.id)
            .bind(task_id)
            .bind(verification.as_ref())
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO user_task_history (user_id, task_id, xp_earned)
                 VALUES ($1, $2, $3)",
            )
            .bind(user.id)
            .bind(task_id)
            .bind(xp_earned)
            .execute(&mut *tx)
            .await?;
        } else {
            let inserted = sqlx::query(
                "INSERT INTO user_task_completions (user_id, task_id, verification_data)
                 VALUES ($1, $2, $3)",
            )
            .bind(user.id)
            .bind(task_id)
            .bind(verification.as_ref())
            .execute(&mut *tx)
            .await;

            if let Err(sqlx::Error::Database(db)) = &inserted {
                if db.is_unique_violation() {
                    return Ok(CompletionOutcome {
                        task_id,
                        xp_earned: 0,
                        new_total_xp: user.xp,
                        new_level: user.level,
                        leveled_up: false,
                        already_completed: true,
                    });
                }
            }
            inserted?;
        }

        let new_total_xp = user.xp + xp_earned;
        let new_level = ledger::level_for_xp(new_total_xp);

        sqlx::query("UPDATE users SET xp = $1, level = $2, updated_at = NOW() WHERE id = $3")
            .bind(new_total_xp)
            .bind(new_level)
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO xp_transactions (user_id, amount, source, source_id, description)
             VALUES ($1, $2, 'task', $3, $4)",
        )
        .bind(user.id)
        .bind(xp_earned)
        .bind(task_id)
        .bind(format!("Completed: {}", task.title))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

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
        let Some(user_id) = self.user_id(wallet).await? else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, XpTransaction>(
            "SELECT * FROM xp_transactions
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(Some(rows))
    }

    async fn completion_stats(&self) -> Result<CompletionStats> {
        let task_stats = sqlx::query_as::<_, TaskCompletionCount>(
            "SELECT t.id, t.title, COUNT(utc.id) AS completion_count,
                    t.xp, t.difficulty, t.task_type
             FROM tasks t
             LEFT JOIN user_task_completions utc ON t.id = utc.task_id
             GROUP BY t.id, t.title, t.xp, t.difficulty, t.task_type
             ORDER BY completion_count DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let recent_completions = sqlx::query_as::<_, RecentCompletion>(
            "SELECT u.username, u.wallet_address, t.title AS task_title,
                    t.id AS task_id, utc.completed_at
             FROM user_task_completions utc
             JOIN users u ON utc.user_id = u.id
             JOIN tasks t ON utc.task_id = t.id
             ORDER BY utc.completed_at DESC
             LIMIT 10",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(CompletionStats {
            task_stats,
            recent_completions,
        })
    }

    async fn review_completions(&self, ids: &[i64], action: ReviewAction) -> Result<u64> {
        let ids = ids.to_vec();
        let mut tx = self.pool.begin().await?;

        let affected = match action {
            ReviewAction::Approve => {
                sqlx::query(
                    "UPDATE user_task_completions
                     SET verification_data =
                         COALESCE(verification_data, '{}'::jsonb) || '{\"admin_verified\": true}'::jsonb
                     WHERE id = ANY($1)",
                )
                .bind(&ids)
                .execute(&mut *tx)
                .await?
                .rows_affected()
            }
            ReviewAction::Reject => {
                sqlx::query("DELETE FROM user_task_completions WHERE id = ANY($1)")
                    .bind(&ids)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected()
            }
        };

        tx.commit().await?;
        Ok(affected)
    }

    // ─── Leaderboard ─────────────────────────────────────────────

    async fn leaderboard_page(
        &self,
        timeframe: Timeframe,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaderboardEntry>> {
        let sql = format!(
            "SELECT id, wallet_address, username, level, xp,
                    predictions_count, correct_predictions, rank
             FROM {}
             ORDER BY rank ASC
             LIMIT $1 OFFSET $2",
            timeframe.view_name()
        );
        let entries = sqlx::query_as::<_, LeaderboardEntry>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    async fn leaderboard_total(&self, timeframe: Timeframe) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", timeframe.view_name());
        let total = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn leaderboard_entry(
        &self,
        timeframe: Timeframe,
        wallet: &str,
    ) -> Result<Option<LeaderboardEntry>> {
        let sql = format!(
            "SELECT id, wallet_address, username, level, xp,
                    predictions_count, correct_predictions, rank
             FROM {}
             WHERE wallet_address = $1",
            timeframe.view_name()
        );
        let entry = sqlx::query_as::<_, LeaderboardEntry>(&sql)
            .bind(wallet)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn surrounding_entries(
        &self,
        timeframe: Timeframe,
        rank: i64,
    ) -> Result<Vec<LeaderboardEntry>> {
        let sql = format!(
            "SELECT id, wallet_address, username, level, xp,
                    predictions_count, correct_predictions, rank
             FROM {}
             WHERE rank BETWEEN $1 - 2 AND $1 + 2
             ORDER BY rank ASC",
            timeframe.view_name()
        );
        let entries = sqlx::query_as::<_, LeaderboardEntry>(&sql)
            .bind(rank)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    async fn search_leaderboard(
        &self,
        timeframe: Timeframe,
        query: &str,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>> {
        let pattern = format!("%{}%", query);
        let sql = format!(
            "SELECT id, wallet_address, username, level, xp,
                    predictions_count, correct_predictions, rank
             FROM {}
             WHERE LOWER(username) LIKE LOWER($1) OR wallet_address LIKE $1
             ORDER BY rank ASC
             LIMIT $2",
            timeframe.view_name()
        );
        let entries = sqlx::query_as::<_, LeaderboardEntry>(&sql)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    // ─── Transactions & staking ──────────────────────────────────

    async fn create_transaction(&self, new: &NewTransaction) -> Result<TransactionRecord> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE wallet_address = $1")
            .bind(&new.wallet_address)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(hash) = &new.transaction_hash {
            let existing =
                sqlx::query_scalar::<_, i64>("SELECT id FROM transactions WHERE transaction_hash = $1")
                    .bind(hash)
                    .fetch_optional(&mut *tx)
                    .await?;
            if existing.is_some() {
                return Err(AppError::Conflict(
                    "Transaction with this hash already exists".to_string(),
                ));
            }
        }

        let record = sqlx::query_as::<_, TransactionRecord>(
            "INSERT INTO transactions
                 (user_id, transaction_type, transaction_hash, amount, token_symbol, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(user_id)
        .bind(&new.transaction_type)
        .bind(new.transaction_hash.as_deref())
        .bind(new.amount)
        .bind(new.token_symbol.as_deref())
        .bind(&new.status)
        .fetch_one(&mut *tx)
        .await?;

        if new.transaction_type == "stake" {
            if let Some(amount) = new.amount {
                sqlx::query(
                    "INSERT INTO staking
                         (user_id, transaction_id, amount, token_symbol, apr,
                          lock_period_days, is_active)
                     VALUES ($1, $2, $3, $4, $5, $6, TRUE)",
                )
                .bind(user_id)
                .bind(record.id)
                .bind(amount)
                .bind(new.token_symbol.as_deref().unwrap_or("MATIC"))
                .bind(new.apr.unwrap_or(12.5))
                .bind(new.lock_period_days.unwrap_or(30))
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(record)
    }

    async fn update_transaction_status(
        &self,
        hash: &str,
        status: &str,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<TransactionRecord>> {
        let completed_at =
            completed_at.or_else(|| (status == "completed").then(Utc::now));

        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, TransactionRecord>(
            "UPDATE transactions
             SET status = $2, completed_at = $3
             WHERE transaction_hash = $1
             RETURNING *",
        )
        .bind(hash)
        .bind(status)
        .bind(completed_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        // Staking activation follows the parent transaction's status.
        if record.transaction_type == "stake" {
            let is_active = match status {
                "completed" => Some(true),
                "canceled" | "reverted" => Some(false),
                _ => None,
            };
            if let Some(is_active) = is_active {
                sqlx::query("UPDATE staking SET is_active = $1 WHERE transaction_id = $2")
                    .bind(is_active)
                    .bind(record.id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(record))
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<(Vec<TransactionView>, i64)> {
        let rows = sqlx::query_as::<_, TransactionView>(
            "SELECT t.id, t.transaction_type, t.transaction_hash, t.amount,
                    t.token_symbol, t.status, t.created_at, t.completed_at,
                    u.username, u.wallet_address
             FROM transactions t
             JOIN users u ON t.user_id = u.id
             WHERE ($1::text IS NULL OR u.wallet_address = $1)
               AND ($2::text IS NULL OR t.transaction_type = $2)
             ORDER BY t.created_at DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(filter.wallet_address.as_deref())
        .bind(filter.transaction_type.as_deref())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)
             FROM transactions t
             JOIN users u ON t.user_id = u.id
             WHERE ($1::text IS NULL OR u.wallet_address = $1)
               AND ($2::text IS NULL OR t.transaction_type = $2)",
        )
        .bind(filter.wallet_address.as_deref())
        .bind(filter.transaction_type.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
