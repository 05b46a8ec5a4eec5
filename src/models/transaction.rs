// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Off-chain bookkeeping of on-chain events: transactions and staking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Financial transaction row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TransactionRecord {
    pub id: i64,
    pub user_id: i64,
    pub transaction_type: String,
    pub transaction_hash: Option<String>,
    pub amount: Option<f64>,
    pub token_symbol: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Transaction joined with the owning user, for listings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TransactionView {
    pub id: i64,
    pub transaction_type: String,
    pub transaction_hash: Option<String>,
    pub amount: Option<f64>,
    pub token_symbol: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub username: String,
    pub wallet_address: String,
}

/// Payload for recording a transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub wallet_address: String,
    pub transaction_type: String,
    pub transaction_hash: Option<String>,
    pub amount: Option<f64>,
    pub token_symbol: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    /// Staking parameters (used when `transaction_type == "stake"`)
    pub apr: Option<f64>,
    pub lock_period_days: Option<i64>,
}

fn default_status() -> String {
    "pending".to_string()
}

/// Filters for the transaction listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub wallet_address: Option<String>,
    pub transaction_type: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
