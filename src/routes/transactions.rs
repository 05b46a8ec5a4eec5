// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transaction routes: recording on-chain events and tracking their status.

use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::models::{NewTransaction, TransactionFilter, TransactionRecord, TransactionView};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/transactions",
        get(list_transactions)
            .post(create_transaction)
            .put(update_transaction),
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    wallet_address: Option<String>,
    #[serde(rename = "type")]
    transaction_type: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    total: i64,
    page: i64,
    page_size: i64,
    pages: i64,
}

#[derive(Serialize)]
struct ListResponse {
    transactions: Vec<TransactionView>,
    pagination: Pagination,
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ListResponse>> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);
    let filter = TransactionFilter {
        wallet_address: params.wallet_address,
        transaction_type: params.transaction_type,
        limit,
        offset,
    };

    let (transactions, total) = state.store.list_transactions(&filter).await?;

    Ok(Json(ListResponse {
        transactions,
        pagination: Pagination {
            total,
            page: offset / limit + 1,
            page_size: limit,
            pages: (total + limit - 1) / limit,
        },
    }))
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewTransaction>,
) -> Result<(StatusCode, Json<TransactionRecord>)> {
    if payload.wallet_address.is_empty() || payload.transaction_type.is_empty() {
        return Err(AppError::BadRequest(
            "Wallet address and transaction type are required".to_string(),
        ));
    }
    let record = state.store.create_transaction(&payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStatusPayload {
    transaction_hash: String,
    status: String,
    completed_at: Option<DateTime<Utc>>,
}

async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<Json<TransactionRecord>> {
    if payload.transaction_hash.is_empty() || payload.status.is_empty() {
        return Err(AppError::BadRequest(
            "Transaction hash and status are required".to_string(),
        ));
    }

    let record = state
        .store
        .update_transaction_status(&payload.transaction_hash, &payload.status, payload.completed_at)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

    Ok(Json(record))
}
