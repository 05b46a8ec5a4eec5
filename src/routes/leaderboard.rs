// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard routes: paginated rankings, per-user rank lookups with
//! surrounding context, substring search, and reward-tier classification.

use crate::error::Result;
use crate::extract::Json;
use crate::ledger;
use crate::models::{LeaderboardEntry, Timeframe};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/leaderboard/search", post(search_leaderboard))
        .route("/api/leaderboard/rank/{wallet}", get(get_rank))
        .route("/api/leaderboard/rewards/{wallet}", get(get_rewards))
}

#[derive(Deserialize)]
struct LeaderboardQuery {
    timeframe: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

/// Leaderboard row as presented to clients.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LeaderboardRow {
    rank: i64,
    user: String,
    wallet_address: String,
    level: i64,
    xp: i64,
    predictions: i64,
    correct_predictions: i64,
    /// Set by the frontend when it recognizes its own wallet
    is_you: bool,
}

impl From<LeaderboardEntry> for LeaderboardRow {
    fn from(e: LeaderboardEntry) -> Self {
        LeaderboardRow {
            rank: e.rank,
            user: e.username,
            wallet_address: e.wallet_address,
            level: e.level,
            xp: e.xp,
            predictions: e.predictions_count,
            correct_predictions: e.correct_predictions,
            is_you: false,
        }
    }
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
struct LeaderboardResponse {
    leaderboard: Vec<LeaderboardRow>,
    pagination: Pagination,
    timeframe: &'static str,
}

/// Paginated leaderboard for a timeframe.
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let timeframe = Timeframe::parse(params.timeframe.as_deref());
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);

    let total = state.store.leaderboard_total(timeframe).await?;
    let entries = state
        .store
        .leaderboard_page(timeframe, limit, offset)
        .await?;

    Ok(Json(LeaderboardResponse {
        leaderboard: entries.into_iter().map(Into::into).collect(),
        pagination: Pagination {
            total,
            page: offset / limit + 1,
            page_size: limit,
            pages: (total + limit - 1) / limit,
        },
        timeframe: timeframe.as_str(),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SurroundingUser {
    rank: i64,
    username: String,
    level: i64,
    xp: i64,
    predictions: i64,
    correct_predictions: i64,
    wallet_address: String,
    is_you: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RankedResponse {
    exists: bool,
    ranked: bool,
    rank: i64,
    username: String,
    level: i64,
    xp: i64,
    predictions: i64,
    correct_predictions: i64,
    wallet_address: String,
    timeframe: &'static str,
    percentile: i64,
    surrounding_users: Vec<SurroundingUser>,
    total_users: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnrankedResponse {
    exists: bool,
    ranked: bool,
    username: String,
    level: i64,
    xp: i64,
    predictions: i64,
    correct_predictions: i64,
    message: &'static str,
    timeframe: &'static str,
    wallet_address: String,
}

#[derive(Serialize)]
struct UnknownUserResponse {
    error: &'static str,
    exists: bool,
}

#[derive(Deserialize)]
struct TimeframeQuery {
    timeframe: Option<String>,
}

/// A user's rank with up to two neighbours on each side.
async fn get_rank(
    State(state): State<Arc<AppState>>,
    Path(wallet): Path<String>,
    Query(params): Query<TimeframeQuery>,
) -> Result<Response> {
    let timeframe = Timeframe::parse(params.timeframe.as_deref());

    let Some(entry) = state.store.leaderboard_entry(timeframe, &wallet).await? else {
        // Distinguish "no such user" from "user exists but is not ranked"
        return match state.store.get_user(&wallet).await? {
            None => Ok((
                StatusCode::NOT_FOUND,
                Json(UnknownUserResponse {
                    error: "User not found",
                    exists: false,
                }),
            )
                .into_response()),
            Some(user) => Ok(Json(UnrankedResponse {
                exists: true,
                ranked: false,
                username: user.username,
                level: user.level,
                xp: user.xp,
                predictions: 0,
                correct_predictions: 0,
                message: "User not yet ranked on leaderboard",
                timeframe: timeframe.as_str(),
                wallet_address: wallet,
            })
            .into_response()),
        };
    };

    let total_users = state.store.leaderboard_total(timeframe).await?;
    let surrounding = state
        .store
        .surrounding_entries(timeframe, entry.rank)
        .await?;

    Ok(Json(RankedResponse {
        exists: true,
        ranked: true,
        rank: entry.rank,
        username: entry.username.clone(),
        level: entry.level,
        xp: entry.xp,
        predictions: entry.predictions_count,
        correct_predictions: entry.correct_predictions,
        wallet_address: entry.wallet_address.clone(),
        timeframe: timeframe.as_str(),
        percentile: ledger::percentile(entry.rank, total_users),
        surrounding_users: surrounding
            .into_iter()
            .map(|e| SurroundingUser {
                rank: e.rank,
                username: e.username,
                level: e.level,
                xp: e.xp,
                predictions: e.predictions_count,
                correct_predictions: e.correct_predictions,
                is_you: e.wallet_address == wallet,
                wallet_address: e.wallet_address,
            })
            .collect(),
        total_users,
    })
    .into_response())
}

#[derive(Deserialize)]
struct SearchPayload {
    query: String,
    timeframe: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<LeaderboardRow>,
    count: usize,
    timeframe: &'static str,
}

/// Substring search over a leaderboard view.
async fn search_leaderboard(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SearchPayload>,
) -> Result<Json<SearchResponse>> {
    if payload.query.len() < 2 {
        return Err(crate::error::AppError::BadRequest(
            "Search query must be at least 2 characters".to_string(),
        ));
    }
    let timeframe = Timeframe::parse(payload.timeframe.as_deref());

    let entries = state
        .store
        .search_leaderboard(timeframe, &payload.query, 10)
        .await?;
    let results: Vec<LeaderboardRow> = entries.into_iter().map(Into::into).collect();

    Ok(Json(SearchResponse {
        count: results.len(),
        results,
        timeframe: timeframe.as_str(),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RewardsResponse {
    eligible: bool,
    tier: &'static str,
    reward: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    rank: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_users: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    percentile: Option<i64>,
    timeframe: &'static str,
}

/// Reward-tier classification for a user's current rank.
///
/// Defaults to the weekly window, and unlike the other leaderboard routes
/// an unrecognized timeframe falls back to all-time.
async fn get_rewards(
    State(state): State<Arc<AppState>>,
    Path(wallet): Path<String>,
    Query(params): Query<TimeframeQuery>,
) -> Result<Json<RewardsResponse>> {
    let timeframe = match params.timeframe.as_deref() {
        None | Some("weekly") => Timeframe::Weekly,
        Some("daily") => Timeframe::Daily,
        Some(_) => Timeframe::AllTime,
    };

    let Some(entry) = state.store.leaderboard_entry(timeframe, &wallet).await? else {
        return Ok(Json(RewardsResponse {
            eligible: false,
            tier: "none",
            reward: 0,
            rank: None,
            total_users: None,
            percentile: None,
            timeframe: timeframe.as_str(),
        }));
    };

    let total_users = state.store.leaderboard_total(timeframe).await?;
    let tier = ledger::reward_tier(entry.rank, total_users);

    Ok(Json(RewardsResponse {
        eligible: tier.eligible(),
        tier: tier.as_str(),
        reward: tier.reward(),
        rank: Some(entry.rank),
        total_users: Some(total_users),
        percentile: Some(ledger::percentile(entry.rank, total_users)),
        timeframe: timeframe.as_str(),
    }))
}
