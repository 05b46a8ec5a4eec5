// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! PREDIK Engagement Ledger
//!
//! This crate provides the backend API for the PREDIK engagement system:
//! wallet-based user accounts earn XP and levels by completing tasks, with
//! results surfaced via time-scoped leaderboards and reward tiers.

pub mod config;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod store;

use config::Config;
use std::sync::Arc;
use store::Store;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
}
