// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod leaderboard;
pub mod task;
pub mod transaction;
pub mod user;

pub use leaderboard::{LeaderboardEntry, Timeframe};
pub use task::{
    CompletionOutcome, CompletionStats, NewTask, RecentCompletion, ReviewAction, Task,
    TaskCompletionCount, TaskUpdate, UserTaskView, XpTransaction,
};
pub use transaction::{NewTransaction, TransactionFilter, TransactionRecord, TransactionView};
pub use user::{NewUser, ProfileUpdate, User, UserSummary};
