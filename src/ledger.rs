// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Engagement ledger rules.
//!
//! Pure decision logic shared by every storage backend:
//! - XP/level math
//! - task-completion gating (verification, idempotence, cooldown)
//! - leaderboard percentile
//! - reward-tier classification
//!
//! No I/O happens here; the store layer applies these decisions atomically.

use crate::models::Task;
use chrono::{DateTime, Utc};

/// XP required per level. Level is derived, never stored independently.
pub const XP_PER_LEVEL: i64 = 300;

/// Derive a user's level from cumulative XP.
pub fn level_for_xp(xp: i64) -> i64 {
    xp / XP_PER_LEVEL + 1
}

/// Outcome of evaluating a completion attempt against the gating rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionDecision {
    /// Award the task's XP value.
    Grant { xp: i64 },
    /// Non-repeatable task already completed; idempotent zero-XP success.
    AlreadyCompleted,
    /// Task requires a verification payload and none was supplied.
    MissingVerification,
    /// Repeatable task still inside its cooldown window.
    CooldownActive { hours_remaining: i64 },
}

/// Evaluate whether a completion attempt may be granted.
///
/// `last_completed_at` is the most recent completion timestamp for this
/// (user, task) pair, if any.
pub fn evaluate_completion(
    task: &Task,
    last_completed_at: Option<DateTime<Utc>>,
    has_verification: bool,
    now: DateTime<Utc>,
) -> CompletionDecision {
    if task.requires_verification && !has_verification {
        return CompletionDecision::MissingVerification;
    }

    if !task.is_repeatable && last_completed_at.is_some() {
        return CompletionDecision::AlreadyCompleted;
    }

    if task.is_repeatable {
        if let (Some(last), Some(cooldown_hours)) = (last_completed_at, task.repeat_cooldown_hours)
        {
            let elapsed = now.signed_duration_since(last);
            let cooldown_secs = cooldown_hours * 3600;
            if elapsed.num_seconds() < cooldown_secs {
                let remaining_secs = cooldown_secs - elapsed.num_seconds();
                // Round up to whole hours for the user-facing message
                let hours_remaining = (remaining_secs + 3599) / 3600;
                return CompletionDecision::CooldownActive { hours_remaining };
            }
        }
    }

    CompletionDecision::Grant { xp: task.xp }
}

/// Percentile of a rank within a leaderboard of `total_users` entries.
pub fn percentile(rank: i64, total_users: i64) -> i64 {
    if total_users <= 0 {
        return 0;
    }
    ((total_users - rank) as f64 / total_users as f64 * 100.0).round() as i64
}

/// Reward-eligibility tier derived from leaderboard rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardTier {
    Gold,
    Silver,
    Bronze,
    Top10Percent,
    Top25Percent,
    None,
}

impl RewardTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardTier::Gold => "gold",
            RewardTier::Silver => "silver",
            RewardTier::Bronze => "bronze",
            RewardTier::Top10Percent => "top10percent",
            RewardTier::Top25Percent => "top25percent",
            RewardTier::None => "none",
        }
    }

    /// Fixed reward constant for the tier (policy values, not computed).
    pub fn reward(&self) -> i64 {
        match self {
            RewardTier::Gold => 1000,
            RewardTier::Silver => 500,
            RewardTier::Bronze => 200,
            RewardTier::Top10Percent => 100,
            RewardTier::Top25Percent => 50,
            RewardTier::None => 0,
        }
    }

    pub fn eligible(&self) -> bool {
        !matches!(self, RewardTier::None)
    }
}

/// Classify a rank into a reward tier.
///
/// The ladder is evaluated top-down; the first match wins, so the fixed
/// ranks take precedence over the percentage buckets.
pub fn reward_tier(rank: i64, total_users: i64) -> RewardTier {
    if rank == 1 {
        RewardTier::Gold
    } else if rank <= 3 {
        RewardTier::Silver
    } else if rank <= 10 {
        RewardTier::Bronze
    } else if rank <= (total_users as f64 * 0.10).ceil() as i64 {
        RewardTier::Top10Percent
    } else if rank <= (total_users as f64 * 0.25).ceil() as i64 {
        RewardTier::Top25Percent
    } else {
        RewardTier::None
    }
}

/// User-facing message for a successful completion.
pub fn completion_message(leveled_up: bool, new_level: i64, xp_earned: i64) -> String {
    if leveled_up {
        format!("Congratulations! You've reached level {}!", new_level)
    } else {
        format!("Task completed! You earned {} XP.", xp_earned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task(xp: i64, repeatable: bool, cooldown: Option<i64>, verify: bool) -> Task {
        Task {
            id: 1,
            title: "Test task".to_string(),
            description: "A task".to_string(),
            xp,
            difficulty: "Easy".to_string(),
            task_type: "profile".to_string(),
            requires_verification: verify,
            is_repeatable: repeatable,
            repeat_cooldown_hours: cooldown,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(150), 1);
        assert_eq!(level_for_xp(299), 1);
        assert_eq!(level_for_xp(300), 2);
        assert_eq!(level_for_xp(350), 2);
        assert_eq!(level_for_xp(899), 3);
        assert_eq!(level_for_xp(900), 4);
    }

    #[test]
    fn test_grant_on_first_completion() {
        let t = task(150, false, None, false);
        let decision = evaluate_completion(&t, None, false, Utc::now());
        assert_eq!(decision, CompletionDecision::Grant { xp: 150 });
    }

    #[test]
    fn test_non_repeatable_is_idempotent() {
        let t = task(150, false, None, false);
        let now = Utc::now();
        let decision = evaluate_completion(&t, Some(now - Duration::days(3)), false, now);
        assert_eq!(decision, CompletionDecision::AlreadyCompleted);
    }

    #[test]
    fn test_missing_verification() {
        let t = task(75, false, None, true);
        let decision = evaluate_completion(&t, None, false, Utc::now());
        assert_eq!(decision, CompletionDecision::MissingVerification);

        let decision = evaluate_completion(&t, None, true, Utc::now());
        assert_eq!(decision, CompletionDecision::Grant { xp: 75 });
    }

    #[test]
    fn test_cooldown_blocks_within_window() {
        let t = task(25, true, Some(24), false);
        let now = Utc::now();

        // Completed 1 hour ago, 24h cooldown: 23 hours remain
        let decision = evaluate_completion(&t, Some(now - Duration::hours(1)), false, now);
        assert_eq!(
            decision,
            CompletionDecision::CooldownActive { hours_remaining: 23 }
        );
    }

    #[test]
    fn test_cooldown_expires_after_window() {
        let t = task(25, true, Some(24), false);
        let now = Utc::now();

        let decision = evaluate_completion(&t, Some(now - Duration::hours(25)), false, now);
        assert_eq!(decision, CompletionDecision::Grant { xp: 25 });
    }

    #[test]
    fn test_cooldown_remaining_rounds_up() {
        let t = task(25, true, Some(24), false);
        let now = Utc::now();

        // 30 minutes elapsed: 23.5 hours remain, reported as 24
        let decision = evaluate_completion(&t, Some(now - Duration::minutes(30)), false, now);
        assert_eq!(
            decision,
            CompletionDecision::CooldownActive { hours_remaining: 24 }
        );
    }

    #[test]
    fn test_repeatable_without_cooldown_always_grants() {
        let t = task(25, true, None, false);
        let now = Utc::now();
        let decision = evaluate_completion(&t, Some(now - Duration::minutes(1)), false, now);
        assert_eq!(decision, CompletionDecision::Grant { xp: 25 });
    }

    #[test]
    fn test_reward_tier_ladder() {
        assert_eq!(reward_tier(1, 100), RewardTier::Gold);
        assert_eq!(reward_tier(2, 100), RewardTier::Silver);
        assert_eq!(reward_tier(3, 100), RewardTier::Silver);
        assert_eq!(reward_tier(4, 100), RewardTier::Bronze);
        // Rank 10 of 100: bronze wins over top10percent (first match)
        assert_eq!(reward_tier(10, 100), RewardTier::Bronze);
        assert_eq!(reward_tier(11, 200), RewardTier::Top10Percent);
        assert_eq!(reward_tier(25, 100), RewardTier::Top25Percent);
        assert_eq!(reward_tier(26, 100), RewardTier::None);
    }

    #[test]
    fn test_reward_values() {
        assert_eq!(RewardTier::Gold.reward(), 1000);
        assert_eq!(RewardTier::Silver.reward(), 500);
        assert_eq!(RewardTier::Bronze.reward(), 200);
        assert_eq!(RewardTier::Top10Percent.reward(), 100);
        assert_eq!(RewardTier::Top25Percent.reward(), 50);
        assert_eq!(RewardTier::None.reward(), 0);
        assert!(!RewardTier::None.eligible());
        assert!(RewardTier::Top25Percent.eligible());
    }

    #[test]
    fn test_percentile() {
        assert_eq!(percentile(1, 100), 99);
        assert_eq!(percentile(50, 100), 50);
        assert_eq!(percentile(100, 100), 0);
        assert_eq!(percentile(1, 3), 67);
        assert_eq!(percentile(1, 0), 0);
    }
}
