//! Leaderboard view rows and timeframe selection.

use serde::Serialize;

/// Time window scoping a leaderboard query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    #[default]
    Daily,
    Weekly,
    AllTime,
}

impl Timeframe {
    /// Parse a query-string value; unrecognized values default to daily.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("weekly") => Timeframe::Weekly,
            Some("alltime") => Timeframe::AllTime,
            _ => Timeframe::Daily,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
            Timeframe::AllTime => "alltime",
        }
    }

    /// Name of the backing leaderboard view.
    pub fn view_name(&self) -> &'static str {
        match self {
            Timeframe::Daily => "leaderboard_daily",
            Timeframe::Weekly => "leaderboard_weekly",
            Timeframe::AllTime => "leaderboard_alltime",
        }
    }

    /// Prediction-activity window in hours (`None` for all-time).
    pub fn window_hours(&self) -> Option<i64> {
        match self {
            Timeframe::Daily => Some(24),
            Timeframe::Weekly => Some(24 * 7),
            Timeframe::AllTime => None,
        }
    }
}

/// One row of a leaderboard view.
///
/// Rank is 1-based and contiguous, ordered by descending XP with ties broken
/// by earlier account creation (lower id).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub wallet_address: String,
    pub username: String,
    pub level: i64,
    pub xp: i64,
    pub predictions_count: i64,
    pub correct_predictions: i64,
    pub rank: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_parse_defaults_to_daily() {
        assert_eq!(Timeframe::parse(Some("weekly")), Timeframe::Weekly);
        assert_eq!(Timeframe::parse(Some("alltime")), Timeframe::AllTime);
        assert_eq!(Timeframe::parse(Some("monthly")), Timeframe::Daily);
        assert_eq!(Timeframe::parse(None), Timeframe::Daily);
    }
}
