//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    /// Wallet address (immutable identity key)
    pub wallet_address: String,
    pub username: String,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub quote: Option<String>,
    /// JSON array of preferred asset symbols
    pub preferred_assets: Option<serde_json::Value>,
    pub trading_type: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    /// Cumulative XP (non-negative)
    pub xp: i64,
    /// Derived: `xp / 300 + 1`; never stored independently of an XP update
    pub level: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Abbreviated user row for listings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub wallet_address: String,
    pub username: String,
    pub level: i64,
    pub xp: i64,
    pub created_at: DateTime<Utc>,
    pub email_verified: bool,
    pub trading_type: Option<String>,
}

/// Payload for creating a user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub wallet_address: String,
    pub username: Option<String>,
}

impl NewUser {
    /// Default display name derived from the wallet address.
    pub fn default_username(&self) -> String {
        let tail: String = self.wallet_address.chars().skip(2).take(4).collect();
        format!("PREDIK_{}", tail)
    }
}

/// Typed partial profile update: a `None` field means "leave unchanged".
///
/// XP and level are intentionally absent; level is derived from XP and both
/// change only through ledger operations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub quote: Option<String>,
    pub preferred_assets: Option<serde_json::Value>,
    pub trading_type: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.bio.is_none()
            && self.occupation.is_none()
            && self.quote.is_none()
            && self.preferred_assets.is_none()
            && self.trading_type.is_none()
            && self.email.is_none()
            && self.email_verified.is_none()
    }

    /// Apply the update to an in-memory user record.
    pub fn apply(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(v) = &self.username {
            user.username = v.clone();
        }
        if let Some(v) = &self.bio {
            user.bio = Some(v.clone());
        }
        if let Some(v) = &self.occupation {
            user.occupation = Some(v.clone());
        }
        if let Some(v) = &self.quote {
            user.quote = Some(v.clone());
        }
        if let Some(v) = &self.preferred_assets {
            user.preferred_assets = Some(v.clone());
        }
        if let Some(v) = &self.trading_type {
            user.trading_type = Some(v.clone());
        }
        if let Some(v) = &self.email {
            user.email = Some(v.clone());
        }
        if let Some(v) = self.email_verified {
            user.email_verified = v;
        }
        user.updated_at = now;
    }
}
