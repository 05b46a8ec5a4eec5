// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin authentication.
//!
//! Admin-only handlers take a [`RequireAdmin`] extractor, which checks the
//! `x-admin-token` header against `ADMIN_TOKEN` from configuration and
//! rejects with 401 otherwise.

use crate::error::AppError;
use crate::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Extractor that rejects requests without a valid admin token.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok());

        match presented {
            Some(token) if token == state.config.admin_token => Ok(RequireAdmin),
            _ => {
                tracing::warn!("Blocked admin request with missing or invalid token");
                Err(AppError::Unauthorized)
            }
        }
    }
}
