// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated accounts.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(account): Auth) -> impl IntoResponse {
//!     // account is the caller's Account
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::AuthError;
use crate::state::AppState;
use crate::storage::Account;

/// Extractor for authenticated accounts.
///
/// Reads `Authorization: Bearer <token>`, verifies the token and resolves
/// the account it names. Rejects with `AuthError` (401) otherwise.
pub struct Auth(pub Account);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let account = state.auth.authenticate(token).inspect_err(|e| {
            tracing::warn!(
                error_code = e.error_code(),
                method = %parts.method,
                uri = %parts.uri.path(),
                "Rejected bearer token"
            );
        })?;
        Ok(Auth(account))
    }
}

/// Pull the token out of the Authorization header.
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let (scheme, token) = auth_header
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}
