// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by a session token.
///
/// The token is a stateless assertion: nothing about it is stored server
/// side, and it stays valid until `exp` regardless of later account
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject: the account's username
    pub sub: String,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration (Unix timestamp, seconds)
    pub exp: i64,
}

impl SessionClaims {
    /// Build claims for `subject` issued at `issued_at` and valid for `ttl`.
    pub fn new(subject: impl Into<String>, issued_at: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            sub: subject.into(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// A freshly signed token together with its lifetime.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWT
    pub access_token: String,
    /// Seconds until expiry, counted from issuance
    pub expires_in: i64,
    pub claims: SessionClaims,
}
