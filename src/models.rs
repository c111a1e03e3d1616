// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! Request types ignore unknown fields. In particular a client-supplied
//! `owner_id` is dropped during deserialization and can never reach the
//! datastore.
//!
//! ## Model Categories
//!
//! - **Auth**: registration, login and token responses
//! - **Notes**: note payloads and the note representation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::storage::{Account, NewNote, NotePatch, StoredNote};

/// Maximum note title length in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum note body length in characters.
pub const MAX_BODY_CHARS: usize = 100_000;

// =============================================================================
// Auth Models
// =============================================================================

/// Request to create an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    /// Optional email; also usable as a login identity.
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

/// Request to log in with a username or email.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username or email address.
    #[serde(alias = "email", alias = "identity")]
    pub username: String,
    pub password: String,
}

/// OAuth2 password-grant form accepted by `/token`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub grant_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Session token returned by `/login` and `/token`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn bearer(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
        }
    }
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            username: account.username.clone(),
            email: account.email.clone(),
            created_at: account.created_at,
        }
    }
}

/// Response to a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub account: AccountResponse,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// =============================================================================
// Note Models
// =============================================================================

/// Request to create a note, or to replace one with PUT.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl CreateNoteRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_title(&self.title)?;
        validate_body(&self.body)
    }

    pub fn into_new_note(self) -> NewNote {
        NewNote {
            title: self.title,
            body: self.body,
        }
    }

    /// PUT semantics: both fields are replaced.
    pub fn into_patch(self) -> NotePatch {
        NotePatch {
            title: Some(self.title),
            body: Some(self.body),
        }
    }
}

/// Partial update of a note. At least one field must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl UpdateNoteRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.is_none() && self.body.is_none() {
            return Err(ApiError::unprocessable("update must include title or body"));
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(body) = &self.body {
            validate_body(body)?;
        }
        Ok(())
    }

    pub fn into_patch(self) -> NotePatch {
        NotePatch {
            title: self.title,
            body: self.body,
        }
    }
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::unprocessable("title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ApiError::unprocessable(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_body(body: &str) -> Result<(), ApiError> {
    if body.chars().count() > MAX_BODY_CHARS {
        return Err(ApiError::unprocessable(format!(
            "body must be at most {MAX_BODY_CHARS} characters"
        )));
    }
    Ok(())
}

/// A note as returned to its owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    /// Account id of the owner.
    pub owner_id: String,
    /// Username of the owner.
    pub owner: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn from_stored(stored: StoredNote, owner: &Account) -> Self {
        Self {
            id: stored.id,
            owner_id: stored.owner_id,
            owner: owner.username.clone(),
            title: stored.title,
            body: stored.body,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

/// Acknowledgement of a deleted note.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteNoteResponse {
    pub message: String,
    pub id: String,
}
