// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StorageError;

/// Authentication error type.
///
/// Every token and credential failure maps to 401 and carries a
/// `WWW-Authenticate: Bearer` hint. The `error_code` lets clients tell the
/// cases apart without parsing messages.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingAuthHeader,
    /// Invalid authorization header format
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    /// Token is malformed
    #[error("Token is malformed")]
    MalformedToken,
    /// Token signature is invalid
    #[error("Token signature is invalid")]
    InvalidSignature,
    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,
    /// Token subject no longer resolves to an account
    #[error("Could not validate credentials")]
    UnknownAccount,
    /// Identity or secret did not match
    #[error("Incorrect username or password")]
    InvalidCredentials,
    /// Username or email already registered
    #[error("{0} is already registered")]
    IdentityTaken(String),
    /// Request payload failed validation
    #[error("{0}")]
    Validation(String),
    /// Datastore failure
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    /// Internal error
    #[error("Internal authentication error: {0}")]
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::UnknownAccount => "unknown_account",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::IdentityTaken(_) => "identity_taken",
            AuthError::Validation(_) => "validation_error",
            AuthError::Storage(_) | AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::UnknownAccount
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::IdentityTaken(_) => StatusCode::BAD_REQUEST,
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::Storage(_) | AuthError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the logs
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Authentication failed internally");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(AuthErrorBody {
            error: message,
            error_code: self.error_code().to_string(),
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
