// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};

use super::extract::{AppForm, AppJson};
use crate::{
    auth::{Auth, AuthError, Registration},
    models::{
        AccountResponse, LoginRequest, MessageResponse, RegisterRequest, RegisterResponse,
        TokenForm, TokenResponse,
    },
    state::AppState,
};

/// Clears a browser-held `Authorization` cookie.
const CLEAR_AUTH_COOKIE: &str = "Authorization=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax";

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 201, body = RegisterResponse),
        (status = 400, description = "Username or email already registered"),
        (status = 422, description = "Invalid username, email or password")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    let account = state
        .auth
        .register(Registration {
            username: request.username,
            email: request.email,
            password: request.password,
        })
        .await?;
    let token = state.auth.issue_for(&account)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            account: AccountResponse::from(&account),
            access_token: token.access_token,
            token_type: "bearer".to_string(),
            expires_in: token.expires_in,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = TokenResponse),
        (status = 401, description = "Incorrect username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let (_, token) = state.auth.login(&request.username, &request.password).await?;
    Ok(Json(TokenResponse::bearer(token.access_token, token.expires_in)))
}

/// OAuth2 password grant. Same outcome as `/login`, form-encoded.
#[utoipa::path(
    post,
    path = "/token",
    request_body(content = TokenForm, content_type = "application/x-www-form-urlencoded"),
    tag = "Auth",
    responses(
        (status = 200, body = TokenResponse),
        (status = 401, description = "Incorrect username or password")
    )
)]
pub async fn token(
    State(state): State<AppState>,
    AppForm(form): AppForm<TokenForm>,
) -> Result<Json<TokenResponse>, AuthError> {
    if let Some(grant_type) = form.grant_type.as_deref() {
        if grant_type != "password" {
            return Err(AuthError::Validation(format!(
                "unsupported grant_type '{grant_type}'"
            )));
        }
    }
    let (_, token) = state.auth.login(&form.username, &form.password).await?;
    Ok(Json(TokenResponse::bearer(token.access_token, token.expires_in)))
}

/// Stateless logout: the token stays valid until it expires; the client
/// is expected to discard it.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn logout(Auth(account): Auth) -> impl IntoResponse {
    tracing::info!(account_id = %account.id, "Logged out");
    (
        AppendHeaders([(SET_COOKIE, CLEAR_AUTH_COOKIE)]),
        Json(MessageResponse {
            message: "Successfully logged out".to_string(),
        }),
    )
}
