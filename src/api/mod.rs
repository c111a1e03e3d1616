// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AccountResponse, CreateNoteRequest, DeleteNoteResponse, LoginRequest, MessageResponse,
        Note, RegisterRequest, RegisterResponse, TokenForm, TokenResponse, UpdateNoteRequest,
    },
    state::AppState,
};

pub mod auth;
pub mod extract;
pub mod health;
pub mod notes;

/// Build the application router with request-id and tracing layers.
///
/// CORS is left to the caller (see [`cors_layer`]).
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/health/live", get(health::liveness))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/token", post(auth::token))
        .route("/logout", post(auth::logout))
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route("/notes/", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/{note_id}",
            get(notes::get_note)
                .put(notes::replace_note)
                .patch(notes::update_note)
                .delete(notes::delete_note),
        )
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

/// CORS layer for the configured origins. An empty list allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::any())
        .allow_headers(AllowHeaders::any())
}

/// Registers the bearer token scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::health,
        health::liveness,
        health::readiness,
        auth::register,
        auth::login,
        auth::token,
        auth::logout,
        notes::list_notes,
        notes::create_note,
        notes::get_note,
        notes::replace_note,
        notes::update_note,
        notes::delete_note
    ),
    components(
        schemas(
            Note,
            CreateNoteRequest,
            UpdateNoteRequest,
            DeleteNoteResponse,
            RegisterRequest,
            RegisterResponse,
            AccountResponse,
            LoginRequest,
            TokenForm,
            TokenResponse,
            MessageResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Auth", description = "Registration, login and session tokens"),
        (name = "Notes", description = "Owner-scoped note management")
    )
)]
struct ApiDoc;
