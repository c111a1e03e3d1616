// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use notes_server::api::router;
use notes_server::auth::SessionTokens;
use notes_server::state::AppState;
use notes_server::storage::Datastore;

// -- Helpers ------------------------------------------------------------------

struct TestApp {
    app: axum::Router,
    _data_dir: TempDir,
}

fn setup_app() -> TestApp {
    let data_dir = TempDir::new().unwrap();
    let store = Arc::new(Datastore::open(&data_dir.path().join("notes.redb")).unwrap());
    let tokens = SessionTokens::new(
        b"integration-secret-0123456789abcdef",
        chrono::Duration::minutes(30),
    );
    TestApp {
        app: router(AppState::new(store, tokens)),
        _data_dir: data_dir,
    }
}

async fn json_request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let has_body = body.is_some();
    let body_str = body.map(|b| b.to_string()).unwrap_or_default();
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if has_body {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }

    let req = builder.body(Body::from(body_str)).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &axum::Router, username: &str, password: &str) -> (StatusCode, Value) {
    json_request(
        app,
        "POST",
        "/register",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await
}

async fn login(app: &axum::Router, username: &str, password: &str) -> String {
    let (status, body) = json_request(
        app,
        "POST",
        "/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

// -- Tests --------------------------------------------------------------------

#[tokio::test]
async fn end_to_end_note_lifecycle() {
    let test = setup_app();
    let app = &test.app;

    let (status, body) = register(app, "alice", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["account"]["username"], "alice");
    assert!(body["account"].get("password_hash").is_none());

    let (status, _) = register(app, "bob", "secret2").await;
    assert_eq!(status, StatusCode::CREATED);

    let alice = login(app, "alice", "secret1").await;
    let bob = login(app, "bob", "secret2").await;

    let (status, note) = json_request(
        app,
        "POST",
        "/notes/",
        Some(&alice),
        Some(json!({"title": "Groceries", "body": "milk"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(note["owner"], "alice");
    assert_eq!(note["title"], "Groceries");
    let note_id = note["id"].as_str().unwrap().to_string();
    let note_path = format!("/notes/{note_id}");

    let (status, _) = json_request(app, "GET", &note_path, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, fetched) = json_request(app, "GET", &note_path, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, note);

    let (status, deleted) = json_request(app, "DELETE", &note_path, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], note_id.as_str());

    let (status, _) = json_request(app, "GET", &note_path, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let test = setup_app();

    let (status, _) = register(&test.app, "alice", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = register(&test.app, "alice", "other").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "identity_taken");
}

#[tokio::test]
async fn wrong_credentials_are_unauthorized() {
    let test = setup_app();
    register(&test.app, "alice", "secret1").await;
    register(&test.app, "bob", "secret2").await;

    for (username, password) in [("alice", "secret2"), ("carol", "secret1"), ("bob", "secret1")] {
        let (status, body) = json_request(
            &test.app,
            "POST",
            "/login",
            None,
            Some(json!({"username": username, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{username}/{password}");
        assert_eq!(body["error_code"], "invalid_credentials");
    }
}

#[tokio::test]
async fn token_endpoint_accepts_form_credentials() {
    let test = setup_app();
    register(&test.app, "alice", "secret1").await;

    let req = Request::builder()
        .method("POST")
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("grant_type=password&username=alice&password=secret1"))
        .unwrap();
    let resp = test.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["token_type"], "bearer");

    let token = body["access_token"].as_str().unwrap();
    let (status, notes) = json_request(&test.app, "GET", "/notes", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notes, json!([]));
}

#[tokio::test]
async fn logout_clears_cookie_and_requires_valid_token() {
    let test = setup_app();
    register(&test.app, "alice", "secret1").await;
    let token = login(&test.app, "alice", "secret1").await;

    let req = Request::builder()
        .method("POST")
        .uri("/logout")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let resp = test.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("Authorization=;"));
    assert!(cookie.contains("Max-Age=0"));

    // Logout is stateless: the token keeps working until it expires
    let (status, _) = json_request(&test.app, "GET", "/notes", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = json_request(&test.app, "POST", "/logout", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let test = setup_app();
    register(&test.app, "alice", "secret1").await;
    let token = login(&test.app, "alice", "secret1").await;

    // Flip one character of the signature
    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let (status, body) = json_request(&test.app, "GET", "/notes", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error_code"] == "invalid_signature" || body["error_code"] == "malformed_token");
}

#[tokio::test]
async fn patch_updates_only_given_fields() {
    let test = setup_app();
    register(&test.app, "alice", "secret1").await;
    let alice = login(&test.app, "alice", "secret1").await;

    let (_, note) = json_request(
        &test.app,
        "POST",
        "/notes",
        Some(&alice),
        Some(json!({"title": "T", "body": "B"})),
    )
    .await;
    let note_path = format!("/notes/{}", note["id"].as_str().unwrap());

    let (status, patched) = json_request(
        &test.app,
        "PATCH",
        &note_path,
        Some(&alice),
        Some(json!({"body": "B2", "owner_id": "someone-else"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "T");
    assert_eq!(patched["body"], "B2");
    assert_eq!(patched["owner_id"], note["owner_id"]);

    let (status, _) =
        json_request(&test.app, "PATCH", &note_path, Some(&alice), Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, replaced) = json_request(
        &test.app,
        "PUT",
        &note_path,
        Some(&alice),
        Some(json!({"title": "New", "body": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["title"], "New");
    assert_eq!(replaced["body"], "");
}

#[tokio::test]
async fn notes_are_isolated_between_accounts() {
    let test = setup_app();
    register(&test.app, "alice", "secret1").await;
    register(&test.app, "bob", "secret2").await;
    let alice = login(&test.app, "alice", "secret1").await;
    let bob = login(&test.app, "bob", "secret2").await;

    let (_, note) = json_request(
        &test.app,
        "POST",
        "/notes",
        Some(&alice),
        Some(json!({"title": "Private", "body": "alice only"})),
    )
    .await;
    let note_path = format!("/notes/{}", note["id"].as_str().unwrap());

    let (status, list) = json_request(&test.app, "GET", "/notes", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));

    let (status, _) = json_request(
        &test.app,
        "PUT",
        &note_path,
        Some(&bob),
        Some(json!({"title": "Hijacked", "body": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = json_request(&test.app, "DELETE", &note_path, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, list) = json_request(&test.app, "GET", "/notes/", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["title"], "Private");
}
