// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::extract::AppJson;
use crate::{
    auth::Auth,
    error::ApiError,
    models::{CreateNoteRequest, DeleteNoteResponse, Note, UpdateNoteRequest},
    state::AppState,
    storage::NoteRepository,
};

#[utoipa::path(
    get,
    path = "/notes",
    tag = "Notes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = [Note]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_notes(
    State(state): State<AppState>,
    Auth(account): Auth,
) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = NoteRepository::new(&state.store)
        .list_by_owner(&account.id)?
        .into_iter()
        .map(|stored| Note::from_stored(stored, &account))
        .collect();
    Ok(Json(notes))
}

#[utoipa::path(
    post,
    path = "/notes",
    request_body = CreateNoteRequest,
    tag = "Notes",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = Note),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Invalid note")
    )
)]
pub async fn create_note(
    State(state): State<AppState>,
    Auth(account): Auth,
    AppJson(request): AppJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    request.validate()?;
    let stored = NoteRepository::new(&state.store).create(&account.id, request.into_new_note())?;
    tracing::info!(account_id = %account.id, note_id = %stored.id, "Note created");
    Ok((StatusCode::CREATED, Json(Note::from_stored(stored, &account))))
}

#[utoipa::path(
    get,
    path = "/notes/{note_id}",
    params(
        ("note_id" = String, Path, description = "Identifier of the note")
    ),
    tag = "Notes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = Note),
        (status = 404, description = "Note not found")
    )
)]
pub async fn get_note(
    Path(note_id): Path<String>,
    State(state): State<AppState>,
    Auth(account): Auth,
) -> Result<Json<Note>, ApiError> {
    let stored = NoteRepository::new(&state.store).get(&account.id, &note_id)?;
    Ok(Json(Note::from_stored(stored, &account)))
}

/// Replace title and body.
#[utoipa::path(
    put,
    path = "/notes/{note_id}",
    params(
        ("note_id" = String, Path, description = "Identifier of the note")
    ),
    request_body = CreateNoteRequest,
    tag = "Notes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = Note),
        (status = 404, description = "Note not found"),
        (status = 422, description = "Invalid note")
    )
)]
pub async fn replace_note(
    Path(note_id): Path<String>,
    State(state): State<AppState>,
    Auth(account): Auth,
    AppJson(request): AppJson<CreateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    request.validate()?;
    let stored = NoteRepository::new(&state.store).update(&account.id, &note_id, request.into_patch())?;
    tracing::info!(account_id = %account.id, note_id = %stored.id, "Note replaced");
    Ok(Json(Note::from_stored(stored, &account)))
}

/// Update only the fields present in the payload.
#[utoipa::path(
    patch,
    path = "/notes/{note_id}",
    params(
        ("note_id" = String, Path, description = "Identifier of the note")
    ),
    request_body = UpdateNoteRequest,
    tag = "Notes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = Note),
        (status = 404, description = "Note not found"),
        (status = 422, description = "Empty or invalid update")
    )
)]
pub async fn update_note(
    Path(note_id): Path<String>,
    State(state): State<AppState>,
    Auth(account): Auth,
    AppJson(request): AppJson<UpdateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    request.validate()?;
    let stored = NoteRepository::new(&state.store).update(&account.id, &note_id, request.into_patch())?;
    tracing::info!(account_id = %account.id, note_id = %stored.id, "Note updated");
    Ok(Json(Note::from_stored(stored, &account)))
}

#[utoipa::path(
    delete,
    path = "/notes/{note_id}",
    params(
        ("note_id" = String, Path, description = "Identifier of the note to delete")
    ),
    tag = "Notes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = DeleteNoteResponse),
        (status = 404, description = "Note not found")
    )
)]
pub async fn delete_note(
    Path(note_id): Path<String>,
    State(state): State<AppState>,
    Auth(account): Auth,
) -> Result<Json<DeleteNoteResponse>, ApiError> {
    NoteRepository::new(&state.store).delete(&account.id, &note_id)?;
    tracing::info!(account_id = %account.id, note_id = %note_id, "Note deleted");
    Ok(Json(DeleteNoteResponse {
        message: "Note deleted".to_string(),
        id: note_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Registration, SessionTokens};
    use crate::storage::{Account, Datastore};
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, AppState, Account, Account) {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(Datastore::open(&temp.path().join("notes.redb")).unwrap());
        let tokens = SessionTokens::new(b"notes-handler-secret-0123456789abc", chrono::Duration::minutes(30));
        let state = AppState::new(store, tokens);

        let mut accounts = Vec::new();
        for (username, password) in [("alice", "secret1"), ("bob", "secret2")] {
            let account = state
                .auth
                .register(Registration {
                    username: username.to_string(),
                    email: None,
                    password: password.to_string(),
                })
                .await
                .unwrap();
            accounts.push(account);
        }
        let bob = accounts.pop().unwrap();
        let alice = accounts.pop().unwrap();
        (temp, state, alice, bob)
    }

    fn new_note(title: &str, body: &str) -> CreateNoteRequest {
        CreateNoteRequest {
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn create_note_sets_owner_from_account() {
        let (_temp, state, alice, _bob) = setup().await;

        let (status, Json(note)) = create_note(
            State(state.clone()),
            Auth(alice.clone()),
            AppJson(new_note("Groceries", "milk")),
        )
        .await
        .expect("note creation succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(note.owner_id, alice.id);
        assert_eq!(note.owner, "alice");
        assert_eq!(note.created_at, note.updated_at);
    }

    #[tokio::test]
    async fn create_note_rejects_blank_title() {
        let (_temp, state, alice, _bob) = setup().await;

        let err = create_note(State(state), Auth(alice), AppJson(new_note(" ", "x")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn other_accounts_notes_are_not_found() {
        let (_temp, state, alice, bob) = setup().await;
        let (_, Json(note)) = create_note(
            State(state.clone()),
            Auth(alice.clone()),
            AppJson(new_note("Private", "")),
        )
        .await
        .unwrap();

        let err = get_note(Path(note.id.clone()), State(state.clone()), Auth(bob.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = update_note(
            Path(note.id.clone()),
            State(state.clone()),
            Auth(bob.clone()),
            AppJson(UpdateNoteRequest {
                title: Some("hijacked".to_string()),
                body: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = delete_note(Path(note.id.clone()), State(state.clone()), Auth(bob.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let Json(bob_notes) = list_notes(State(state.clone()), Auth(bob)).await.unwrap();
        assert!(bob_notes.is_empty());

        let Json(unchanged) = get_note(Path(note.id), State(state), Auth(alice)).await.unwrap();
        assert_eq!(unchanged.title, "Private");
    }

    #[tokio::test]
    async fn patch_and_put_update_fields() {
        let (_temp, state, alice, _bob) = setup().await;
        let (_, Json(note)) = create_note(
            State(state.clone()),
            Auth(alice.clone()),
            AppJson(new_note("Draft", "first body")),
        )
        .await
        .unwrap();

        let Json(patched) = update_note(
            Path(note.id.clone()),
            State(state.clone()),
            Auth(alice.clone()),
            AppJson(UpdateNoteRequest {
                title: Some("Final".to_string()),
                body: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(patched.title, "Final");
        assert_eq!(patched.body, "first body");
        assert!(patched.updated_at >= note.updated_at);

        let Json(replaced) = replace_note(
            Path(note.id.clone()),
            State(state.clone()),
            Auth(alice.clone()),
            AppJson(new_note("Rewritten", "")),
        )
        .await
        .unwrap();
        assert_eq!(replaced.title, "Rewritten");
        assert_eq!(replaced.body, "");
        assert_eq!(replaced.created_at, note.created_at);

        let err = update_note(
            Path(note.id),
            State(state),
            Auth(alice),
            AppJson(UpdateNoteRequest::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn delete_note_is_permanent() {
        let (_temp, state, alice, _bob) = setup().await;
        let (_, Json(note)) = create_note(
            State(state.clone()),
            Auth(alice.clone()),
            AppJson(new_note("Temp", "")),
        )
        .await
        .unwrap();

        let Json(response) = delete_note(Path(note.id.clone()), State(state.clone()), Auth(alice.clone()))
            .await
            .unwrap();
        assert_eq!(response.id, note.id);

        let err = get_note(Path(note.id.clone()), State(state.clone()), Auth(alice.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = delete_note(Path(note.id), State(state), Auth(alice))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let (_temp, state, alice, _bob) = setup().await;

        let err = get_note(Path("not-a-uuid".to_string()), State(state), Auth(alice))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
