// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{Authenticator, SessionTokens};
use crate::storage::Datastore;

/// Shared state handed to every handler.
///
/// The datastore is opened once at startup and shared by reference.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Datastore>,
    pub auth: Authenticator,
}

impl AppState {
    pub fn new(store: Arc<Datastore>, tokens: SessionTokens) -> Self {
        Self {
            auth: Authenticator::new(store.clone(), tokens),
            store,
        }
    }
}
