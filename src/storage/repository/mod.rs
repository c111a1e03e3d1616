// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the datastore.
//!
//! Each repository borrows the shared `Datastore` and exposes the
//! operations for one document type.

pub mod accounts;
pub mod notes;

pub use accounts::{Account, AccountRepository};
pub use notes::{NewNote, NotePatch, NoteRepository, StoredNote};
