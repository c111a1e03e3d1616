// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Document Storage Module
//!
//! This module provides persistent storage for accounts and notes on top of
//! an embedded **redb** database. The database file lives under the
//! configured data directory and is opened exactly once at startup.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/notes.redb
//!   accounts            account_id -> Account (JSON)
//!   account_usernames   username   -> account_id
//!   account_emails      email      -> account_id
//!   notes               note_id    -> StoredNote (JSON)
//!   owner_notes         owner_id|created_at|note_id -> note_id
//! ```
//!
//! ## Important Notes
//!
//! - Each repository call is one redb transaction
//! - Note access is always scoped by owner inside that transaction
//! - There are no caches; the database is the single source of truth

pub mod database;
pub mod ownership;
pub mod repository;

pub use database::{Datastore, StorageError, StorageResult};
pub use ownership::OwnedResource;
pub use repository::{Account, AccountRepository, NewNote, NotePatch, NoteRepository, StoredNote};
