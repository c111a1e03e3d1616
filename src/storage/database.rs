// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded document datastore backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `accounts`: account_id → serialized Account (JSON bytes)
//! - `account_usernames`: normalized username → account_id
//! - `account_emails`: normalized email → account_id
//! - `notes`: note_id → serialized StoredNote (JSON bytes)
//! - `owner_notes`: composite key (owner_id|created_at_be|note_id) → note_id
//!
//! Every repository operation runs inside a single redb transaction. Write
//! transactions are serialized by redb, which gives each document the
//! atomic read-modify-write the repositories rely on.

use std::path::Path;

use redb::{Database, ReadableDatabase, TableDefinition};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: account_id → serialized Account (JSON bytes).
pub(crate) const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

/// Unique index: normalized username → account_id.
pub(crate) const ACCOUNT_USERNAMES: TableDefinition<&str, &str> =
    TableDefinition::new("account_usernames");

/// Unique index: normalized email → account_id.
pub(crate) const ACCOUNT_EMAILS: TableDefinition<&str, &str> =
    TableDefinition::new("account_emails");

/// Primary table: note_id → serialized StoredNote (JSON bytes).
pub(crate) const NOTES: TableDefinition<&str, &[u8]> = TableDefinition::new("notes");

/// Index: composite key → note_id.
/// Key format: `owner_id|created_at_be|note_id` for creation-ordered scans.
pub(crate) const OWNER_NOTES: TableDefinition<&[u8], &str> = TableDefinition::new("owner_notes");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for the owner_notes table.
///
/// Format: `owner_id | created_at_micros_be | note_id`
///
/// Big-endian timestamps make a forward scan return notes in creation order.
pub(crate) fn owner_note_key(owner_id: &str, created_at_micros: i64, note_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(owner_id.len() + 1 + 8 + 1 + note_id.len());
    key.extend_from_slice(owner_id.as_bytes());
    key.push(b'|');
    key.extend_from_slice(&(created_at_micros.max(0) as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(note_id.as_bytes());
    key
}

/// Inclusive lower bound for scanning one owner's notes.
pub(crate) fn owner_prefix(owner_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(owner_id.len() + 1);
    prefix.extend_from_slice(owner_id.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Exclusive upper bound for scanning one owner's notes.
///
/// `}` sorts directly after `|`, and owner ids never contain `|`.
pub(crate) fn owner_prefix_end(owner_id: &str) -> Vec<u8> {
    let mut end = Vec::with_capacity(owner_id.len() + 1);
    end.extend_from_slice(owner_id.as_bytes());
    end.push(b'}');
    end
}

// =============================================================================
// Datastore
// =============================================================================

/// Handle to the embedded document datastore.
///
/// Opened once at process start and shared through `AppState`.
pub struct Datastore {
    db: Database,
}

impl Datastore {
    /// Open (or create) the datastore at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(ACCOUNT_USERNAMES)?;
            let _ = write_txn.open_table(ACCOUNT_EMAILS)?;
            let _ = write_txn.open_table(NOTES)?;
            let _ = write_txn.open_table(OWNER_NOTES)?;
        }
        write_txn.commit()?;

        tracing::debug!(path = %path.display(), "Datastore opened");
        Ok(Self { db })
    }

    pub(crate) fn db(&self) -> &Database {
        &self.db
    }

    /// Check that every table can be opened for reading.
    pub fn health_check(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(ACCOUNTS)?;
        let _ = read_txn.open_table(ACCOUNT_USERNAMES)?;
        let _ = read_txn.open_table(ACCOUNT_EMAILS)?;
        let _ = read_txn.open_table(NOTES)?;
        let _ = read_txn.open_table(OWNER_NOTES)?;
        Ok(())
    }

    /// Release the datastore. Pending writes are already durable on commit.
    pub fn close(self) {
        drop(self.db);
        tracing::info!("Datastore closed");
    }
}

// =============================================================================
// Tests
// =============================================================================
