// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Note repository (the notes component).
//!
//! Every operation takes the caller's account id and compares it to the
//! stored `owner_id` inside the transaction that reads or writes the note.
//! A note owned by another account behaves exactly like a missing note.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use crate::storage::database::{owner_note_key, owner_prefix, owner_prefix_end, NOTES, OWNER_NOTES};
use crate::storage::ownership::{scope_to_owner, OwnedResource};
use crate::storage::{Datastore, StorageResult};

/// Note document as stored in the datastore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredNote {
    /// Unique note identifier (UUID)
    pub id: String,
    /// Account ID of the owner; fixed at creation
    pub owner_id: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for StoredNote {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

/// Fields for a new note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub body: String,
}

/// Partial update. Only `Some` fields are applied; ownership is not part
/// of the patch.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }

    fn apply(self, note: &mut StoredNote) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(body) = self.body {
            note.body = body;
        }
    }
}

/// Repository for owner-scoped note operations.
pub struct NoteRepository<'a> {
    store: &'a Datastore,
}

impl<'a> NoteRepository<'a> {
    /// Create a new NoteRepository.
    pub fn new(store: &'a Datastore) -> Self {
        Self { store }
    }

    /// Create a note owned by `owner_id` with a fresh id.
    pub fn create(&self, owner_id: &str, note: NewNote) -> StorageResult<StoredNote> {
        let now = Utc::now();
        let stored = StoredNote {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title: note.title,
            body: note.body,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_vec(&stored)?;
        let index_key = owner_note_key(owner_id, now.timestamp_micros(), &stored.id);

        let write_txn = self.store.db().begin_write()?;
        {
            let mut notes = write_txn.open_table(NOTES)?;
            notes.insert(stored.id.as_str(), json.as_slice())?;

            let mut index = write_txn.open_table(OWNER_NOTES)?;
            index.insert(index_key.as_slice(), stored.id.as_str())?;
        }
        write_txn.commit()?;

        Ok(stored)
    }

    /// All notes owned by `owner_id`, in creation order.
    pub fn list_by_owner(&self, owner_id: &str) -> StorageResult<Vec<StoredNote>> {
        let read_txn = self.store.db().begin_read()?;
        let index = read_txn.open_table(OWNER_NOTES)?;
        let notes = read_txn.open_table(NOTES)?;

        let start = owner_prefix(owner_id);
        let end = owner_prefix_end(owner_id);

        let mut results = Vec::new();
        for entry in index.range(start.as_slice()..end.as_slice())? {
            let (_, note_id) = entry?;
            if let Some(value) = notes.get(note_id.value())? {
                let note: StoredNote = serde_json::from_slice(value.value())?;
                if note.is_owned_by(owner_id) {
                    results.push(note);
                }
            }
        }

        Ok(results)
    }

    /// Get one note, scoped to its owner.
    pub fn get(&self, owner_id: &str, note_id: &str) -> StorageResult<StoredNote> {
        let read_txn = self.store.db().begin_read()?;
        let notes = read_txn.open_table(NOTES)?;

        let loaded = match notes.get(note_id)? {
            Some(value) => Some(serde_json::from_slice::<StoredNote>(value.value())?),
            None => None,
        };

        scope_to_owner(loaded, owner_id, &format!("note {note_id}"))
    }

    /// Apply a partial update to a note, scoped to its owner.
    ///
    /// The owner check, the merge and the write happen in one write
    /// transaction; there is no window between check and write.
    pub fn update(
        &self,
        owner_id: &str,
        note_id: &str,
        patch: NotePatch,
    ) -> StorageResult<StoredNote> {
        let write_txn = self.store.db().begin_write()?;
        let updated = {
            let mut notes = write_txn.open_table(NOTES)?;

            let existing_bytes = {
                let existing = notes.get(note_id)?;
                existing.map(|value| value.value().to_vec())
            };
            let loaded = match existing_bytes {
                Some(bytes) => Some(serde_json::from_slice::<StoredNote>(&bytes)?),
                None => None,
            };

            let mut note = scope_to_owner(loaded, owner_id, &format!("note {note_id}"))?;
            patch.apply(&mut note);
            note.updated_at = Utc::now();

            let json = serde_json::to_vec(&note)?;
            notes.insert(note_id, json.as_slice())?;
            note
        };
        write_txn.commit()?;

        Ok(updated)
    }

    /// Delete a note, scoped to its owner. Deletion is permanent.
    pub fn delete(&self, owner_id: &str, note_id: &str) -> StorageResult<()> {
        let write_txn = self.store.db().begin_write()?;
        {
            let mut notes = write_txn.open_table(NOTES)?;

            let existing_bytes = {
                let existing = notes.get(note_id)?;
                existing.map(|value| value.value().to_vec())
            };
            let loaded = match existing_bytes {
                Some(bytes) => Some(serde_json::from_slice::<StoredNote>(&bytes)?),
                None => None,
            };

            let note = scope_to_owner(loaded, owner_id, &format!("note {note_id}"))?;
            notes.remove(note_id)?;

            let mut index = write_txn.open_table(OWNER_NOTES)?;
            let index_key =
                owner_note_key(&note.owner_id, note.created_at.timestamp_micros(), &note.id);
            index.remove(index_key.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
