// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership scoping for stored documents.
//!
//! Every note read or write passes the caller's account id down to the
//! repository, and the owner comparison happens inside the same datastore
//! transaction that loads the document. A document owned by someone else
//! is reported exactly like a missing one.

use super::{StorageError, StorageResult};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Get the owner's account ID.
    fn owner_id(&self) -> &str;

    /// Whether the given account owns this resource.
    fn is_owned_by(&self, account_id: &str) -> bool {
        self.owner_id() == account_id
    }
}

/// Narrow a loaded document to the requesting owner.
///
/// Returns `StorageError::NotFound` both when the document is absent and
/// when it belongs to another account.
pub fn scope_to_owner<T: OwnedResource>(
    resource: Option<T>,
    account_id: &str,
    what: &str,
) -> StorageResult<T> {
    match resource {
        Some(resource) if resource.is_owned_by(account_id) => Ok(resource),
        _ => Err(StorageError::NotFound(what.to_string())),
    }
}
