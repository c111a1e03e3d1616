// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account repository (the credential store).
//!
//! Accounts are written once at registration and never mutated. Usernames
//! and emails are kept unique through index tables that are checked and
//! written in the same transaction as the account document.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use crate::storage::database::{ACCOUNTS, ACCOUNT_EMAILS, ACCOUNT_USERNAMES};
use crate::storage::{Datastore, StorageError, StorageResult};

/// Account document as stored in the datastore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// Unique account identifier (UUID), assigned at registration
    pub id: String,
    /// Normalized username (unique)
    pub username: String,
    /// Normalized email (unique when present)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Argon2id PHC string; never the plaintext
    pub password_hash: String,
    /// When the account was registered
    pub created_at: DateTime<Utc>,
}

/// Repository for account operations.
pub struct AccountRepository<'a> {
    store: &'a Datastore,
}

impl<'a> AccountRepository<'a> {
    /// Create a new AccountRepository.
    pub fn new(store: &'a Datastore) -> Self {
        Self { store }
    }

    /// Insert a new account.
    ///
    /// Fails with `StorageError::AlreadyExists` if the username or email is
    /// already registered. The uniqueness check and the insert share one
    /// write transaction.
    pub fn create(&self, account: &Account) -> StorageResult<()> {
        let json = serde_json::to_vec(account)?;

        let write_txn = self.store.db().begin_write()?;
        {
            let mut usernames = write_txn.open_table(ACCOUNT_USERNAMES)?;
            if usernames.get(account.username.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "username {}",
                    account.username
                )));
            }

            let mut emails = write_txn.open_table(ACCOUNT_EMAILS)?;
            if let Some(email) = &account.email {
                if emails.get(email.as_str())?.is_some() {
                    return Err(StorageError::AlreadyExists(format!("email {email}")));
                }
                emails.insert(email.as_str(), account.id.as_str())?;
            }

            usernames.insert(account.username.as_str(), account.id.as_str())?;

            let mut accounts = write_txn.open_table(ACCOUNTS)?;
            accounts.insert(account.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up an account by ID.
    #[cfg(test)]
    pub fn get(&self, account_id: &str) -> StorageResult<Option<Account>> {
        let read_txn = self.store.db().begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        match table.get(account_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up an account by normalized username.
    pub fn find_by_username(&self, username: &str) -> StorageResult<Option<Account>> {
        self.find_via_index(ACCOUNT_USERNAMES, username)
    }

    /// Look up an account by normalized email.
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<Account>> {
        self.find_via_index(ACCOUNT_EMAILS, email)
    }

    /// Whether a username or email is already taken.
    pub fn is_taken(&self, username: &str, email: Option<&str>) -> StorageResult<bool> {
        if self.find_by_username(username)?.is_some() {
            return Ok(true);
        }
        match email {
            Some(email) => Ok(self.find_by_email(email)?.is_some()),
            None => Ok(false),
        }
    }

    fn find_via_index(
        &self,
        index: redb::TableDefinition<&str, &str>,
        key: &str,
    ) -> StorageResult<Option<Account>> {
        let read_txn = self.store.db().begin_read()?;
        let index_table = read_txn.open_table(index)?;
        let account_id = match index_table.get(key)? {
            Some(id) => id.value().to_string(),
            None => return Ok(None),
        };

        let accounts = read_txn.open_table(ACCOUNTS)?;
        match accounts.get(account_id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => {
                tracing::warn!(account_id = %account_id, "Account index points at a missing account");
                Ok(None)
            }
        }
    }
}
