// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration, login and token authentication.

use std::sync::Arc;

use chrono::Utc;

use super::claims::IssuedToken;
use super::identity::{self, Identity};
use super::password;
use super::tokens::SessionTokens;
use super::AuthError;
use crate::storage::{Account, AccountRepository, Datastore, StorageError};

/// Input for `Authenticator::register`.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

/// The auth component: credential store access plus token handling.
///
/// Cheap to clone; the datastore and keys are shared.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<Datastore>,
    tokens: Arc<SessionTokens>,
}

impl Authenticator {
    pub fn new(store: Arc<Datastore>, tokens: SessionTokens) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
        }
    }

    /// Token signer/verifier.
    pub fn tokens(&self) -> &SessionTokens {
        &self.tokens
    }

    /// Create an account.
    ///
    /// Fails with `IdentityTaken` if the username or email already exists.
    /// Only the Argon2id hash of the password is stored.
    pub async fn register(&self, registration: Registration) -> Result<Account, AuthError> {
        let username = identity::normalize_username(&registration.username)?;
        let email = registration
            .email
            .as_deref()
            .map(identity::normalize_email)
            .transpose()?;
        identity::validate_secret(&registration.password)?;

        // Fail fast before paying for a hash; `create` re-checks atomically
        let repo = AccountRepository::new(&self.store);
        if repo.is_taken(&username, email.as_deref())? {
            return Err(AuthError::IdentityTaken(describe_identity(&username, email.as_deref())));
        }

        let secret = registration.password;
        let password_hash = run_blocking(move || password::hash_password(&secret)).await?;

        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            created_at: Utc::now(),
        };

        repo.create(&account).map_err(|e| match e {
            StorageError::AlreadyExists(what) => AuthError::IdentityTaken(what),
            other => AuthError::Storage(other),
        })?;

        tracing::info!(account_id = %account.id, username = %account.username, "Account registered");
        Ok(account)
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown identity and wrong secret are indistinguishable to the caller.
    pub async fn login(&self, identity: &str, secret: &str) -> Result<(Account, IssuedToken), AuthError> {
        let account = self.find_account(identity)?;

        let secret = secret.to_string();
        let verified = match &account {
            Some(account) => {
                let stored_hash = account.password_hash.clone();
                run_blocking(move || password::verify_password(&secret, &stored_hash)).await?
            }
            None => {
                // Spend the same work as a real verification
                run_blocking(move || password::hash_password(&secret)).await?;
                false
            }
        };

        let account = match (account, verified) {
            (Some(account), true) => account,
            _ => {
                tracing::warn!("Login rejected: invalid credentials");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(&account.username)?;
        tracing::info!(
            account_id = %account.id,
            expires_at = ?token.claims.expires_at(),
            "Login succeeded"
        );
        Ok((account, token))
    }

    /// Issue a token for an account that was just registered.
    pub fn issue_for(&self, account: &Account) -> Result<IssuedToken, AuthError> {
        self.tokens.issue(&account.username)
    }

    /// Resolve a bearer token to the account it names.
    ///
    /// Fails if the token is malformed, badly signed or expired, or if the
    /// subject no longer exists in the credential store.
    pub fn authenticate(&self, token: &str) -> Result<Account, AuthError> {
        let claims = self.tokens.verify(token)?;

        AccountRepository::new(&self.store)
            .find_by_username(&claims.sub)?
            .ok_or_else(|| {
                tracing::warn!("Token subject does not resolve to an account");
                AuthError::UnknownAccount
            })
    }

    fn find_account(&self, raw_identity: &str) -> Result<Option<Account>, AuthError> {
        let repo = AccountRepository::new(&self.store);
        let account = match identity::parse_identity(raw_identity) {
            Identity::Username(username) => repo.find_by_username(&username)?,
            Identity::Email(email) => repo.find_by_email(&email)?,
        };
        Ok(account)
    }
}

fn describe_identity(username: &str, email: Option<&str>) -> String {
    match email {
        Some(email) => format!("username {username} or email {email}"),
        None => format!("username {username}"),
    }
}

/// Run CPU-heavy password work on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::InternalError(format!("password task failed: {e}")))?
}
