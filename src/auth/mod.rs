// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Password accounts and stateless bearer sessions for the notes API.
//!
//! ## Auth Flow
//!
//! 1. Client registers with a username (and optional email) and password
//! 2. Server stores an Argon2id hash and returns a session token
//! 3. Client logs in later via `/login` (JSON) or `/token` (OAuth2 form)
//! 4. Client sends `Authorization: Bearer <token>` on every notes request
//! 5. Server:
//!    - Verifies the HS256 signature and `exp`
//!    - Resolves `sub` (the username) to an account in the credential store
//!
//! ## Security
//!
//! - Plaintext passwords are never stored or logged
//! - Tokens are not persisted and cannot be revoked; they expire on their own
//! - There is no clock skew tolerance: a token is rejected once `exp` passes

pub mod claims;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod password;
pub mod service;
pub mod tokens;

pub use claims::{IssuedToken, SessionClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use service::{Authenticator, Registration};
pub use tokens::SessionTokens;
