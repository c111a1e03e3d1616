// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Notes Server - Account-scoped notes backend
//!
//! This crate provides a small HTTP service where users register password
//! accounts, obtain bearer session tokens and manage notes that only they
//! can see.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Accounts, password hashing and session tokens (HS256 JWT)
//! - `config` - Environment-driven runtime configuration
//! - `storage` - Embedded document store (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
