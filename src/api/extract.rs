// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Body extractors whose rejections render as `{"error": ...}`.

use axum::extract::{FromRequest, Form, Json};

use crate::error::ApiError;

/// `Json<T>` with `ApiError` rejections.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// `Form<T>` with `ApiError` rejections.
#[derive(FromRequest)]
#[from_request(via(Form), rejection(ApiError))]
pub struct AppForm<T>(pub T);
