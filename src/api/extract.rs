// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! JSON body extractor whose rejections use the service error format

use axum::extract::FromRequest;

use super::ApiError;

/// Like [`axum::Json`], but malformed bodies are rejected with an
/// [`ApiError`] (400 for unparseable JSON, 422 for schema mismatches)
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
