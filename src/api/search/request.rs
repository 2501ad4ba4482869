// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search API request types

use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::config::DEFAULT_SEARCH_TOP_K;

/// Request body for POST /search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query
    pub query: String,

    /// Maximum number of results (default 10)
    #[serde(default = "default_top_k")]
    pub top_k: i64,
}

fn default_top_k() -> i64 {
    DEFAULT_SEARCH_TOP_K as i64
}

impl SearchRequest {
    /// Validate the request and return the result limit
    pub fn validate(&self) -> Result<usize, ApiError> {
        validate_top_k(self.top_k)
    }
}

/// `top_k` must be a positive integer
pub(crate) fn validate_top_k(top_k: i64) -> Result<usize, ApiError> {
    if top_k < 1 {
        return Err(ApiError::validation(
            "top_k",
            format!("top_k must be at least 1, got {}", top_k),
        ));
    }
    Ok(top_k as usize)
}
