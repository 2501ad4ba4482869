// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

use crate::api::search::request::validate_top_k;
use crate::api::ApiError;
use crate::config::DEFAULT_RERANK_TOP_K;
use crate::vector::Metadata;

/// A passage to score against the query
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankCandidate {
    /// Reported as the candidate's input index when absent
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Request body for POST /rerank
///
/// # Example
/// ```json
/// {
///   "query": "central bank rates",
///   "documents": [{ "id": "a", "text": "The central bank raised rates" }],
///   "top_k": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankRequest {
    pub query: String,
    pub documents: Vec<RerankCandidate>,
    #[serde(default = "default_top_k")]
    pub top_k: i64,
}

fn default_top_k() -> i64 {
    DEFAULT_RERANK_TOP_K as i64
}

impl RerankRequest {
    /// Validate the request and return the result limit
    pub fn validate(&self) -> Result<usize, ApiError> {
        validate_top_k(self.top_k)
    }
}
