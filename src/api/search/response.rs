// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search API response types

use serde::{Deserialize, Serialize};

use crate::vector::{Metadata, QueryMatch};

/// One scored document
///
/// Shared by `/search` and `/rerank`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub text: String,
    pub score: f32,
    pub metadata: Metadata,
}

impl From<QueryMatch> for SearchResult {
    /// Cosine distance becomes similarity (`1 - distance`)
    fn from(hit: QueryMatch) -> Self {
        Self {
            id: hit.id,
            text: hit.document,
            score: 1.0 - hit.distance,
            metadata: hit.metadata,
        }
    }
}

/// Response body for POST /search, best match first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}
