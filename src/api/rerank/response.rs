// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

use crate::api::search::SearchResult;

/// Response body for POST /rerank, best candidate first
///
/// `score` is the raw cross-encoder logit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RerankResponse {
    pub results: Vec<SearchResult>,
}
