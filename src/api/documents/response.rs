// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

/// Response of add and delete: `{"status": "success", "count": n}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationResponse {
    pub status: String,
    pub count: usize,
}

impl MutationResponse {
    pub fn success(count: usize) -> Self {
        Self {
            status: "success".to_string(),
            count,
        }
    }
}

/// Response of GET /documents/count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountResponse {
    pub count: usize,
}
