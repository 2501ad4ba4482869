// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::config::DEFAULT_N_CLUSTERS;

/// Request body for POST /cluster
///
/// A cluster count larger than the number of texts is reduced rather than
/// rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterRequest {
    pub texts: Vec<String>,
    #[serde(default = "default_n_clusters")]
    pub n_clusters: i64,
}

fn default_n_clusters() -> i64 {
    DEFAULT_N_CLUSTERS as i64
}

impl ClusterRequest {
    /// Validate the request and return the requested cluster count
    pub fn validate(&self) -> Result<usize, ApiError> {
        if self.n_clusters < 1 {
            return Err(ApiError::validation(
                "n_clusters",
                format!("n_clusters must be at least 1, got {}", self.n_clusters),
            ));
        }
        Ok(self.n_clusters as usize)
    }
}
