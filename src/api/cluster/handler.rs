// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /cluster HTTP handler

use axum::Json;
use tracing::{error, info};

use crate::api::cluster::{ClusterRequest, ClusterResponse};
use crate::api::{ApiError, ApiJson};
use crate::clustering::cluster_texts;

/// POST /cluster handler
///
/// TF-IDF and K-Means run on the blocking pool.
pub async fn cluster_handler(
    ApiJson(request): ApiJson<ClusterRequest>,
) -> Result<Json<ClusterResponse>, ApiError> {
    let n_clusters = request.validate()?;
    let n_texts = request.texts.len();

    let outcome = tokio::task::spawn_blocking(move || cluster_texts(&request.texts, n_clusters))
        .await
        .map_err(|e| ApiError::InternalError(format!("Clustering task failed: {}", e)))
        .and_then(|result| result.map_err(ApiError::from));

    match outcome {
        Ok(outcome) => {
            info!(
                "Clustered {} texts into {} clusters",
                n_texts,
                outcome.clusters.len()
            );
            Ok(Json(outcome))
        }
        Err(e) => {
            error!("Clustering error: {}", e);
            Err(e)
        }
    }
}
