// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service-level handlers: banner, health and the JSON 404 fallback

use axum::extract::State;
use axum::http::Uri;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::http_server::AppState;
use super::ApiError;
use crate::version::{SERVICE_NAME, VERSION};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootResponse {
    pub service: String,
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub embedding_model: String,
    pub rerank_model: String,
    /// Documents in the default collection
    pub chromadb_documents: usize,
}

/// GET /
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        service: SERVICE_NAME.to_string(),
        status: "running".to_string(),
        version: VERSION.to_string(),
    })
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let collection = state.collection().await.map_err(|e| {
        error!("Health check error: {}", e);
        e
    })?;
    let count = collection.count().await.map_err(|e| {
        error!("Health check error: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        embedding_model: state.embedder.model_name().to_string(),
        rerank_model: state.reranker.model_name().to_string(),
        chromadb_documents: count,
    }))
}

/// Fallback for unknown routes
pub async fn not_found_handler(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
