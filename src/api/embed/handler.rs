// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed HTTP handler

use axum::extract::State;
use axum::Json;
use tracing::error;

use crate::api::embed::{EmbedRequest, EmbedResponse};
use crate::api::http_server::AppState;
use crate::api::{ApiError, ApiJson};

/// POST /embed handler
///
/// Runs the embedding model over `texts` and returns the vectors in
/// request order.
pub async fn embed_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EmbedRequest>,
) -> Result<Json<EmbedResponse>, ApiError> {
    request.validate()?;

    let embeddings = state.embedder.embed_batch(&request.texts).await.map_err(|e| {
        error!("Embedding error: {:#}", e);
        ApiError::from(e)
    })?;

    Ok(Json(EmbedResponse { embeddings }))
}
