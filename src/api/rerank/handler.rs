// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /rerank HTTP handler

use axum::extract::State;
use axum::Json;
use tracing::{debug, error};

use crate::api::http_server::AppState;
use crate::api::rerank::{RerankRequest, RerankResponse};
use crate::api::search::SearchResult;
use crate::api::{ApiError, ApiJson};
use crate::rerank::top_k_indices;

/// POST /rerank handler
///
/// Scores every candidate against the query and returns the `top_k` best,
/// highest score first. Equal scores keep their request order.
pub async fn rerank_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RerankRequest>,
) -> Result<Json<RerankResponse>, ApiError> {
    let top_k = request.validate()?;

    if request.documents.is_empty() {
        return Ok(Json(RerankResponse { results: vec![] }));
    }

    let texts: Vec<String> = request.documents.iter().map(|d| d.text.clone()).collect();
    let scores = state
        .reranker
        .score(&request.query, &texts)
        .await
        .map_err(|e| {
            error!("Rerank error: {:#}", e);
            ApiError::from(e)
        })?;

    if scores.len() != request.documents.len() {
        let e = ApiError::InternalError(format!(
            "Reranker returned {} scores for {} candidates",
            scores.len(),
            request.documents.len()
        ));
        error!("Rerank error: {}", e);
        return Err(e);
    }

    let mut candidates: Vec<Option<_>> = request.documents.into_iter().map(Some).collect();
    let results: Vec<SearchResult> = top_k_indices(&scores, top_k)
        .into_iter()
        .filter_map(|idx| {
            candidates[idx].take().map(|doc| SearchResult {
                id: doc.id.unwrap_or_else(|| idx.to_string()),
                text: doc.text,
                score: scores[idx],
                metadata: doc.metadata.unwrap_or_default(),
            })
        })
        .collect();

    debug!("Reranked {} candidates, returning {}", texts.len(), results.len());
    Ok(Json(RerankResponse { results }))
}
