// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search API endpoint handler

use axum::{extract::State, Json};
use tracing::{debug, error};

use super::request::SearchRequest;
use super::response::{SearchResponse, SearchResult};
use crate::api::http_server::AppState;
use crate::api::{ApiError, ApiJson};

/// POST /search - Semantic search in the document collection
///
/// # Request
/// - `query`: Search text
/// - `top_k`: Maximum results (default 10, at least 1)
///
/// # Response
/// - `results`: `{id, text, score, metadata}` by descending score, where
///   `score = 1 - cosine distance`
///
/// # Errors
/// - 422 for `top_k < 1`
/// - 500 if embedding or the store query fails
pub async fn search_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let top_k = request.validate()?;

    let result: Result<Vec<SearchResult>, ApiError> = async {
        let collection = state.collection().await?;
        let query_embedding = state.embedder.embed(&request.query).await?;
        let hits = collection.query(&query_embedding, top_k).await?;
        Ok(hits.into_iter().map(SearchResult::from).collect())
    }
    .await;

    match result {
        Ok(results) => {
            debug!("Search for {:?} returned {} results", request.query, results.len());
            Ok(Json(SearchResponse { results }))
        }
        Err(e) => {
            error!("Search error: {}", e);
            Err(e)
        }
    }
}
