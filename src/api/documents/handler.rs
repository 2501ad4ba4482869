// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Handlers for the document collection endpoints

use axum::extract::State;
use axum::Json;
use tracing::{error, info};

use crate::api::documents::{
    AddDocumentsRequest, CountResponse, DeleteDocumentsRequest, MutationResponse,
};
use crate::api::http_server::AppState;
use crate::api::{ApiError, ApiJson};
use crate::vector::DocumentRecord;

/// POST /documents/add handler
///
/// Embeds every document text and upserts the batch into the collection.
/// The whole batch fails if any step fails.
pub async fn add_documents_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddDocumentsRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    add_documents(&state, request).await.map(Json).map_err(|e| {
        error!("Add documents error: {}", e);
        e
    })
}

async fn add_documents(
    state: &AppState,
    request: AddDocumentsRequest,
) -> Result<MutationResponse, ApiError> {
    let collection = state.collection().await?;

    let texts: Vec<String> = request.documents.iter().map(|d| d.text.clone()).collect();
    let embeddings = state.embedder.embed_batch(&texts).await?;
    if embeddings.len() != request.documents.len() {
        return Err(ApiError::InternalError(format!(
            "Embedding model returned {} vectors for {} documents",
            embeddings.len(),
            request.documents.len()
        )));
    }

    let records: Vec<DocumentRecord> = request
        .documents
        .into_iter()
        .zip(embeddings)
        .map(|(doc, embedding)| DocumentRecord {
            id: doc.id,
            document: doc.text,
            embedding,
            metadata: doc.metadata,
        })
        .collect();

    let count = collection.add(records).await?;
    info!("Added {} documents to {}", count, collection.name());

    Ok(MutationResponse::success(count))
}

/// DELETE /documents handler
///
/// Ids that are not stored are ignored. The reported count is the number
/// of ids in the request.
pub async fn delete_documents_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DeleteDocumentsRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let result: Result<usize, ApiError> = async {
        let collection = state.collection().await?;
        let removed = collection.delete(&request.ids).await?;
        info!(
            "Deleted {} documents from {} ({} requested)",
            removed,
            collection.name(),
            request.ids.len()
        );
        Ok(removed)
    }
    .await;

    match result {
        Ok(_) => Ok(Json(MutationResponse::success(request.ids.len()))),
        Err(e) => {
            error!("Delete documents error: {}", e);
            Err(e)
        }
    }
}

/// GET /documents/count handler
pub async fn count_documents_handler(
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, ApiError> {
    let collection = state.collection().await.map_err(|e| {
        error!("Count documents error: {}", e);
        e
    })?;
    let count = collection.count().await.map_err(|e| {
        error!("Count documents error: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(CountResponse { count }))
}
