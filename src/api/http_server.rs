// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::cluster::cluster_handler;
use super::documents::{add_documents_handler, count_documents_handler, delete_documents_handler};
use super::embed::embed_handler;
use super::handlers::{health_handler, not_found_handler, root_handler};
use super::rerank::rerank_handler;
use super::search::search_handler;
use super::ApiError;
use crate::config::{COLLECTION_NAME, DEFAULT_MAX_BODY_BYTES};
use crate::embeddings::TextEmbedder;
use crate::rerank::Reranker;
use crate::vector::{Collection, VectorStore};

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub embedder: Arc<dyn TextEmbedder>,
    pub reranker: Arc<dyn Reranker>,
    pub store: Arc<VectorStore>,
    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        reranker: Arc<dyn Reranker>,
        store: Arc<VectorStore>,
    ) -> Self {
        Self {
            embedder,
            reranker,
            store,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// The collection every document endpoint operates on
    pub async fn collection(&self) -> Result<Arc<Collection>, ApiError> {
        Ok(self.store.get_or_create_collection(COLLECTION_NAME).await?)
    }
}

/// Builds the router with all endpoints, permissive CORS and request tracing
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/embed", post(embed_handler))
        .route("/documents/add", post(add_documents_handler))
        .route("/documents", delete(delete_documents_handler))
        .route("/documents/count", get(count_documents_handler))
        .route("/search", post(search_handler))
        .route("/rerank", post(rerank_handler))
        .route("/cluster", post(cluster_handler))
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API on `addr` until Ctrl-C
pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
