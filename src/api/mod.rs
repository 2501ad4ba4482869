// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cluster;
pub mod documents;
pub mod embed;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod http_server;
pub mod rerank;
pub mod search;

pub use cluster::{cluster_handler, ClusterRequest, ClusterResponse};
pub use documents::{
    AddDocumentsRequest, CountResponse, DeleteDocumentsRequest, DocumentInput, MutationResponse,
};
pub use embed::{embed_handler, EmbedRequest, EmbedResponse};
pub use errors::{ApiError, ErrorResponse};
pub use extract::ApiJson;
pub use handlers::{HealthResponse, RootResponse};
pub use http_server::{create_app, start_server, AppState};
pub use rerank::{rerank_handler, RerankCandidate, RerankRequest, RerankResponse};
pub use search::{search_handler, SearchRequest, SearchResponse, SearchResult};
