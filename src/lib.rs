// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod clustering;
pub mod config;
pub mod embeddings;
pub mod models;
pub mod onnx;
pub mod rerank;
pub mod vector;
pub mod version;

pub use api::{create_app, AppState};
pub use clustering::{cluster_texts, ClusteringOutcome};
pub use config::ServiceConfig;
pub use embeddings::TextEmbedder;
pub use rerank::Reranker;
pub use vector::{Collection, VectorStore};
