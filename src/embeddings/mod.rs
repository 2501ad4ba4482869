// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Sentence embedding provider
//!
//! [`TextEmbedder`] is the seam the API layer depends on;
//! [`OnnxEmbeddingModel`] is the production implementation running
//! all-MiniLM-L6-v2 through ONNX Runtime.

pub mod onnx_model;
pub mod pooling;

pub use onnx_model::OnnxEmbeddingModel;

use anyhow::Result;
use async_trait::async_trait;

/// Stateless texts → vectors function
///
/// Implementations return exactly one vector per input text, in input
/// order, each of length [`TextEmbedder::dimension`].
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embeds every text in `texts`
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embeds a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Embedding model returned no vector"))
    }

    /// Output dimension
    fn dimension(&self) -> usize;

    /// Model identifier reported by `/health`
    fn model_name(&self) -> &str;
}
