// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Cross-encoder reranking provider

pub mod cross_encoder;

pub use cross_encoder::OnnxCrossEncoder;

use anyhow::Result;
use async_trait::async_trait;
use std::cmp::Ordering;

/// Scores (query, candidate) pairs jointly
///
/// Implementations return one score per candidate with the same index
/// correspondence as the input. Higher means more relevant.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Relevance of every candidate to `query`
    async fn score(&self, query: &str, candidates: &[String]) -> Result<Vec<f32>>;

    /// Model identifier reported by `/health`
    fn model_name(&self) -> &str;
}

/// Indices of the `top_k` best scores, best first
///
/// The sort is stable, so equal scores keep their input order.
pub fn top_k_indices(scores: &[f32], top_k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));
    indices.truncate(top_k);
    indices
}
