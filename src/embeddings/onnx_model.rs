// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! Runs the all-MiniLM-L6-v2 sentence transformer through ONNX Runtime.
//!
//! Pipeline (identical to the sentence-transformers reference):
//! - WordPiece tokenization, truncated to 256 tokens
//! - Token-level embeddings from the ONNX graph
//! - Attention-mask weighted mean pooling
//! - L2 normalization
//! - 384-dimensional output vectors

use anyhow::{Context, Result};
use async_trait::async_trait;
use ndarray::{Axis, Ix2};
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::info;

use super::pooling::{l2_normalize, mean_pool};
use super::TextEmbedder;
use crate::config::{EMBEDDING_BATCH_SIZE, EMBEDDING_DIMENSION, EMBEDDING_MAX_LENGTH};
use crate::onnx::{load_session, load_tokenizer, BatchInputs};

/// ONNX-based embedding model (all-MiniLM-L6-v2)
///
/// # Thread Safety
/// All fields are wrapped in Arc for cheap cloning; the ONNX session sits
/// behind a mutex because `Session::run` needs exclusive access.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    dimension: usize,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Creates a new ONNX embedding model from disk paths
    ///
    /// # Errors
    /// Returns error if:
    /// - Model or tokenizer file not found or invalid
    /// - ONNX Runtime initialization fails
    /// - Model doesn't output 384 dimensions
    ///
    /// # Example
    /// ```ignore
    /// let model = OnnxEmbeddingModel::new(
    ///     "all-MiniLM-L6-v2",
    ///     "./models/all-MiniLM-L6-v2/model.onnx",
    ///     "./models/all-MiniLM-L6-v2/tokenizer.json",
    /// ).await?;
    /// ```
    pub async fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref().to_path_buf();
        let tokenizer_path = tokenizer_path.as_ref().to_path_buf();

        info!("Initializing ONNX embedding model {}", model_name);

        let (session, tokenizer) = tokio::task::spawn_blocking(move || -> Result<_> {
            let session = load_session(&model_path)?;
            let tokenizer = load_tokenizer(&tokenizer_path, EMBEDDING_MAX_LENGTH)?;
            Ok((session, tokenizer))
        })
        .await
        .context("Model loading task panicked")??;

        let model = Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension: EMBEDDING_DIMENSION,
        };

        // Validate the output width with a probe inference
        let probe = model.run_batch(&["validation test".to_string()])?;
        if probe.first().map(Vec::len) != Some(EMBEDDING_DIMENSION) {
            anyhow::bail!(
                "Model outputs unexpected dimensions: {:?} (expected {})",
                probe.first().map(Vec::len),
                EMBEDDING_DIMENSION
            );
        }

        info!("ONNX embedding model {} loaded", model.model_name);
        Ok(model)
    }

    /// Runs one inference call over `texts` (no chunking)
    fn run_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(text.as_str(), true)
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let inputs = BatchInputs::from_encodings(&encodings)?;
        let seq_len = inputs.seq_len();
        let masks: Vec<i64> = inputs.attention_mask.iter().copied().collect();

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Embedding session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => Value::from_array(inputs.input_ids)?,
            "attention_mask" => Value::from_array(inputs.attention_mask)?,
            "token_type_ids" => Value::from_array(inputs.token_type_ids)?
        ])?;

        // Use index [0] instead of name since exports differ in output naming
        let output_array = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        // Token-level embeddings: [batch, seq_len, hidden_dim]
        if output_array.ndim() != 3 {
            anyhow::bail!(
                "Model outputs unexpected shape: {:?} (expected [batch, seq_len, hidden])",
                output_array.shape()
            );
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch_idx in 0..texts.len() {
            let item = output_array
                .index_axis(Axis(0), batch_idx)
                .into_dimensionality::<Ix2>()
                .context("Failed to view token embeddings")?;
            let mask = &masks[batch_idx * seq_len..(batch_idx + 1) * seq_len];

            let mut pooled = mean_pool(item, mask);
            l2_normalize(&mut pooled);

            if pooled.len() != self.dimension {
                anyhow::bail!(
                    "Unexpected embedding dimension at index {}: {} (expected {})",
                    batch_idx,
                    pooled.len(),
                    self.dimension
                );
            }
            embeddings.push(pooled);
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl TextEmbedder for OnnxEmbeddingModel {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(EMBEDDING_BATCH_SIZE) {
            let model = self.clone();
            let chunk = chunk.to_vec();
            let vectors = tokio::task::spawn_blocking(move || model.run_batch(&chunk))
                .await
                .context("Embedding task panicked")??;
            embeddings.extend(vectors);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
