// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Runtime plumbing shared by the embedding model and the cross-encoder
//!
//! - Session creation with GPU support (CUDA first, CPU fallback)
//! - Tokenizer loading with a fixed truncation length
//! - Packing tokenizer encodings into padded `[batch, seq_len]` tensors

use anyhow::{Context, Result};
use ndarray::Array2;
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;
use tokenizers::{Encoding, Tokenizer, TruncationParams};
use tracing::{info, warn};

/// Loads an ONNX graph, preferring the CUDA execution provider
pub fn load_session(model_path: &Path) -> Result<Session> {
    if !model_path.exists() {
        anyhow::bail!("ONNX model file not found: {}", model_path.display());
    }

    info!("Attempting CUDA execution provider for {}", model_path.display());
    let cuda_result = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CUDAExecutionProvider::default().build()])
        .context("Failed to set CUDA execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(4)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path);

    match cuda_result {
        Ok(session) => {
            info!("CUDA execution provider initialized");
            Ok(session)
        }
        Err(e) => {
            warn!("CUDA execution provider failed: {}", e);
            warn!("Falling back to CPU execution provider");
            Session::builder()
                .context("Failed to create session builder")?
                .with_execution_providers([CPUExecutionProvider::default().build()])
                .context("Failed to set CPU execution provider")?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .context("Failed to set optimization level")?
                .with_intra_threads(4)
                .context("Failed to set intra threads")?
                .commit_from_file(model_path)
                .with_context(|| {
                    format!("Failed to load ONNX model from {}", model_path.display())
                })
        }
    }
}

/// Loads a tokenizer and pins its truncation length
///
/// Padding configured in the tokenizer file is disabled; batches are padded
/// by [`BatchInputs::from_encodings`] instead.
pub fn load_tokenizer(tokenizer_path: &Path, max_length: usize) -> Result<Tokenizer> {
    if !tokenizer_path.exists() {
        anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
    }

    let mut tokenizer = Tokenizer::from_file(tokenizer_path)
        .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;
    tokenizer.with_padding(None);

    Ok(tokenizer)
}

/// Padded model inputs for one batch
#[derive(Debug, Clone)]
pub struct BatchInputs {
    pub input_ids: Array2<i64>,
    pub attention_mask: Array2<i64>,
    pub token_type_ids: Array2<i64>,
}

impl BatchInputs {
    /// Packs encodings into `[batch, max_len]` tensors, right-padded with 0
    pub fn from_encodings(encodings: &[Encoding]) -> Result<Self> {
        let batch = encodings.len();
        let max_len = encodings
            .iter()
            .map(|enc| enc.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut input_ids = Vec::with_capacity(batch * max_len);
        let mut attention_mask = Vec::with_capacity(batch * max_len);
        let mut token_type_ids = Vec::with_capacity(batch * max_len);

        for encoding in encodings {
            let ids = encoding.get_ids();
            let padding = max_len - ids.len();

            input_ids.extend(ids.iter().map(|&id| id as i64));
            attention_mask.extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
            token_type_ids.extend(encoding.get_type_ids().iter().map(|&t| t as i64));

            input_ids.extend(std::iter::repeat(0i64).take(padding));
            attention_mask.extend(std::iter::repeat(0i64).take(padding));
            token_type_ids.extend(std::iter::repeat(0i64).take(padding));
        }

        Ok(Self {
            input_ids: Array2::from_shape_vec((batch, max_len), input_ids)
                .context("Failed to create batch input_ids array")?,
            attention_mask: Array2::from_shape_vec((batch, max_len), attention_mask)
                .context("Failed to create batch attention_mask array")?,
            token_type_ids: Array2::from_shape_vec((batch, max_len), token_type_ids)
                .context("Failed to create batch token_type_ids array")?,
        })
    }

    /// Padded sequence length
    pub fn seq_len(&self) -> usize {
        self.input_ids.ncols()
    }
}
