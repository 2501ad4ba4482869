// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX cross-encoder (ms-marco-MiniLM-L-6-v2)
//!
//! Each (query, passage) pair is tokenized as one sequence pair
//! (`[CLS] query [SEP] passage [SEP]`, segment ids 0/1) and the single
//! output logit is used as the relevance score.

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{EncodeInput, Tokenizer};
use tracing::info;

use super::Reranker;
use crate::config::{RERANK_BATCH_SIZE, RERANK_MAX_LENGTH};
use crate::onnx::{load_session, load_tokenizer, BatchInputs};

/// Cross-encoder relevance model backed by ONNX Runtime
#[derive(Clone)]
pub struct OnnxCrossEncoder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
}

impl std::fmt::Debug for OnnxCrossEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxCrossEncoder")
            .field("model_name", &self.model_name)
            .finish_non_exhaustive()
    }
}

impl OnnxCrossEncoder {
    /// Loads the cross-encoder graph and tokenizer
    pub async fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref().to_path_buf();
        let tokenizer_path = tokenizer_path.as_ref().to_path_buf();

        info!("Initializing ONNX cross-encoder {}", model_name);

        let (session, tokenizer) = tokio::task::spawn_blocking(move || -> Result<_> {
            let session = load_session(&model_path)?;
            let tokenizer = load_tokenizer(&tokenizer_path, RERANK_MAX_LENGTH)?;
            Ok((session, tokenizer))
        })
        .await
        .context("Model loading task panicked")??;

        let model = Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
        };

        // One logit per pair is expected
        let probe = model.run_batch("validation", &["test passage".to_string()])?;
        if probe.len() != 1 {
            anyhow::bail!("Cross-encoder returned {} scores for 1 pair", probe.len());
        }

        info!("ONNX cross-encoder {} loaded", model.model_name);
        Ok(model)
    }

    fn run_batch(&self, query: &str, candidates: &[String]) -> Result<Vec<f32>> {
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let pairs: Vec<EncodeInput> = candidates
            .iter()
            .map(|candidate| (query, candidate.as_str()).into())
            .collect();
        let encodings = self
            .tokenizer
            .encode_batch(pairs, true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let inputs = BatchInputs::from_encodings(&encodings)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Cross-encoder session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => Value::from_array(inputs.input_ids)?,
            "attention_mask" => Value::from_array(inputs.attention_mask)?,
            "token_type_ids" => Value::from_array(inputs.token_type_ids)?
        ])?;

        // Logits: [batch, 1]
        let logits = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract logits tensor")?;
        let shape = logits.shape().to_vec();
        if shape.first() != Some(&candidates.len()) || logits.len() != candidates.len() {
            anyhow::bail!(
                "Cross-encoder output has shape {:?}, expected [{}, 1]",
                shape,
                candidates.len()
            );
        }

        Ok(logits.iter().copied().collect())
    }
}

#[async_trait]
impl Reranker for OnnxCrossEncoder {
    async fn score(&self, query: &str, candidates: &[String]) -> Result<Vec<f32>> {
        let mut scores = Vec::with_capacity(candidates.len());

        for chunk in candidates.chunks(RERANK_BATCH_SIZE) {
            let model = self.clone();
            let query = query.to_string();
            let chunk = chunk.to_vec();
            let chunk_scores = tokio::task::spawn_blocking(move || model.run_batch(&query, &chunk))
                .await
                .context("Rerank task panicked")??;
            scores.extend(chunk_scores);
        }

        Ok(scores)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
