// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Deterministic stand-ins for the ONNX models plus request helpers
//!
//! - `HashingEmbedder`: bag-of-words hashed into a small unit vector, so
//!   texts sharing words are close in cosine distance
//! - `OverlapReranker`: scores a candidate by how many query words it contains
//! - `FailingEmbedder` / `FailingReranker`: always error

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rag_ml_service::api::{create_app, AppState};
use rag_ml_service::embeddings::TextEmbedder;
use rag_ml_service::rerank::Reranker;
use rag_ml_service::vector::VectorStore;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

pub const MOCK_DIMENSION: usize = 64;

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// FNV-1a, stable across runs
fn bucket(word: &str) -> usize {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in word.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    // Bucket 0 is reserved for the bias term
    1 + (hash as usize) % (MOCK_DIMENSION - 1)
}

pub struct HashingEmbedder;

impl HashingEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; MOCK_DIMENSION];
        vector[0] = 0.1;
        for word in words(text) {
            vector[bucket(&word)] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        vector.iter_mut().for_each(|v| *v /= norm);
        vector
    }
}

#[async_trait]
impl TextEmbedder for HashingEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        MOCK_DIMENSION
    }

    fn model_name(&self) -> &str {
        "all-MiniLM-L6-v2"
    }
}

pub struct OverlapReranker;

#[async_trait]
impl Reranker for OverlapReranker {
    async fn score(&self, query: &str, candidates: &[String]) -> Result<Vec<f32>> {
        let query_words = words(query);
        Ok(candidates
            .iter()
            .map(|candidate| {
                let candidate_words = words(candidate);
                query_words
                    .iter()
                    .filter(|w| candidate_words.contains(w))
                    .count() as f32
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "ms-marco-MiniLM-L-6-v2"
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl TextEmbedder for FailingEmbedder {
    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        anyhow::bail!("ONNX inference failed: simulated")
    }

    fn dimension(&self) -> usize {
        MOCK_DIMENSION
    }

    fn model_name(&self) -> &str {
        "all-MiniLM-L6-v2"
    }
}

pub struct FailingReranker;

#[async_trait]
impl Reranker for FailingReranker {
    async fn score(&self, _query: &str, _candidates: &[String]) -> Result<Vec<f32>> {
        anyhow::bail!("cross-encoder failed: simulated")
    }

    fn model_name(&self) -> &str {
        "ms-marco-MiniLM-L-6-v2"
    }
}

/// Test helper: state with the deterministic models and a store under `dir`
pub async fn setup_test_state(dir: &Path) -> AppState {
    let store = VectorStore::open(dir).await.expect("open store");
    AppState::new(
        Arc::new(HashingEmbedder),
        Arc::new(OverlapReranker),
        Arc::new(store),
    )
}

/// Test helper: router over [`setup_test_state`]
pub async fn setup_test_app(dir: &Path) -> Router {
    create_app(setup_test_state(dir).await)
}

/// Test helper: router whose models always fail
pub async fn setup_failing_app(dir: &Path) -> Router {
    let store = VectorStore::open(dir).await.expect("open store");
    create_app(AppState::new(
        Arc::new(FailingEmbedder),
        Arc::new(FailingReranker),
        Arc::new(store),
    ))
}

/// Sends one request and returns status and parsed JSON body
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&body_bytes).to_string())
        })
    };
    (status, json)
}

/// Sends a raw body with the given content type
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body_bytes).unwrap_or(Value::Null))
}
