// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use rag_ml_service::{
    api::{start_server, AppState},
    config::{ServiceConfig, COLLECTION_NAME},
    embeddings::OnnxEmbeddingModel,
    models::{resolve_model_files, ModelSpec},
    rerank::OnnxCrossEncoder,
    vector::VectorStore,
};
use std::{env, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::parse();

    println!("Starting {}...\n", rag_ml_service::version::version_banner());

    println!("Loading embedding model...");
    let embedding_spec = ModelSpec::embedding();
    let embedding_files = resolve_model_files(&embedding_spec, config.models_dir.as_deref())
        .await
        .with_context(|| format!("Failed to locate {} model files", embedding_spec.name))?;
    let embedder = OnnxEmbeddingModel::new(
        embedding_spec.name,
        &embedding_files.model_path,
        &embedding_files.tokenizer_path,
    )
    .await
    .context("Failed to load embedding model")?;

    println!("Loading reranking model...");
    let rerank_spec = ModelSpec::reranker();
    let rerank_files = resolve_model_files(&rerank_spec, config.models_dir.as_deref())
        .await
        .with_context(|| format!("Failed to locate {} model files", rerank_spec.name))?;
    let reranker = OnnxCrossEncoder::new(
        rerank_spec.name,
        &rerank_files.model_path,
        &rerank_files.tokenizer_path,
    )
    .await
    .context("Failed to load reranking model")?;

    println!("Opening vector store...");
    let store = VectorStore::open(&config.data_path)
        .await
        .with_context(|| format!("Failed to open vector store at {}", config.data_path.display()))?;
    let collection = store
        .get_or_create_collection(COLLECTION_NAME)
        .await
        .with_context(|| format!("Failed to open collection {}", COLLECTION_NAME))?;
    let count = collection
        .count()
        .await
        .context("Failed to count stored documents")?;
    info!("Using collection {} ({} documents)", collection.name(), count);

    let state = AppState::new(Arc::new(embedder), Arc::new(reranker), Arc::new(store))
        .with_body_limit(config.max_body_bytes);
    let addr = config.listen_addr()?;

    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("{} is running", rag_ml_service::version::SERVICE_NAME);
    println!("{}", separator);
    println!("  Root:         GET    http://{}/", addr);
    println!("  Health:       GET    http://{}/health", addr);
    println!("  Embed:        POST   http://{}/embed", addr);
    println!("  Add docs:     POST   http://{}/documents/add", addr);
    println!("  Delete docs:  DELETE http://{}/documents", addr);
    println!("  Count docs:   GET    http://{}/documents/count", addr);
    println!("  Search:       POST   http://{}/search", addr);
    println!("  Rerank:       POST   http://{}/rerank", addr);
    println!("  Cluster:      POST   http://{}/cluster", addr);
    println!("\nPress Ctrl+C to shutdown...");
    println!("{}\n", separator);

    start_server(addr, state).await?;

    println!("Goodbye!");
    Ok(())
}
