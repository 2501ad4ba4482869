// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service configuration
//!
//! Only the listen address, the request body cap, the vector store location
//! and an optional local model directory are configurable. Model identities, the collection name
//! and the clustering parameters are fixed in [`constants`].

pub mod constants;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub use constants::*;

/// Runtime configuration for the ML service
///
/// Every option can be given on the command line or through the
/// environment (a `.env` file is loaded before parsing).
#[derive(Parser, Debug, Clone)]
#[command(name = "rag-ml-service")]
#[command(version)]
#[command(about = "Embedding, reranking, clustering and vector search over HTTP", long_about = None)]
pub struct ServiceConfig {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Largest accepted request body in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Directory holding the persisted vector store
    #[arg(long, env = DATA_PATH_ENV, default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Directory with pre-downloaded ONNX models (`<model>/model.onnx` and
    /// `<model>/tokenizer.json`). Falls back to the Hugging Face Hub cache.
    #[arg(long, env = "MODELS_DIR")]
    pub models_dir: Option<PathBuf>,
}

impl ServiceConfig {
    /// Socket address the HTTP server binds to
    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", addr, e))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            models_dir: None,
        }
    }
}
