// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Locating ONNX model files on disk
//!
//! A model is looked up in the local models directory first
//! (`<models_dir>/<name>/model.onnx` + `tokenizer.json`). When no local copy
//! exists the files are fetched through the Hugging Face Hub cache, which
//! makes subsequent starts offline-safe.

use anyhow::{Context, Result};
use hf_hub::api::tokio::Api;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{
    EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_REPO, ONNX_MODEL_FILE, RERANK_MODEL_NAME,
    RERANK_MODEL_REPO, TOKENIZER_FILE,
};

/// Identity of a pretrained model on the Hugging Face Hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Short name, also the local directory name
    pub name: &'static str,
    /// Hub repository id
    pub repo_id: &'static str,
    /// ONNX graph path inside the repository
    pub onnx_file: &'static str,
    /// Tokenizer path inside the repository
    pub tokenizer_file: &'static str,
}

impl ModelSpec {
    /// all-MiniLM-L6-v2 sentence embedding model
    pub const fn embedding() -> Self {
        Self {
            name: EMBEDDING_MODEL_NAME,
            repo_id: EMBEDDING_MODEL_REPO,
            onnx_file: ONNX_MODEL_FILE,
            tokenizer_file: TOKENIZER_FILE,
        }
    }

    /// ms-marco-MiniLM-L-6-v2 cross-encoder
    pub const fn reranker() -> Self {
        Self {
            name: RERANK_MODEL_NAME,
            repo_id: RERANK_MODEL_REPO,
            onnx_file: ONNX_MODEL_FILE,
            tokenizer_file: TOKENIZER_FILE,
        }
    }

    fn local_files(&self, models_dir: &Path) -> ModelFiles {
        let dir = models_dir.join(self.name);
        ModelFiles {
            model_path: dir.join("model.onnx"),
            tokenizer_path: dir.join("tokenizer.json"),
        }
    }
}

/// Paths to the files needed to run a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

impl ModelFiles {
    /// Both files are present on disk
    pub fn exist(&self) -> bool {
        self.model_path.is_file() && self.tokenizer_path.is_file()
    }
}

/// Resolves the model and tokenizer files for `spec`
///
/// Local files under `models_dir` win; otherwise both files are downloaded
/// into (or served from) the Hugging Face Hub cache.
pub async fn resolve_model_files(spec: &ModelSpec, models_dir: Option<&Path>) -> Result<ModelFiles> {
    if let Some(dir) = models_dir {
        let local = spec.local_files(dir);
        if local.exist() {
            info!("Using local model files for {} from {}", spec.name, dir.display());
            return Ok(local);
        }
        info!(
            "No local copy of {} in {}, falling back to the Hugging Face Hub",
            spec.name,
            dir.display()
        );
    }

    let api = Api::new().context("Failed to initialise Hugging Face Hub client")?;
    let repo = api.model(spec.repo_id.to_string());

    info!("Fetching {} ({})", spec.name, spec.repo_id);
    let model_path = repo
        .get(spec.onnx_file)
        .await
        .with_context(|| format!("Failed to fetch {}/{}", spec.repo_id, spec.onnx_file))?;
    let tokenizer_path = repo
        .get(spec.tokenizer_file)
        .await
        .with_context(|| format!("Failed to fetch {}/{}", spec.repo_id, spec.tokenizer_file))?;

    Ok(ModelFiles {
        model_path,
        tokenizer_path,
    })
}
