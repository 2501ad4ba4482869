// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Fixed service parameters

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Environment variable selecting the vector store directory
pub const DATA_PATH_ENV: &str = "VECTOR_DB_PATH";

/// Default vector store directory
pub const DEFAULT_DATA_PATH: &str = "./vector_db";

/// Default cap on request body size (64 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Hugging Face repository of the sentence embedding model
pub const EMBEDDING_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Short name reported by `/health`
pub const EMBEDDING_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Output dimension of all-MiniLM-L6-v2
pub const EMBEDDING_DIMENSION: usize = 384;

/// Maximum tokens per text fed to the embedding model
pub const EMBEDDING_MAX_LENGTH: usize = 256;

/// Texts per ONNX inference call
pub const EMBEDDING_BATCH_SIZE: usize = 32;

/// Hugging Face repository of the cross-encoder
pub const RERANK_MODEL_REPO: &str = "cross-encoder/ms-marco-MiniLM-L-6-v2";

/// Short name reported by `/health`
pub const RERANK_MODEL_NAME: &str = "ms-marco-MiniLM-L-6-v2";

/// Maximum tokens per (query, passage) pair
pub const RERANK_MAX_LENGTH: usize = 512;

/// (query, passage) pairs per ONNX inference call
pub const RERANK_BATCH_SIZE: usize = 32;

/// Path of the ONNX graph inside both model repositories
pub const ONNX_MODEL_FILE: &str = "onnx/model.onnx";

/// Tokenizer file inside both model repositories
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// The single collection the API operates on
pub const COLLECTION_NAME: &str = "news_articles";

/// Default result count for `/search`
pub const DEFAULT_SEARCH_TOP_K: usize = 10;

/// Default result count for `/rerank`
pub const DEFAULT_RERANK_TOP_K: usize = 5;

/// Default cluster count for `/cluster`
pub const DEFAULT_N_CLUSTERS: usize = 10;

/// TF-IDF vocabulary bound
pub const TFIDF_MAX_FEATURES: usize = 100;

/// K-Means seed, fixed for reproducible clusters
pub const KMEANS_RANDOM_STATE: u64 = 42;

/// Keywords extracted per cluster centroid
pub const KEYWORDS_PER_CLUSTER: usize = 5;

/// Size of the global keyword summary
pub const TOP_KEYWORDS: usize = 10;
