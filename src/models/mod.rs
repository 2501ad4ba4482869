// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model file resolution for the embedding and reranking models

pub mod downloading;

pub use downloading::{resolve_model_files, ModelFiles, ModelSpec};
