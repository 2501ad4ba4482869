// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedResponse type for POST /embed

use serde::{Deserialize, Serialize};

/// Response body for POST /embed
///
/// One vector per input text, in input order.
///
/// # Example
/// ```json
/// { "embeddings": [[0.012, -0.034, ...], [0.051, 0.007, ...]] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
}
