// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedRequest type for POST /embed

use crate::api::ApiError;
use serde::{Deserialize, Serialize};

/// Request body for POST /embed
///
/// # Example
/// ```json
/// { "texts": ["Hello world", "Another text"] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// Texts to embed, at least one
    pub texts: Vec<String>,
}

impl EmbedRequest {
    /// Rejects an empty `texts` list
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.texts.is_empty() {
            return Err(ApiError::validation(
                "texts",
                "texts array must contain at least 1 item",
            ));
        }
        Ok(())
    }
}
