// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

use crate::vector::Metadata;

/// One document of an add request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Request body for POST /documents/add
///
/// # Example
/// ```json
/// {
///   "documents": [
///     { "id": "a1", "text": "Markets rallied today", "metadata": { "source": "wire" } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddDocumentsRequest {
    pub documents: Vec<DocumentInput>,
}

/// Request body for DELETE /documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDocumentsRequest {
    pub ids: Vec<String>,
}
