// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vector storage: SQLite-backed collections with exact cosine search

pub mod store;

pub use store::{
    Collection, DocumentRecord, Metadata, QueryMatch, StoreError, StoredDocument, VectorStore,
};
