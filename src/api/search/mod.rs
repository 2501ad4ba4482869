// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /search: semantic search over the document collection

pub mod handler;
pub mod request;
pub mod response;

pub use handler::search_handler;
pub use request::SearchRequest;
pub use response::{SearchResponse, SearchResult};
