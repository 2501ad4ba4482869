// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /rerank: cross-encoder reordering of candidate passages

pub mod handler;
pub mod request;
pub mod response;

pub use handler::rerank_handler;
pub use request::{RerankCandidate, RerankRequest};
pub use response::RerankResponse;
