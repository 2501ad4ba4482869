// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed: sentence embeddings for a batch of texts

pub mod handler;
pub mod request;
pub mod response;

pub use handler::embed_handler;
pub use request::EmbedRequest;
pub use response::EmbedResponse;
