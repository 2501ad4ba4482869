// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /cluster: topic clusters and keywords for a batch of texts

pub mod handler;
pub mod request;

pub use handler::cluster_handler;
pub use request::ClusterRequest;

/// Response body for POST /cluster
pub type ClusterResponse = crate::clustering::ClusteringOutcome;
