// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Topic clustering of short texts
//!
//! Texts are vectorized with TF-IDF, grouped with K-Means, and each cluster
//! is summarized by the heaviest terms of its centroid.
//!
//! ```rust,ignore
//! let outcome = cluster_texts(&texts, 3)?;
//! for cluster in &outcome.clusters {
//!     println!("{}: {:?} ({})", cluster.cluster_id, cluster.keywords, cluster.count);
//! }
//! ```

pub mod kmeans;
pub mod stop_words;
pub mod tfidf;

pub use kmeans::{KMeans, KMeansResult};
pub use tfidf::{TfidfMatrix, TfidfVectorizer};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::config::{KEYWORDS_PER_CLUSTER, KMEANS_RANDOM_STATE, TFIDF_MAX_FEATURES, TOP_KEYWORDS};

/// Errors raised by the clustering pipeline
#[derive(Debug, Error)]
pub enum ClusteringError {
    #[error("Empty vocabulary; perhaps the documents only contain stop words")]
    EmptyVocabulary,

    #[error("n_clusters={requested} must be between 1 and the number of samples ({samples})")]
    InvalidClusterCount { requested: usize, samples: usize },
}

/// Summary of one cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_id: usize,
    /// Heaviest centroid terms, heaviest first
    pub keywords: Vec<String>,
    /// Number of texts assigned to the cluster
    pub count: usize,
}

/// Output of [`cluster_texts`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringOutcome {
    pub clusters: Vec<ClusterSummary>,
    pub top_keywords: Vec<String>,
}

/// Cluster count actually used for `n_texts` texts
///
/// A request for more clusters than texts falls back to half the texts
/// (at least one).
pub fn effective_cluster_count(requested: usize, n_texts: usize) -> usize {
    if n_texts < requested {
        (n_texts / 2).max(1)
    } else {
        requested
    }
}

/// Clusters `texts` into (at most) `n_clusters` groups
pub fn cluster_texts(texts: &[String], n_clusters: usize) -> Result<ClusteringOutcome, ClusteringError> {
    let k = effective_cluster_count(n_clusters, texts.len());

    let matrix = TfidfVectorizer::new(TFIDF_MAX_FEATURES).fit_transform(texts)?;
    let fit = KMeans::new(k, KMEANS_RANDOM_STATE).fit(matrix.weights.view())?;

    let mut counts = vec![0usize; k];
    for &label in &fit.labels {
        counts[label] += 1;
    }

    let clusters: Vec<ClusterSummary> = fit
        .centroids
        .rows()
        .into_iter()
        .enumerate()
        .map(|(cluster_id, centroid)| {
            let weights: Vec<f64> = centroid.to_vec();
            let keywords = top_feature_indices(&weights, KEYWORDS_PER_CLUSTER)
                .into_iter()
                .map(|j| matrix.vocabulary[j].clone())
                .collect();
            ClusterSummary {
                cluster_id,
                keywords,
                count: counts[cluster_id],
            }
        })
        .collect();

    let top_keywords = most_common(
        clusters.iter().flat_map(|c| c.keywords.iter().map(String::as_str)),
        TOP_KEYWORDS,
    );

    debug!(
        "Clustered {} texts into {} clusters ({} features)",
        texts.len(),
        k,
        matrix.vocabulary.len()
    );

    Ok(ClusteringOutcome {
        clusters,
        top_keywords,
    })
}

/// Indices of the `n` largest weights, largest first
///
/// Among equal weights the higher index comes first.
fn top_feature_indices(weights: &[f64], n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| {
        weights[a]
            .partial_cmp(&weights[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order.into_iter().rev().take(n).collect()
}

/// The `n` most frequent items, ties in first-seen order
fn most_common<'a>(items: impl Iterator<Item = &'a str>, n: usize) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, item) in items.enumerate() {
        counts.entry(item).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(item, (count, first_seen))| (item, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.into_iter().take(n).map(|(item, _, _)| item.to_string()).collect()
}
