// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! K-Means clustering (Euclidean)
//!
//! # Algorithm Details
//! - Initialization: greedy k-means++ with `2 + ln(k)` local trials
//! - Lloyd iterations, at most 300
//! - Convergence: labels unchanged, or total squared centroid shift below
//!   `1e-4` times the mean per-feature variance
//! - Empty clusters take the points farthest from their current centroid
//!
//! A fixed seed gives reproducible labels for identical input.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::ClusteringError;

/// Maximum Lloyd iterations
const MAX_ITERATIONS: usize = 300;

/// Relative convergence tolerance
const TOLERANCE: f64 = 1e-4;

/// Result of a K-Means fit
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// `[k, n_features]`
    pub centroids: Array2<f64>,

    /// Cluster index for each input row
    pub labels: Vec<usize>,

    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,

    pub iterations: usize,
}

/// K-Means estimator
#[derive(Debug, Clone)]
pub struct KMeans {
    n_clusters: usize,
    seed: u64,
    max_iterations: usize,
}

impl KMeans {
    pub fn new(n_clusters: usize, seed: u64) -> Self {
        Self {
            n_clusters,
            seed,
            max_iterations: MAX_ITERATIONS,
        }
    }

    /// Clusters the rows of `data`
    ///
    /// # Errors
    ///
    /// `InvalidClusterCount` unless `1 <= k <= n_rows`.
    pub fn fit(&self, data: ArrayView2<f64>) -> Result<KMeansResult, ClusteringError> {
        let n_samples = data.nrows();
        let k = self.n_clusters;
        if k == 0 || k > n_samples {
            return Err(ClusteringError::InvalidClusterCount {
                requested: k,
                samples: n_samples,
            });
        }

        let tolerance = TOLERANCE * mean_variance(data);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = kmeans_plus_plus(data, k, &mut rng);

        let mut labels = vec![usize::MAX; n_samples];
        let mut strict_convergence = false;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            iterations += 1;

            let new_labels = assign(data, centroids.view());
            let mut new_centroids = update_centroids(data, &new_labels, k);
            let new_labels = relocate_empty_clusters(data, new_labels, &mut new_centroids, k);

            let shift: f64 = (&new_centroids - &centroids).mapv(|v| v * v).sum();
            centroids = new_centroids;

            if new_labels == labels {
                strict_convergence = true;
                labels = new_labels;
                break;
            }
            labels = new_labels;

            if shift <= tolerance {
                break;
            }
        }

        if !strict_convergence {
            // Labels must match the final centroids
            labels = assign(data, centroids.view());
        }

        let inertia = labels
            .iter()
            .enumerate()
            .map(|(i, &c)| squared_distance(data.row(i), centroids.row(c)))
            .sum();

        debug!(
            "K-Means converged in {} iterations (k={}, inertia={:.4})",
            iterations, k, inertia
        );

        Ok(KMeansResult {
            centroids,
            labels,
            inertia,
            iterations,
        })
    }
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Mean of the per-feature variances
fn mean_variance(data: ArrayView2<f64>) -> f64 {
    if data.ncols() == 0 {
        return 0.0;
    }
    data.var_axis(Axis(0), 0.0).mean().unwrap_or(0.0)
}

/// Greedy k-means++ seeding
fn kmeans_plus_plus(data: ArrayView2<f64>, k: usize, rng: &mut StdRng) -> Array2<f64> {
    let n_samples = data.nrows();
    let n_local_trials = 2 + (k as f64).ln().floor() as usize;
    let mut centroids = Array2::<f64>::zeros((k, data.ncols()));

    let first = rng.gen_range(0..n_samples);
    centroids.row_mut(0).assign(&data.row(first));

    let mut closest: Array1<f64> = data
        .rows()
        .into_iter()
        .map(|row| squared_distance(row, data.row(first)))
        .collect();
    let mut potential: f64 = closest.sum();

    for c in 1..k {
        let cumulative: Vec<f64> = closest
            .iter()
            .scan(0.0, |acc, &d| {
                *acc += d;
                Some(*acc)
            })
            .collect();

        let mut best: Option<(usize, f64, Array1<f64>)> = None;
        for _ in 0..n_local_trials {
            let target = rng.gen::<f64>() * potential;
            let candidate = cumulative
                .partition_point(|&v| v < target)
                .min(n_samples - 1);

            let distances: Array1<f64> = data
                .rows()
                .into_iter()
                .zip(closest.iter())
                .map(|(row, &current)| squared_distance(row, data.row(candidate)).min(current))
                .collect();
            let candidate_potential = distances.sum();

            if best
                .as_ref()
                .map_or(true, |(_, best_potential, _)| candidate_potential < *best_potential)
            {
                best = Some((candidate, candidate_potential, distances));
            }
        }

        if let Some((index, best_potential, distances)) = best {
            centroids.row_mut(c).assign(&data.row(index));
            potential = best_potential;
            closest = distances;
        }
    }

    centroids
}

/// Nearest centroid per row (lowest index wins ties)
fn assign(data: ArrayView2<f64>, centroids: ArrayView2<f64>) -> Vec<usize> {
    data.rows()
        .into_iter()
        .map(|row| {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (c, centroid) in centroids.rows().into_iter().enumerate() {
                let distance = squared_distance(row, centroid);
                if distance < best_distance {
                    best_distance = distance;
                    best = c;
                }
            }
            best
        })
        .collect()
}

/// Mean of each cluster's members; empty clusters stay at zero
fn update_centroids(data: ArrayView2<f64>, labels: &[usize], k: usize) -> Array2<f64> {
    let mut sums = Array2::<f64>::zeros((k, data.ncols()));
    let mut sizes = vec![0usize; k];

    for (row, &label) in data.rows().into_iter().zip(labels) {
        let mut sum = sums.row_mut(label);
        sum += &row;
        sizes[label] += 1;
    }

    for (c, &size) in sizes.iter().enumerate() {
        if size > 0 {
            let mut centroid = sums.row_mut(c);
            centroid /= size as f64;
        }
    }
    sums
}

/// Moves the farthest points into empty clusters and recomputes centroids
fn relocate_empty_clusters(
    data: ArrayView2<f64>,
    mut labels: Vec<usize>,
    centroids: &mut Array2<f64>,
    k: usize,
) -> Vec<usize> {
    let mut sizes = vec![0usize; k];
    for &label in &labels {
        sizes[label] += 1;
    }
    let empty: Vec<usize> = (0..k).filter(|&c| sizes[c] == 0).collect();
    if empty.is_empty() {
        return labels;
    }

    let mut by_distance: Vec<(usize, f64)> = labels
        .iter()
        .enumerate()
        .map(|(i, &c)| (i, squared_distance(data.row(i), centroids.row(c))))
        .collect();
    by_distance.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut candidates = by_distance.into_iter().map(|(i, _)| i);
    for cluster in empty {
        // Never empty a cluster to fill another
        if let Some(point) = candidates.by_ref().find(|&i| sizes[labels[i]] > 1) {
            sizes[labels[point]] -= 1;
            sizes[cluster] += 1;
            labels[point] = cluster;
        }
    }

    *centroids = update_centroids(data, &labels, k);
    labels
}
