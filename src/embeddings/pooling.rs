// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Token → sentence pooling helpers

use ndarray::ArrayView2;

/// Attention-mask weighted mean over the sequence axis
///
/// `token_embeddings` is `[seq_len, hidden_dim]`, `mask` holds one entry per
/// token (1 for real tokens, 0 for padding).
pub fn mean_pool(token_embeddings: ArrayView2<'_, f32>, mask: &[i64]) -> Vec<f32> {
    let seq_len = token_embeddings.shape()[0].min(mask.len());
    let hidden_dim = token_embeddings.shape()[1];

    let mut pooled = vec![0.0f32; hidden_dim];
    let mut sum_mask = 0.0f32;

    for i in 0..seq_len {
        let mask_value = mask[i] as f32;
        if mask_value == 0.0 {
            continue;
        }
        sum_mask += mask_value;
        for (j, value) in pooled.iter_mut().enumerate() {
            *value += token_embeddings[[i, j]] * mask_value;
        }
    }

    // Avoid division by zero
    let denominator = sum_mask.max(1e-9);
    for value in &mut pooled {
        *value /= denominator;
    }

    pooled
}

/// Scales `vector` to unit L2 norm in place; zero vectors are left as-is
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
