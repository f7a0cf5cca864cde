// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use std::cmp::Ordering;

/// Score given to stored vectors whose similarity is undefined.
pub const DEGENERATE_SCORE: f32 = -1.0;

/// Products and sums are taken in `f64`, so squares of very small or very
/// large `f32` components neither flush to zero nor overflow.
pub fn dot_product_scalar(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

pub fn magnitude(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt()
}

/// Cosine similarity against a query whose magnitude is already known.
///
/// A zero-magnitude `vector` has no direction, so it gets
/// [`DEGENERATE_SCORE`] instead of NaN. The same applies to NaN results
/// produced by non-finite components.
pub fn cosine_similarity_with_norm(query: &[f32], query_norm: f64, vector: &[f32]) -> f32 {
    let norm = magnitude(vector);
    if norm == 0.0 {
        return DEGENERATE_SCORE;
    }
    let score = (dot_product_scalar(query, vector) / (query_norm * norm)) as f32;
    if score.is_nan() {
        DEGENERATE_SCORE
    } else {
        score
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = magnitude(a);
    if norm_a == 0.0 {
        return DEGENERATE_SCORE;
    }
    cosine_similarity_with_norm(a, norm_a, b)
}

/// Descending by score, then ascending by position.
fn rank_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Positions and scores of the `k` best entries, best first.
///
/// Equal scores keep insertion order, so the result is fully determined by
/// `scores` and `k`.
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let k = k.min(scores.len());
    if k == 0 {
        return Vec::new();
    }

    let mut indexed_scores: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();

    if k < indexed_scores.len() {
        indexed_scores.select_nth_unstable_by(k - 1, rank_order);
        indexed_scores.truncate(k);
    }
    indexed_scores.sort_unstable_by(rank_order);
    indexed_scores
}
