// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::types::VectorId;
use crate::core::vector_ops::{cosine_similarity_with_norm, magnitude, top_k};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Invalid dimension {0}: must be a positive integer")]
    InvalidDimension(usize),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Append-only dense storage of fixed-width `f32` rows.
///
/// Rows live back to back in one buffer; row `i` is the vector with id `i`.
/// The buffer grows by doubling, so single appends are amortized O(1).
#[derive(Debug, Clone, PartialEq)]
pub struct VectorStore {
    dimension: usize,
    count: usize,
    data: Vec<f32>,
}

impl VectorStore {
    pub fn new(dimension: usize) -> Result<Self, StoreError> {
        Self::with_capacity(dimension, 0)
    }

    pub fn with_capacity(dimension: usize, capacity: usize) -> Result<Self, StoreError> {
        if dimension == 0 {
            return Err(StoreError::InvalidDimension(dimension));
        }
        Ok(Self {
            dimension,
            count: 0,
            data: Vec::with_capacity(capacity * dimension),
        })
    }

    /// Rebuild a store from a row-major buffer of `data.len() / dimension` rows.
    pub fn from_flat(dimension: usize, data: Vec<f32>) -> Result<Self, StoreError> {
        if dimension == 0 {
            return Err(StoreError::InvalidDimension(dimension));
        }
        if data.len() % dimension != 0 {
            return Err(StoreError::DimensionMismatch {
                expected: dimension,
                actual: data.len() % dimension,
            });
        }
        Ok(Self {
            dimension,
            count: data.len() / dimension,
            data,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn next_id(&self) -> VectorId {
        VectorId::new(self.count)
    }

    pub fn get(&self, id: VectorId) -> Option<&[f32]> {
        if id.index() >= self.count {
            return None;
        }
        let start = id.index() * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.dimension)
    }

    /// Row-major view of every stored component.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    fn check_dimension(&self, actual: usize) -> Result<(), StoreError> {
        if actual != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual,
            });
        }
        Ok(())
    }

    pub fn add(&mut self, vector: &[f32]) -> Result<VectorId, StoreError> {
        self.check_dimension(vector.len())?;

        let id = self.next_id();
        self.data.extend_from_slice(vector);
        self.count += 1;
        Ok(id)
    }

    /// Append a batch, growing the buffer at most once.
    ///
    /// Every vector is validated before anything is written, so a mismatch
    /// anywhere in the batch leaves the store untouched.
    pub fn add_many<V: AsRef<[f32]>>(&mut self, vectors: &[V]) -> Result<Vec<VectorId>, StoreError> {
        for vector in vectors {
            self.check_dimension(vector.as_ref().len())?;
        }

        let start = self.count;
        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector.as_ref());
        }
        self.count += vectors.len();

        Ok((start..self.count).map(VectorId::new).collect())
    }

    /// Exhaustive cosine-similarity scan returning the `k` best rows.
    ///
    /// An empty store or a zero-magnitude query yields no results rather than
    /// an error. Rows with zero magnitude score `-1.0`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(VectorId, f32)>, StoreError> {
        self.check_dimension(query.len())?;

        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_norm = magnitude(query);
        if query_norm == 0.0 {
            warn!("Query vector has zero magnitude, returning no results");
            return Ok(Vec::new());
        }

        let scores: Vec<f32> = self
            .iter()
            .map(|row| cosine_similarity_with_norm(query, query_norm, row))
            .collect();

        Ok(top_k(&scores, k)
            .into_iter()
            .map(|(index, score)| (VectorId::new(index), score))
            .collect())
    }
}
