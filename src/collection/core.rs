// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::metadata_filter::MetadataFilter;
use crate::core::types::{empty_metadata, Metadata, SearchResult, VectorId};
use crate::store::{MetadataTable, StoreError, VectorStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Candidates scanned per filtered search unless configured otherwise.
pub const DEFAULT_FILTER_CANDIDATES: usize = 1000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CollectionError {
    #[error("Invalid dimension {0}: must be a positive integer")]
    InvalidDimension(usize),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Length mismatch: {vectors} vectors but {metadata} metadata records")]
    LengthMismatch { vectors: usize, metadata: usize },
}

impl From<StoreError> for CollectionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidDimension(dimension) => CollectionError::InvalidDimension(dimension),
            StoreError::DimensionMismatch { expected, actual } => {
                CollectionError::DimensionMismatch { expected, actual }
            }
        }
    }
}

/// How many ranked candidates a filtered search inspects.
///
/// Filtering happens after ranking, so `Oversample(n)` may return fewer than
/// `k` hits even when more matching vectors exist past the first `n`.
/// `Exhaustive` ranks the whole store and never misses a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatePool {
    Oversample(usize),
    Exhaustive,
}

impl CandidatePool {
    fn size(&self, k: usize, store_len: usize) -> usize {
        match self {
            CandidatePool::Oversample(n) => (*n).max(k).min(store_len),
            CandidatePool::Exhaustive => store_len,
        }
    }
}

impl Default for CandidatePool {
    fn default() -> Self {
        CandidatePool::Oversample(DEFAULT_FILTER_CANDIDATES)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub candidate_pool: CandidatePool,
}

/// Vectors and their metadata records under one contiguous id space.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorCollection {
    config: CollectionConfig,
    store: VectorStore,
    metadata: MetadataTable,
}

impl VectorCollection {
    pub fn new(dimension: usize) -> Result<Self, CollectionError> {
        Self::with_config(dimension, CollectionConfig::default())
    }

    pub fn with_config(dimension: usize, config: CollectionConfig) -> Result<Self, CollectionError> {
        let store = VectorStore::new(dimension)?;
        debug!("Initialized collection with dimension={}", dimension);
        Ok(Self {
            config,
            store,
            metadata: MetadataTable::new(),
        })
    }

    /// Assemble a collection from already-validated parts.
    pub(crate) fn from_parts(config: CollectionConfig, store: VectorStore, metadata: MetadataTable) -> Self {
        Self {
            config,
            store,
            metadata,
        }
    }

    pub(crate) fn store(&self) -> &VectorStore {
        &self.store
    }

    pub(crate) fn metadata_table(&self) -> &MetadataTable {
        &self.metadata
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn dimension(&self) -> usize {
        self.store.dimension()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn vector(&self, id: VectorId) -> Option<&[f32]> {
        self.store.get(id)
    }

    pub fn add(&mut self, vector: &[f32], metadata: Metadata) -> Result<VectorId, CollectionError> {
        let id = self.store.add(vector)?;
        self.metadata.insert(id, metadata);
        debug!("Added vector {} to collection", id);
        Ok(id)
    }

    pub fn add_many<V: AsRef<[f32]>>(
        &mut self,
        vectors: &[V],
        metadata: Vec<Metadata>,
    ) -> Result<Vec<VectorId>, CollectionError> {
        if vectors.len() != metadata.len() {
            return Err(CollectionError::LengthMismatch {
                vectors: vectors.len(),
                metadata: metadata.len(),
            });
        }

        let ids = self.store.add_many(vectors)?;
        for (id, record) in ids.iter().zip(metadata) {
            self.metadata.insert(*id, record);
        }

        info!("Batch added {} vectors", ids.len());
        Ok(ids)
    }

    pub fn get(&self, id: VectorId) -> Option<&Metadata> {
        self.metadata.get(id)
    }

    /// Rank stored vectors by cosine similarity to `query`.
    ///
    /// With a non-empty `filter`, ranking runs over the configured candidate
    /// pool and only records matching every condition are kept, in rank
    /// order, until `k` are collected.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>, CollectionError> {
        let filter = filter.filter(|f| !f.is_empty());

        let Some(filter) = filter else {
            let ranked = self.store.search(query, k)?;
            return Ok(ranked
                .into_iter()
                .map(|(id, score)| self.join(id, score))
                .collect());
        };

        let pool = self.config.candidate_pool.size(k, self.store.len());
        let ranked = self.store.search(query, pool)?;

        let results: Vec<SearchResult> = ranked
            .into_iter()
            .filter(|(id, _)| self.metadata.get(*id).map_or(false, |m| filter.matches(m)))
            .take(k)
            .map(|(id, score)| self.join(id, score))
            .collect();

        debug!(
            "Filtered search kept {} of {} candidates (k={})",
            results.len(),
            pool,
            k
        );
        Ok(results)
    }

    fn join(&self, id: VectorId, score: f32) -> SearchResult {
        let metadata = self.metadata.get(id).cloned().unwrap_or_else(empty_metadata);
        SearchResult::new(id, score, metadata)
    }
}
