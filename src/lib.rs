// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod collection;
pub mod core;
pub mod npy;
pub mod store;

pub use collection::{
    CandidatePool, CollectionConfig, CollectionError, PersistenceError, VectorCollection,
};
pub use crate::core::{Metadata, MetadataFilter, SearchResult, VectorId};
