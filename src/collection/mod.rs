// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod core;
pub mod persistence;

pub use self::core::{
    CandidatePool, CollectionConfig, CollectionError, VectorCollection, DEFAULT_FILTER_CANDIDATES,
};
pub use persistence::{
    load_collection, load_collection_with_config, save_collection, DimensionConfig, PersistenceError,
    CONFIG_FILE, METADATA_FILE, VECTORS_FILE,
};
