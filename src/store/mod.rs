// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod metadata;
pub mod vectors;

pub use metadata::MetadataTable;
pub use vectors::{StoreError, VectorStore};
