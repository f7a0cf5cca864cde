// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod metadata_filter;
pub mod types;
pub mod vector_ops;

pub use metadata_filter::{FilterError, MetadataFilter};
pub use types::{empty_metadata, Metadata, SearchResult, VectorId};
