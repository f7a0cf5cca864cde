// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Opaque metadata record attached to a stored vector.
pub type Metadata = serde_json::Value;

/// Dense position of a vector in its store, equal to its insertion rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorId(usize);

impl VectorId {
    pub const fn new(index: usize) -> Self {
        VectorId(index)
    }

    pub const fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for VectorId {
    fn from(index: usize) -> Self {
        VectorId(index)
    }
}

impl From<VectorId> for usize {
    fn from(id: VectorId) -> Self {
        id.0
    }
}

impl fmt::Display for VectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VectorId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<usize>().map(VectorId)
    }
}

/// A ranked hit joined with its metadata record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: VectorId,
    pub score: f32,
    pub metadata: Metadata,
}

impl SearchResult {
    pub fn new(id: VectorId, score: f32, metadata: Metadata) -> Self {
        SearchResult {
            id,
            score,
            metadata,
        }
    }
}

/// The record used when a ranked id has no metadata entry.
pub fn empty_metadata() -> Metadata {
    Metadata::Object(serde_json::Map::new())
}
