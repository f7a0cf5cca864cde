// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::types::{Metadata, VectorId};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Id -> record mapping sharing the id space of a [`VectorStore`].
///
/// Serialized as a JSON object keyed by decimal id strings, in ascending
/// numeric id order.
///
/// [`VectorStore`]: crate::store::VectorStore
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTable {
    records: BTreeMap<VectorId, Metadata>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: VectorId, metadata: Metadata) -> Option<Metadata> {
        self.records.insert(id, metadata)
    }

    pub fn get(&self, id: VectorId) -> Option<&Metadata> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: VectorId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VectorId, &Metadata)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    /// Highest id with a record, if any.
    pub fn max_id(&self) -> Option<VectorId> {
        self.records.keys().next_back().copied()
    }
}

impl FromIterator<(VectorId, Metadata)> for MetadataTable {
    fn from_iter<I: IntoIterator<Item = (VectorId, Metadata)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Serialize for MetadataTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (id, record) in &self.records {
            map.serialize_entry(&id.to_string(), record)?;
        }
        map.end()
    }
}

struct MetadataTableVisitor;

impl<'de> Visitor<'de> for MetadataTableVisitor {
    type Value = MetadataTable;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object keyed by decimal vector ids")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut records = BTreeMap::new();
        while let Some((key, record)) = access.next_entry::<String, Metadata>()? {
            let id = key
                .parse::<VectorId>()
                .map_err(|_| de::Error::custom(format!("invalid vector id key {:?}", key)))?;
            records.insert(id, record);
        }
        Ok(MetadataTable { records })
    }
}

impl<'de> Deserialize<'de> for MetadataTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MetadataTableVisitor)
    }
}
