// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Directory persistence for [`VectorCollection`].
//!
//! A saved collection is three files:
//! - `vectors.npy`: `count × dimension` float32 matrix, row-major
//! - `metadata.json`: object of decimal id -> record, pretty-printed
//! - `config.json`: `{"dimension": D}`
//!
//! Files are overwritten in place, one after another. A failure part way
//! through can leave the directory inconsistent.

use crate::collection::core::{CollectionConfig, VectorCollection};
use crate::npy::{NpyDecoder, NpyEncoder, NpyError};
use crate::store::{MetadataTable, VectorStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const VECTORS_FILE: &str = "vectors.npy";
pub const METADATA_FILE: &str = "metadata.json";
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Collection path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Config not found: {0}")]
    ConfigMissing(PathBuf),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("Invalid vector file: {0}")]
    VectorFile(#[from] NpyError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PersistenceError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Contents of `config.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionConfig {
    pub dimension: usize,
}

impl DimensionConfig {
    pub fn to_json(&self) -> Result<Vec<u8>, PersistenceError> {
        serde_json::to_vec(self).map_err(|e| PersistenceError::Serialization(e.to_string()))
    }

    /// Parse and validate a config document.
    pub fn from_json(data: &[u8]) -> Result<Self, PersistenceError> {
        let value: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| PersistenceError::InvalidConfig(e.to_string()))?;

        let dimension = value
            .get("dimension")
            .ok_or_else(|| PersistenceError::InvalidConfig("missing 'dimension'".to_string()))?;

        match dimension.as_u64() {
            Some(d) if d > 0 => Ok(Self {
                dimension: d as usize,
            }),
            _ => Err(PersistenceError::InvalidConfig(format!(
                "'dimension' must be a positive integer, got {}",
                dimension
            ))),
        }
    }
}

/// Write `collection` into `path`, creating the directory if needed.
pub fn save_collection(collection: &VectorCollection, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| PersistenceError::io(path, e))?;

    let store = collection.store();
    let vectors_path = path.join(VECTORS_FILE);
    let encoded = NpyEncoder::encode_f32_matrix(store.len(), store.dimension(), store.as_slice());
    fs::write(&vectors_path, encoded).map_err(|e| PersistenceError::io(&vectors_path, e))?;

    let metadata_path = path.join(METADATA_FILE);
    write_pretty_json(&metadata_path, collection.metadata_table())?;

    let config_path = path.join(CONFIG_FILE);
    let config = DimensionConfig {
        dimension: collection.dimension(),
    };
    fs::write(&config_path, config.to_json()?).map_err(|e| PersistenceError::io(&config_path, e))?;

    info!(
        "Saved collection ({} vectors, dimension {}) to {}",
        store.len(),
        store.dimension(),
        path.display()
    );
    Ok(())
}

/// Read a collection previously written by [`save_collection`].
pub fn load_collection(path: impl AsRef<Path>) -> Result<VectorCollection, PersistenceError> {
    load_collection_with_config(path, CollectionConfig::default())
}

pub fn load_collection_with_config(
    path: impl AsRef<Path>,
    config: CollectionConfig,
) -> Result<VectorCollection, PersistenceError> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Err(PersistenceError::PathNotFound(path.to_path_buf()));
    }

    let config_path = path.join(CONFIG_FILE);
    let config_bytes = read_optional(&config_path)?
        .ok_or_else(|| PersistenceError::ConfigMissing(config_path.clone()))?;
    let dimension = DimensionConfig::from_json(&config_bytes)?.dimension;

    let store = match read_optional(&path.join(VECTORS_FILE))? {
        Some(bytes) => {
            let matrix = NpyDecoder::decode_f32_matrix(&bytes)?;
            if matrix.cols != dimension {
                return Err(PersistenceError::InvalidConfig(format!(
                    "vector buffer has width {}, config declares dimension {}",
                    matrix.cols, dimension
                )));
            }
            VectorStore::from_flat(dimension, matrix.data)
                .map_err(|e| PersistenceError::InvalidConfig(e.to_string()))?
        }
        None => VectorStore::new(dimension).map_err(|e| PersistenceError::InvalidConfig(e.to_string()))?,
    };

    let metadata = match read_optional(&path.join(METADATA_FILE))? {
        Some(bytes) => serde_json::from_slice::<MetadataTable>(&bytes)
            .map_err(|e| PersistenceError::InvalidMetadata(e.to_string()))?,
        None => MetadataTable::new(),
    };

    if let Some(max_id) = metadata.max_id() {
        if max_id.index() >= store.len() {
            return Err(PersistenceError::InvalidConfig(format!(
                "metadata references vector {} but only {} vectors are stored",
                max_id,
                store.len()
            )));
        }
    }

    debug!(
        "Loaded {} vectors and {} metadata records from {}",
        store.len(),
        metadata.len(),
        path.display()
    );
    info!("Collection loaded from {}", path.display());

    Ok(VectorCollection::from_parts(config, store, metadata))
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, PersistenceError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PersistenceError::io(path, e)),
    }
}

fn write_pretty_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let file = fs::File::create(path).map_err(|e| PersistenceError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
    writer.flush().map_err(|e| PersistenceError::io(path, e))
}

impl VectorCollection {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        save_collection(self, path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        load_collection(path)
    }

    pub fn load_with_config(path: impl AsRef<Path>, config: CollectionConfig) -> Result<Self, PersistenceError> {
        load_collection_with_config(path, config)
    }
}
