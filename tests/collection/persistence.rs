// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use nanovec::collection::{CONFIG_FILE, METADATA_FILE, VECTORS_FILE};
use nanovec::core::types::VectorId;
use nanovec::npy::{NpyDecoder, NpyEncoder};
use nanovec::{CandidatePool, CollectionConfig, MetadataFilter, PersistenceError, VectorCollection};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn sample_collection() -> VectorCollection {
    let mut collection = VectorCollection::new(3).unwrap();
    collection.add(&[1.0, 0.0, 0.0], json!({"data": "test"})).unwrap();
    collection
        .add_many(
            &[vec![0.25, -1.5, 3.0], vec![0.0, 0.0, 0.0], vec![f32::MIN_POSITIVE, 1e30, -0.0]],
            vec![
                json!({"type": "car", "tags": ["a", "b"], "price": 19999.5}),
                json!(null),
                json!({"nested": {"deep": [1, {"x": true}]}}),
            ],
        )
        .unwrap();
    collection
}

#[test]
fn test_round_trip_preserves_everything() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test_db");
    let collection = sample_collection();

    collection.save(&path).unwrap();
    let loaded = VectorCollection::load(&path).unwrap();

    assert_eq!(loaded.dimension(), 3);
    assert_eq!(loaded.len(), collection.len());
    for i in 0..collection.len() {
        let id = VectorId::new(i);
        let original: Vec<u32> = collection.vector(id).unwrap().iter().map(|x| x.to_bits()).collect();
        let restored: Vec<u32> = loaded.vector(id).unwrap().iter().map(|x| x.to_bits()).collect();
        assert_eq!(original, restored);
        assert_eq!(loaded.get(id), collection.get(id));
    }
    assert_eq!(loaded, collection);
}

#[test]
fn test_loaded_collection_is_searchable_and_appendable() {
    let dir = TempDir::new().unwrap();
    sample_collection().save(dir.path()).unwrap();

    let mut loaded = VectorCollection::load(dir.path()).unwrap();

    let results = loaded.search(&[1.0, 0.0, 0.0], 1, None).unwrap();
    assert_eq!(results[0].metadata["data"], json!("test"));

    let id = loaded.add(&[0.0, 1.0, 0.0], json!({"after": "load"})).unwrap();
    assert_eq!(id, VectorId::new(4));
}

#[test]
fn test_round_trip_preserves_float_metadata_bits() {
    let dir = TempDir::new().unwrap();
    let values = [
        1.0715660391465826e-75,
        0.1 + 0.2,
        f64::MIN_POSITIVE,
        5e-324,
        f64::MAX,
        -2.2250738585072014e-308,
        123456789.12345678,
    ];
    let mut collection = VectorCollection::new(1).unwrap();
    for v in values {
        collection.add(&[1.0], json!({"v": v})).unwrap();
    }

    collection.save(dir.path()).unwrap();
    let loaded = VectorCollection::load(dir.path()).unwrap();

    for (i, v) in values.iter().enumerate() {
        let restored = loaded.get(VectorId::new(i)).unwrap()["v"].as_f64().unwrap();
        assert_eq!(restored.to_bits(), v.to_bits(), "value {:e}", v);
    }
    assert_eq!(loaded, collection);
}

#[test]
fn test_round_trip_empty_collection() {
    let dir = TempDir::new().unwrap();
    VectorCollection::new(8).unwrap().save(dir.path()).unwrap();

    let loaded = VectorCollection::load(dir.path()).unwrap();

    assert_eq!(loaded.dimension(), 8);
    assert!(loaded.is_empty());
    assert!(loaded.search(&[1.0; 8], 3, None).unwrap().is_empty());
}

#[test]
fn test_saved_artifacts_layout() {
    let dir = TempDir::new().unwrap();
    sample_collection().save(dir.path()).unwrap();

    let config: serde_json::Value =
        serde_json::from_slice(&fs::read(dir.path().join(CONFIG_FILE)).unwrap()).unwrap();
    assert_eq!(config, json!({"dimension": 3}));

    let metadata_text = fs::read_to_string(dir.path().join(METADATA_FILE)).unwrap();
    assert!(metadata_text.contains("\n  \"0\": {"));
    let metadata: serde_json::Value = serde_json::from_str(&metadata_text).unwrap();
    assert_eq!(metadata["0"], json!({"data": "test"}));
    assert_eq!(metadata["2"], json!(null));

    let matrix = NpyDecoder::decode_f32_matrix(&fs::read(dir.path().join(VECTORS_FILE)).unwrap()).unwrap();
    assert_eq!((matrix.rows, matrix.cols), (4, 3));
    assert_eq!(&matrix.data[3..6], &[0.25, -1.5, 3.0]);
}

#[test]
fn test_save_overwrites_existing_directory() {
    let dir = TempDir::new().unwrap();
    sample_collection().save(dir.path()).unwrap();

    let mut smaller = VectorCollection::new(2).unwrap();
    smaller.add(&[0.5, 0.5], json!({"v": 2})).unwrap();
    smaller.save(dir.path()).unwrap();

    let loaded = VectorCollection::load(dir.path()).unwrap();
    assert_eq!(loaded, smaller);
}

#[test]
fn test_load_with_config_applies_pool() {
    let dir = TempDir::new().unwrap();
    sample_collection().save(dir.path()).unwrap();
    let config = CollectionConfig {
        candidate_pool: CandidatePool::Exhaustive,
    };

    let loaded = VectorCollection::load_with_config(dir.path(), config.clone()).unwrap();
    assert_eq!(loaded.config(), &config);

    let filter = MetadataFilter::new().with_field("type", "car");
    let results = loaded.search(&[1.0, 0.0, 0.0], 5, Some(&filter)).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, VectorId::new(1));
}

#[test]
fn test_load_missing_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does_not_exist");

    let err = VectorCollection::load(&missing).unwrap_err();
    assert!(matches!(err, PersistenceError::PathNotFound(p) if p == missing));
}

#[test]
fn test_load_regular_file_is_not_a_collection() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("vectors.npy");
    fs::write(&file, b"not a directory").unwrap();

    let err = VectorCollection::load(&file).unwrap_err();
    assert!(matches!(err, PersistenceError::PathNotFound(p) if p == file));
}

#[test]
fn test_load_missing_config() {
    let dir = TempDir::new().unwrap();
    sample_collection().save(dir.path()).unwrap();
    fs::remove_file(dir.path().join(CONFIG_FILE)).unwrap();

    let err = VectorCollection::load(dir.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::ConfigMissing(_)));
}

#[test]
fn test_load_invalid_config() {
    let dir = TempDir::new().unwrap();
    sample_collection().save(dir.path()).unwrap();

    for doc in [r#"{"dimension": 0}"#, r#"{"dim": 3}"#, "[3]", "{"] {
        fs::write(dir.path().join(CONFIG_FILE), doc).unwrap();
        let err = VectorCollection::load(dir.path()).unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidConfig(_)), "{}: {:?}", doc, err);
    }
}

#[test]
fn test_load_config_only() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE), r#"{"dimension": 5}"#).unwrap();

    let loaded = VectorCollection::load(dir.path()).unwrap();

    assert_eq!(loaded.dimension(), 5);
    assert!(loaded.is_empty());
}

#[test]
fn test_load_rejects_width_mismatch() {
    let dir = TempDir::new().unwrap();
    sample_collection().save(dir.path()).unwrap();
    fs::write(dir.path().join(CONFIG_FILE), r#"{"dimension": 4}"#).unwrap();

    let err = VectorCollection::load(dir.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidConfig(_)));
}

#[test]
fn test_load_rejects_metadata_beyond_vectors() {
    let dir = TempDir::new().unwrap();
    sample_collection().save(dir.path()).unwrap();
    fs::write(
        dir.path().join(METADATA_FILE),
        r#"{"0": {"ok": true}, "4": {"orphan": true}}"#,
    )
    .unwrap();

    let err = VectorCollection::load(dir.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidConfig(_)));
}

#[test]
fn test_load_tolerates_sparse_metadata() {
    let dir = TempDir::new().unwrap();
    sample_collection().save(dir.path()).unwrap();
    fs::write(dir.path().join(METADATA_FILE), r#"{"1": {"only": "one"}}"#).unwrap();

    let loaded = VectorCollection::load(dir.path()).unwrap();

    assert_eq!(loaded.len(), 4);
    assert_eq!(loaded.get(VectorId::new(0)), None);
    let results = loaded.search(&[1.0, 0.0, 0.0], 1, None).unwrap();
    assert_eq!(results[0].metadata, json!({}));
}

#[test]
fn test_load_rejects_non_numeric_metadata_keys() {
    let dir = TempDir::new().unwrap();
    sample_collection().save(dir.path()).unwrap();
    fs::write(dir.path().join(METADATA_FILE), r#"{"first": {}}"#).unwrap();

    let err = VectorCollection::load(dir.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidMetadata(_)));
}

#[test]
fn test_load_rejects_corrupt_vector_file() {
    let dir = TempDir::new().unwrap();
    sample_collection().save(dir.path()).unwrap();
    fs::write(dir.path().join(VECTORS_FILE), b"garbage").unwrap();

    let err = VectorCollection::load(dir.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::VectorFile(_)));
}

#[test]
fn test_load_accepts_externally_written_buffer() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE), r#"{"dimension": 2}"#).unwrap();
    fs::write(
        dir.path().join(VECTORS_FILE),
        NpyEncoder::encode_f32_matrix(3, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]),
    )
    .unwrap();

    let loaded = VectorCollection::load(dir.path()).unwrap();

    assert_eq!(loaded.len(), 3);
    let results = loaded.search(&[0.0, 1.0], 1, None).unwrap();
    assert_eq!(results[0].id, VectorId::new(1));
    assert_eq!(results[0].metadata, json!({}));
}
