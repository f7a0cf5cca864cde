// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use anyhow::{Context, Result};
use nanovec::{MetadataFilter, SearchResult, VectorCollection};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

struct DemoConfig {
    save_path: PathBuf,
    k: usize,
    keep_files: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nanovec=info".into()),
        )
        .init();

    let config = load_config();

    info!("Initializing collection (dimension=3)");
    let mut collection = VectorCollection::new(3)?;

    // Axis 0: fruit, axis 1: vehicles, axis 2: tech
    let documents: [([f32; 3], &str, &str); 6] = [
        ([1.0, 0.0, 0.0], "Apple", "fruit"),
        ([0.9, 0.1, 0.0], "Pear", "fruit"),
        ([0.0, 1.0, 0.0], "Car", "vehicle"),
        ([0.0, 0.9, 0.1], "Truck", "vehicle"),
        ([0.0, 0.0, 1.0], "Laptop", "tech"),
        ([0.1, 0.0, 0.9], "Tablet", "tech"),
    ];

    for (vector, text, kind) in documents.iter() {
        let id = collection.add(vector, json!({"text": text, "type": kind}))?;
        println!("Added {} -> {:?} (id {})", text, vector, id);
    }

    let fruit_query = [1.0, 0.0, 0.0];
    println!("\nQuerying {:?} (fruit-like)", fruit_query);
    print_results(&collection.search(&fruit_query, config.k, None)?);

    let vehicle_query = [0.0, 1.0, 0.0];
    println!("\nQuerying {:?} (vehicle-like)", vehicle_query);
    print_results(&collection.search(&vehicle_query, config.k, None)?);

    let tech_only = MetadataFilter::new().with_field("type", "tech");
    println!("\nQuerying {:?} restricted to type=tech", fruit_query);
    print_results(&collection.search(&fruit_query, config.k, Some(&tech_only))?);

    println!("\n--- Persistence ---");
    println!("Saving collection to {}", config.save_path.display());
    collection.save(&config.save_path)?;

    let loaded = VectorCollection::load(&config.save_path)?;
    let top = loaded.search(&vehicle_query, 1, None)?;
    let top = top.first().context("loaded collection returned no results")?;
    println!(
        "Top result after reload: {} (score {:.4})",
        top.metadata["text"].as_str().unwrap_or("?"),
        top.score
    );

    if !config.keep_files {
        std::fs::remove_dir_all(&config.save_path)
            .with_context(|| format!("failed to clean up {}", config.save_path.display()))?;
        println!("Cleaned up.");
    }

    Ok(())
}

fn print_results(results: &[SearchResult]) {
    for result in results {
        println!(
            "  {} (score {:.4})",
            result.metadata["text"].as_str().unwrap_or("?"),
            result.score
        );
    }
}

fn load_config() -> DemoConfig {
    let keep_files = std::env::var("NANOVEC_DEMO_PATH").is_ok();
    DemoConfig {
        save_path: std::env::var("NANOVEC_DEMO_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join(format!("nanovec-demo-{}", std::process::id()))),
        k: std::env::var("NANOVEC_DEMO_K")
            .ok()
            .and_then(|k| k.parse().ok())
            .unwrap_or(3),
        keep_files,
    }
}
