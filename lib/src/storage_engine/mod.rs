// lib/src/storage_engine/mod.rs

pub mod config;
pub mod inmemory_storage;
pub mod storage_engine;

pub use config::{StorageConfig, StorageEngineType};
pub use inmemory_storage::InMemoryStorage;
pub use storage_engine::GraphStorageEngine;

use anyhow::Result;
use std::sync::Arc;

/// Creates a storage engine instance based on the provided configuration.
/// The engine is returned stopped; call `start` before use.
pub fn create_storage(config: StorageConfig) -> Result<Arc<dyn GraphStorageEngine>> {
    match config.engine_type {
        StorageEngineType::InMemory => {
            let storage = InMemoryStorage::new(config)?;
            Ok(Arc::new(storage))
        }
    }
}
