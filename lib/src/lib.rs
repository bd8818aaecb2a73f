// lib/src/lib.rs

//! Graph store for the vertex models: an async storage-engine trait, the
//! in-memory engine and the [`Database`] façade used by ingestion.

pub mod database;
pub mod storage_engine;

pub use models::{
    EntityNode, GraphError, GraphResult, Identifier, ValidationError, Vertex, VertexId,
    VertexKind, VertexRecord, VertexType,
};

pub use crate::database::Database;
pub use crate::storage_engine::{
    create_storage, GraphStorageEngine, InMemoryStorage, StorageConfig, StorageEngineType,
};
