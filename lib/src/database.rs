// lib/src/database.rs

use std::sync::Arc;

use log::debug;
use models::errors::GraphResult;
use models::identifiers::sanitize;
use models::{EntityNode, Vertex, VertexId, VertexType};

use crate::storage_engine::{create_storage, GraphStorageEngine, StorageConfig};

/// A graph database wrapper that provides a simplified interface for
/// interacting with an underlying `GraphStorageEngine`.
///
/// Ingestion code mints entity vertices through [`Database::entity`] and reports
/// edges with [`Database::record_edge`] / [`Database::remove_edge`] so that
/// vertex degrees stay current.
#[derive(Debug)]
pub struct Database {
    storage_engine: Arc<dyn GraphStorageEngine>,
}

impl Database {
    /// Creates the engine named by `config` and starts it.
    pub async fn new(config: StorageConfig) -> GraphResult<Self> {
        let storage_engine = create_storage(config)?;
        storage_engine.start().await?;
        Ok(Database { storage_engine })
    }

    /// Wraps an already started engine.
    pub fn with_engine(storage_engine: Arc<dyn GraphStorageEngine>) -> Self {
        Database { storage_engine }
    }

    /// Returns a reference to the underlying graph storage engine.
    pub fn storage(&self) -> &Arc<dyn GraphStorageEngine> {
        &self.storage_engine
    }

    /// Returns the entity vertex for `text` in `namespace`, creating and
    /// saving it first if the store does not have it yet.
    pub async fn entity(&self, namespace: &str, text: &str) -> GraphResult<Vertex> {
        let node = EntityNode::from_ns_and_text(namespace, text)?;
        debug!("Resolving entity {} for {:?}", node.vertex_id(), text);
        self.storage_engine.get_or_insert(&Vertex::from(node)).await
    }

    /// Every entity whose local part is the sanitized, lowercased `text`,
    /// across namespaces. With a non-empty `namespaces` list only entities
    /// inside one of those namespaces (or below them) are kept.
    ///
    /// Candidates come back best first: highest degree, then by id.
    pub async fn entities_with_root(
        &self,
        text: &str,
        namespaces: &[&str],
    ) -> GraphResult<Vec<Vertex>> {
        let root = sanitize(text).to_lowercase();
        if root.is_empty() {
            return Ok(Vec::new());
        }
        let mut candidates: Vec<Vertex> = self
            .storage_engine
            .get_all_vertices()
            .await?
            .into_iter()
            .filter(|v| v.vertex_type() == VertexType::Entity)
            .filter(|v| v.id().local_part() == root)
            .filter(|v| {
                namespaces.is_empty() || namespaces.iter().any(|ns| v.id().in_namespace(ns))
            })
            .collect();
        candidates.sort_by(|a, b| b.degree().cmp(&a.degree()).then_with(|| a.id().cmp(b.id())));
        debug!("{} candidates for root {:?}", candidates.len(), root);
        Ok(candidates)
    }

    /// The highest-ranked of [`entities_with_root`](Self::entities_with_root), if any.
    pub async fn best_entity(
        &self,
        text: &str,
        namespaces: &[&str],
    ) -> GraphResult<Option<Vertex>> {
        let candidates = self.entities_with_root(text, namespaces).await?;
        Ok(candidates.into_iter().next())
    }

    pub async fn get_vertex(&self, id: &VertexId) -> GraphResult<Option<Vertex>> {
        self.storage_engine.get_vertex(id).await
    }

    /// Loads a vertex by its string id.
    pub async fn load(&self, id: &str) -> GraphResult<Vertex> {
        let id = VertexId::parse(id)?;
        self.storage_engine.load(&id).await
    }

    pub async fn save(&self, vertex: &Vertex) -> GraphResult<Vertex> {
        self.storage_engine.save(vertex).await
    }

    /// Accounts for a new edge between `a` and `b`. A self-loop is one incident
    /// edge and counts once.
    pub async fn record_edge(&self, a: &VertexId, b: &VertexId) -> GraphResult<()> {
        self.adjust_endpoints(a, b, 1).await
    }

    /// Accounts for the removal of an edge between `a` and `b`.
    pub async fn remove_edge(&self, a: &VertexId, b: &VertexId) -> GraphResult<()> {
        self.adjust_endpoints(a, b, -1).await
    }

    async fn adjust_endpoints(&self, a: &VertexId, b: &VertexId, delta: i64) -> GraphResult<()> {
        let endpoints = if a == b {
            vec![a.clone()]
        } else {
            vec![a.clone(), b.clone()]
        };
        self.storage_engine.adjust_degrees(&endpoints, delta).await?;
        Ok(())
    }

    pub async fn get_all_vertices(&self) -> GraphResult<Vec<Vertex>> {
        self.storage_engine.get_all_vertices().await
    }

    pub async fn delete_vertex(&self, id: &VertexId) -> GraphResult<()> {
        self.storage_engine.delete_vertex(id).await
    }

    /// Flushes and stops the engine.
    pub async fn close(&self) -> GraphResult<()> {
        self.storage_engine.stop().await
    }
}
