// lib/src/storage_engine/inmemory_storage.rs
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use models::errors::{GraphError, GraphResult};
use models::{Vertex, VertexId, VertexRecord};
use tempfile::NamedTempFile;
use tokio::sync::{Mutex, RwLock};

use super::config::StorageConfig;
use super::storage_engine::GraphStorageEngine;

/// Keeps every vertex in a map. When the config names a `data_path`, the map is
/// loaded from a MessagePack snapshot on creation and written back on `flush`
/// and `stop`.
#[derive(Debug)]
pub struct InMemoryStorage {
    vertices: Arc<RwLock<HashMap<VertexId, Vertex>>>,
    config: StorageConfig,
    running: Arc<RwLock<bool>>,
    // Serializes snapshot writers so a later flush never lands before an earlier one.
    flush_lock: Mutex<()>,
}

impl InMemoryStorage {
    pub fn new(config: StorageConfig) -> GraphResult<Self> {
        let vertices = match &config.data_path {
            Some(path) if path.exists() => read_snapshot(path)?,
            _ => HashMap::new(),
        };
        Ok(InMemoryStorage {
            vertices: Arc::new(RwLock::new(vertices)),
            config,
            running: Arc::new(RwLock::new(false)),
            flush_lock: Mutex::new(()),
        })
    }

    pub fn data_path(&self) -> Option<&Path> {
        self.config.data_path.as_deref()
    }

    async fn ensure_running(&self) -> GraphResult<()> {
        if *self.running.read().await {
            Ok(())
        } else {
            Err(GraphError::NotRunning(self.get_type().to_string()))
        }
    }
}

fn read_snapshot(path: &Path) -> GraphResult<HashMap<VertexId, Vertex>> {
    let file = File::open(path)?;
    let records: Vec<VertexRecord> = rmp_serde::from_read(BufReader::new(file))?;
    let mut vertices = HashMap::with_capacity(records.len());
    for record in records {
        let vertex = Vertex::try_from(record)?;
        vertices.insert(vertex.id().clone(), vertex);
    }
    info!("Loaded {} vertices from {:?}", vertices.len(), path);
    Ok(vertices)
}

fn write_snapshot(path: &Path, records: &[VertexRecord]) -> GraphResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let temp = NamedTempFile::new_in(&dir)?;
    {
        let mut buf = BufWriter::new(temp.as_file());
        rmp_serde::encode::write(&mut buf, records)?;
        buf.flush()?;
    }
    temp.persist(path).map_err(|e| GraphError::Io(e.error))?;
    info!("Persisted {} vertices to {:?}", records.len(), path);
    Ok(())
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn apply_delta(id: &VertexId, degree: u64, delta: i64) -> u64 {
    if delta >= 0 {
        return degree.saturating_add(delta.unsigned_abs());
    }
    let decrement = delta.unsigned_abs();
    if decrement > degree {
        warn!(
            "Degree of {} would drop below zero ({} - {}), clamping to 0",
            id, degree, decrement
        );
        0
    } else {
        degree - decrement
    }
}

fn stamped(vertex: &Vertex) -> Vertex {
    let mut stored = vertex.copy();
    if !stored.is_persisted() {
        stored.set_ts(now_millis());
    }
    stored
}

#[async_trait]
impl GraphStorageEngine for InMemoryStorage {
    async fn start(&self) -> GraphResult<()> {
        let mut running = self.running.write().await;
        *running = true;
        info!("Started {} storage", self.get_type());
        Ok(())
    }

    async fn stop(&self) -> GraphResult<()> {
        self.flush().await?;
        let mut running = self.running.write().await;
        *running = false;
        info!("Stopped {} storage", self.get_type());
        Ok(())
    }

    fn get_type(&self) -> &'static str {
        "InMemory"
    }

    async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    async fn get_vertex(&self, id: &VertexId) -> GraphResult<Option<Vertex>> {
        self.ensure_running().await?;
        let vertices = self.vertices.read().await;
        Ok(vertices.get(id).map(Vertex::copy))
    }

    async fn save(&self, vertex: &Vertex) -> GraphResult<Vertex> {
        self.ensure_running().await?;
        let mut vertices = self.vertices.write().await;
        let mut stored = vertex.copy();
        match vertices.get(vertex.id()) {
            Some(existing) => {
                stored.set_degree(existing.degree());
                if !stored.is_persisted() {
                    stored.set_ts(existing.ts());
                }
            }
            None => stored = stamped(&stored),
        }
        vertices.insert(stored.id().clone(), stored.copy());
        debug!(
            "Saved {} vertex {} (degree {}, ts {})",
            stored.vertex_type(),
            stored.id(),
            stored.degree(),
            stored.ts()
        );
        Ok(stored)
    }

    async fn get_or_insert(&self, vertex: &Vertex) -> GraphResult<Vertex> {
        self.ensure_running().await?;
        let mut vertices = self.vertices.write().await;
        if let Some(existing) = vertices.get(vertex.id()) {
            return Ok(existing.copy());
        }
        let stored = stamped(vertex);
        vertices.insert(stored.id().clone(), stored.copy());
        debug!("Inserted {} vertex {}", stored.vertex_type(), stored.id());
        Ok(stored)
    }

    async fn delete_vertex(&self, id: &VertexId) -> GraphResult<()> {
        self.ensure_running().await?;
        let mut vertices = self.vertices.write().await;
        if vertices.remove(id).is_some() {
            debug!("Deleted vertex {}", id);
        }
        Ok(())
    }

    async fn get_all_vertices(&self) -> GraphResult<Vec<Vertex>> {
        self.ensure_running().await?;
        let vertices = self.vertices.read().await;
        let mut all: Vec<Vertex> = vertices.values().map(Vertex::copy).collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(all)
    }

    async fn adjust_degree(&self, id: &VertexId, delta: i64) -> GraphResult<Vertex> {
        self.adjust_degrees(std::slice::from_ref(id), delta)
            .await?
            .pop()
            .ok_or_else(|| GraphError::NotFound(id.identifier()))
    }

    async fn adjust_degrees(&self, ids: &[VertexId], delta: i64) -> GraphResult<Vec<Vertex>> {
        self.ensure_running().await?;
        let mut vertices = self.vertices.write().await;
        if let Some(missing) = ids.iter().find(|id| !vertices.contains_key(*id)) {
            return Err(GraphError::NotFound(missing.identifier()));
        }
        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            let vertex = vertices
                .get_mut(id)
                .ok_or_else(|| GraphError::NotFound(id.identifier()))?;
            let degree = apply_delta(id, vertex.degree(), delta);
            vertex.set_degree(degree);
            updated.push(vertex.copy());
        }
        Ok(updated)
    }

    async fn flush(&self) -> GraphResult<()> {
        let Some(path) = self.config.data_path.clone() else {
            return Ok(());
        };
        let _flushing = self.flush_lock.lock().await;
        let mut records: Vec<VertexRecord> = {
            let vertices = self.vertices.read().await;
            vertices.values().map(VertexRecord::from).collect()
        };
        records.sort_by(|a, b| a.id.cmp(&b.id));
        tokio::task::spawn_blocking(move || write_snapshot(&path, &records))
            .await
            .map_err(|e| GraphError::StorageError(format!("Snapshot task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{EntityNode, TS_UNASSIGNED};
    use tempfile::TempDir;

    fn id(s: &str) -> VertexId {
        VertexId::parse(s).unwrap()
    }

    async fn started(config: StorageConfig) -> InMemoryStorage {
        let _ = env_logger::builder().is_test(true).try_init();
        let storage = InMemoryStorage::new(config).unwrap();
        storage.start().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn save_assigns_timestamp_to_fresh_vertex() {
        let storage = started(StorageConfig::default()).await;
        let fresh: Vertex = EntityNode::new("people/ada").unwrap().into();
        assert_eq!(fresh.ts(), TS_UNASSIGNED);

        let stored = storage.save(&fresh).await.unwrap();
        assert!(stored.is_persisted());
        assert_eq!(fresh.ts(), TS_UNASSIGNED);

        let loaded = storage.load(&id("people/ada")).await.unwrap();
        assert_eq!(loaded.ts(), stored.ts());
    }

    #[tokio::test]
    async fn save_keeps_existing_timestamp() {
        let storage = started(StorageConfig::default()).await;
        let vertex: Vertex = EntityNode::with_state("people/ada", 2, 1234).unwrap().into();
        let stored = storage.save(&vertex).await.unwrap();
        assert_eq!(stored.ts(), 1234);
        assert_eq!(stored.degree(), 2);
    }

    #[tokio::test]
    async fn load_missing_vertex_is_not_found() {
        let storage = started(StorageConfig::default()).await;
        let err = storage.load(&id("people/nobody")).await.unwrap_err();
        let missing = "people/nobody";
        assert!(matches!(err, GraphError::NotFound(ref name) if name.as_str() == missing));
        assert!(storage.get_vertex(&id("people/nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reads_and_writes_require_a_running_engine() {
        let storage = InMemoryStorage::new(StorageConfig::default()).unwrap();
        assert!(!storage.is_running().await);
        let vertex: Vertex = EntityNode::new("people/ada").unwrap().into();
        assert!(matches!(storage.save(&vertex).await, Err(GraphError::NotRunning(_))));
        assert!(matches!(
            storage.get_vertex(vertex.id()).await,
            Err(GraphError::NotRunning(_))
        ));
        assert!(matches!(storage.get_all_vertices().await, Err(GraphError::NotRunning(_))));

        storage.start().await.unwrap();
        storage.save(&vertex).await.unwrap();
        storage.stop().await.unwrap();
        assert!(matches!(storage.load(vertex.id()).await, Err(GraphError::NotRunning(_))));
    }

    #[tokio::test]
    async fn save_keeps_the_stored_degree() {
        let storage = started(StorageConfig::default()).await;
        let pending: Vertex = EntityNode::new("people/ada").unwrap().into();
        let first = storage.save(&pending).await.unwrap();
        storage.adjust_degree(pending.id(), 1).await.unwrap();

        let resaved = storage.save(&pending).await.unwrap();
        assert_eq!(resaved.degree(), 1);
        assert_eq!(resaved.ts(), first.ts());
        assert_eq!(storage.load(pending.id()).await.unwrap().degree(), 1);
    }

    #[tokio::test]
    async fn get_or_insert_returns_the_stored_vertex() {
        let storage = started(StorageConfig::default()).await;
        let pending: Vertex = EntityNode::new("people/ada").unwrap().into();
        let inserted = storage.get_or_insert(&pending).await.unwrap();
        assert!(inserted.is_persisted());
        storage.adjust_degree(pending.id(), 2).await.unwrap();

        let again = storage.get_or_insert(&pending).await.unwrap();
        assert_eq!(again.degree(), 2);
        assert_eq!(again.ts(), inserted.ts());
    }

    #[tokio::test]
    async fn concurrent_get_or_insert_stores_one_vertex() {
        let storage = Arc::new(started(StorageConfig::default()).await);
        let mut handles = Vec::new();
        for _ in 0..16 {
            let storage = Arc::clone(&storage);
            handles.push(tokio::spawn(async move {
                let pending: Vertex = EntityNode::new("people/ada").unwrap().into();
                let stored = storage.get_or_insert(&pending).await.unwrap();
                storage.adjust_degree(stored.id(), 1).await.unwrap();
                stored.ts()
            }));
        }
        let mut stamps = Vec::new();
        for handle in handles {
            stamps.push(handle.await.unwrap());
        }
        stamps.dedup();
        assert_eq!(stamps.len(), 1);
        assert_eq!(storage.load(&id("people/ada")).await.unwrap().degree(), 16);
    }

    #[tokio::test]
    async fn adjust_degrees_is_all_or_nothing() {
        let storage = started(StorageConfig::default()).await;
        let ada: Vertex = EntityNode::new("people/ada").unwrap().into();
        storage.save(&ada).await.unwrap();

        let ids = [ada.id().clone(), id("people/ghost")];
        let err = storage.adjust_degrees(&ids, 1).await.unwrap_err();
        let ghost = "people/ghost";
        assert!(matches!(err, GraphError::NotFound(ref name) if name.as_str() == ghost));
        assert_eq!(storage.load(ada.id()).await.unwrap().degree(), 0);

        let both = [ada.id().clone(), ada.id().clone()];
        let updated = storage.adjust_degrees(&both, 1).await.unwrap();
        assert_eq!(updated.last().map(Vertex::degree), Some(2));
    }

    #[tokio::test]
    async fn adjust_degree_clamps_at_zero() {
        let storage = started(StorageConfig::default()).await;
        let vertex: Vertex = EntityNode::new("people/ada").unwrap().into();
        storage.save(&vertex).await.unwrap();

        let after = storage.adjust_degree(vertex.id(), 3).await.unwrap();
        assert_eq!(after.degree(), 3);
        let after = storage.adjust_degree(vertex.id(), -5).await.unwrap();
        assert_eq!(after.degree(), 0);

        let missing = storage.adjust_degree(&id("people/nobody"), 1).await;
        assert!(matches!(missing, Err(GraphError::NotFound(_))));
    }

    #[tokio::test]
    async fn returned_vertices_are_independent_copies() {
        let storage = started(StorageConfig::default()).await;
        let vertex: Vertex = EntityNode::new("people/ada").unwrap().into();
        let mut stored = storage.save(&vertex).await.unwrap();
        stored.set_degree(99);
        assert_eq!(storage.load(vertex.id()).await.unwrap().degree(), 0);
    }

    #[tokio::test]
    async fn get_all_vertices_is_ordered_and_delete_removes() {
        let storage = started(StorageConfig::default()).await;
        for name in ["people/grace", "people/ada", "places/zurich"] {
            let vertex: Vertex = EntityNode::new(name).unwrap().into();
            storage.save(&vertex).await.unwrap();
        }
        let ids: Vec<String> = storage
            .get_all_vertices()
            .await
            .unwrap()
            .iter()
            .map(|v| v.id().to_string())
            .collect();
        assert_eq!(ids, vec!["people/ada", "people/grace", "places/zurich"]);

        storage.delete_vertex(&id("people/grace")).await.unwrap();
        assert_eq!(storage.get_all_vertices().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn snapshot_survives_restart() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig::in_memory(Some(dir.path().join("vertices.msgpack")));

        let storage = started(config.clone()).await;
        let vertex: Vertex = EntityNode::new("people/alan_turing").unwrap().into();
        storage.save(&vertex).await.unwrap();
        storage.adjust_degree(vertex.id(), 2).await.unwrap();
        storage.stop().await.unwrap();

        let reopened = started(config).await;
        let loaded = reopened.load(&id("people/alan_turing")).await.unwrap();
        assert_eq!(loaded.degree(), 2);
        assert!(loaded.is_persisted());
        assert_eq!(loaded.label(), "Alan turing");
    }

    #[tokio::test]
    async fn corrupt_snapshot_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vertices.msgpack");
        std::fs::write(&path, [0xc1, 0x00]).unwrap();
        let err = InMemoryStorage::new(StorageConfig::in_memory(Some(path))).unwrap_err();
        assert!(matches!(err, GraphError::DeserializationError(_)));
    }
}
