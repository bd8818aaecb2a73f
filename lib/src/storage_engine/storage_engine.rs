// lib/src/storage_engine/storage_engine.rs

use std::fmt::Debug;

use async_trait::async_trait;
use models::errors::{GraphError, GraphResult};
use models::{Vertex, VertexId};

/// The graph store that owns vertices. Vertices never point back at it; callers
/// receive copies and write changes back through [`save`](Self::save).
///
/// Degree and timestamp are maintained here. `save` assigns a timestamp to a
/// vertex that has none and never overwrites the stored degree; degrees only
/// move through [`adjust_degree`](Self::adjust_degree) and
/// [`adjust_degrees`](Self::adjust_degrees). Every operation takes effect
/// atomically with respect to the others.
///
/// All operations fail with `NotRunning` until [`start`](Self::start) is called.
#[async_trait]
pub trait GraphStorageEngine: Send + Sync + Debug {
    async fn start(&self) -> GraphResult<()>;

    async fn stop(&self) -> GraphResult<()>;

    fn get_type(&self) -> &'static str;

    async fn is_running(&self) -> bool;

    async fn get_vertex(&self, id: &VertexId) -> GraphResult<Option<Vertex>>;

    /// Like [`get_vertex`](Self::get_vertex) but fails with `NotFound` when absent.
    async fn load(&self, id: &VertexId) -> GraphResult<Vertex> {
        self.get_vertex(id)
            .await?
            .ok_or_else(|| GraphError::NotFound(id.identifier()))
    }

    /// Stores a copy of `vertex` and returns what was stored. For a vertex
    /// already in the store the stored degree is kept, and so is the stored
    /// timestamp when `vertex` carries none.
    async fn save(&self, vertex: &Vertex) -> GraphResult<Vertex>;

    /// Returns the stored vertex with `vertex`'s id, inserting `vertex` first if
    /// there is none. The lookup and the insert happen under one lock.
    async fn get_or_insert(&self, vertex: &Vertex) -> GraphResult<Vertex>;

    async fn delete_vertex(&self, id: &VertexId) -> GraphResult<()>;

    /// All vertices, ordered by id.
    async fn get_all_vertices(&self) -> GraphResult<Vec<Vertex>>;

    /// Adds `delta` to the degree of the vertex, clamping at zero.
    async fn adjust_degree(&self, id: &VertexId, delta: i64) -> GraphResult<Vertex>;

    /// Adds `delta` to the degree of every listed vertex, once per occurrence.
    /// Either all of them change or, if any is missing, none does.
    async fn adjust_degrees(&self, ids: &[VertexId], delta: i64) -> GraphResult<Vec<Vertex>>;

    /// Persists all in-memory changes.
    async fn flush(&self) -> GraphResult<()>;
}
