// models/src/vertices.rs
use core::hash::{Hash, Hasher};
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    entity::EntityNode,
    errors::{ValidationError, ValidationResult},
    identifiers::VertexId,
};

/// Timestamp carried by a vertex that has not been persisted yet.
pub const TS_UNASSIGNED: i64 = -1;

/// Tag naming the concrete variant of a vertex. Stored alongside the vertex so
/// the right variant can be rebuilt on load.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum VertexType {
    Entity,
}

impl VertexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VertexType::Entity => "entity",
        }
    }
}

impl fmt::Display for VertexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VertexType {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        match s {
            "entity" => Ok(VertexType::Entity),
            other => Err(ValidationError::UnknownVertexType(other.to_string())),
        }
    }
}

/// Attributes shared by every vertex variant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VertexHeader {
    id: VertexId,
    /// Number of edges incident to the vertex.
    pub degree: u64,
    /// Persistence timestamp, [`TS_UNASSIGNED`] until the store assigns one.
    pub ts: i64,
}

impl VertexHeader {
    pub fn new(id: VertexId, degree: u64, ts: i64) -> Self {
        VertexHeader { id, degree, ts }
    }

    /// Header of a freshly minted vertex: degree 0, timestamp unassigned.
    pub fn fresh(id: VertexId) -> Self {
        Self::new(id, 0, TS_UNASSIGNED)
    }

    pub fn id(&self) -> &VertexId {
        &self.id
    }
}

/// Operations every vertex variant must provide.
pub trait VertexKind {
    fn vertex_type(&self) -> VertexType;

    /// Human-facing display string.
    fn label(&self) -> String;

    /// Diagnostic rendering. Not meant to be parsed.
    fn raw(&self) -> String;

    fn header(&self) -> &VertexHeader;

    fn header_mut(&mut self) -> &mut VertexHeader;
}

/// A vertex. Variants are dispatched on their [`VertexType`].
///
/// Vertices are plain values: [`Vertex::copy`] yields an independent vertex with
/// no shared mutable state, which is how a vertex should be handed to another
/// task or thread. Degree and timestamp changes belong to the owning store.
#[derive(Clone, Debug)]
pub enum Vertex {
    Entity(EntityNode),
}

impl Vertex {
    /// Rebuilds the concrete variant named by `vertex_type` from stored state.
    pub fn from_parts(
        vertex_type: VertexType,
        id: impl Into<String>,
        degree: u64,
        ts: i64,
    ) -> ValidationResult<Self> {
        match vertex_type {
            VertexType::Entity => Ok(Vertex::Entity(EntityNode::with_state(id, degree, ts)?)),
        }
    }

    fn kind(&self) -> &dyn VertexKind {
        match self {
            Vertex::Entity(node) => node,
        }
    }

    fn kind_mut(&mut self) -> &mut dyn VertexKind {
        match self {
            Vertex::Entity(node) => node,
        }
    }

    pub fn vertex_type(&self) -> VertexType {
        self.kind().vertex_type()
    }

    /// Returns an independent duplicate of this vertex.
    pub fn copy(&self) -> Vertex {
        self.clone()
    }

    pub fn label(&self) -> String {
        self.kind().label()
    }

    pub fn raw(&self) -> String {
        self.kind().raw()
    }

    pub fn id(&self) -> &VertexId {
        self.kind().header().id()
    }

    pub fn degree(&self) -> u64 {
        self.kind().header().degree
    }

    pub fn ts(&self) -> i64 {
        self.kind().header().ts
    }

    pub fn is_persisted(&self) -> bool {
        self.ts() != TS_UNASSIGNED
    }

    pub fn set_degree(&mut self, degree: u64) {
        self.kind_mut().header_mut().degree = degree;
    }

    pub fn set_ts(&mut self, ts: i64) {
        self.kind_mut().header_mut().ts = ts;
    }

    pub fn as_entity(&self) -> Option<&EntityNode> {
        match self {
            Vertex::Entity(node) => Some(node),
        }
    }
}

impl From<EntityNode> for Vertex {
    fn from(node: EntityNode) -> Self {
        Vertex::Entity(node)
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Vertex) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.id())
    }
}

/// Flat persisted form of a vertex.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    #[serde(rename = "type")]
    pub vertex_type: VertexType,
    pub id: String,
    pub degree: u64,
    pub ts: i64,
}

impl From<&Vertex> for VertexRecord {
    fn from(vertex: &Vertex) -> Self {
        VertexRecord {
            vertex_type: vertex.vertex_type(),
            id: vertex.id().to_string(),
            degree: vertex.degree(),
            ts: vertex.ts(),
        }
    }
}

impl TryFrom<VertexRecord> for Vertex {
    type Error = ValidationError;

    fn try_from(record: VertexRecord) -> ValidationResult<Self> {
        Vertex::from_parts(record.vertex_type, record.id, record.degree, record.ts)
    }
}
