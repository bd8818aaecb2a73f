// models/src/lib.rs

//! Vertex types shared across the graph store: structured vertex ids, the
//! polymorphic [`Vertex`] and its variants, and the error types they raise.

pub mod entity;
pub mod errors;
pub mod identifiers;
pub mod vertices;

pub use entity::EntityNode;
pub use errors::{GraphError, GraphResult, ValidationError, ValidationResult};
pub use identifiers::{Identifier, VertexId};
pub use vertices::{Vertex, VertexHeader, VertexKind, VertexRecord, VertexType, TS_UNASSIGNED};
