// models/src/entity.rs
use core::hash::{Hash, Hasher};

use crate::{
    errors::ValidationResult,
    identifiers::{self, VertexId, WORD_SEPARATOR},
    vertices::{VertexHeader, VertexKind, VertexType},
};

/// A vertex standing for a named real-world entity, e.g. `people/alan_turing`.
///
/// Its text and label are derived from the id rather than stored.
#[derive(Clone, Debug)]
pub struct EntityNode {
    header: VertexHeader,
}

impl EntityNode {
    /// Creates a fresh, unpersisted entity (degree 0, timestamp unassigned).
    ///
    /// # Errors
    /// `InvalidIdentifier` if `id` is not of the form `namespace/local-part`.
    pub fn new(id: impl Into<String>) -> ValidationResult<Self> {
        Ok(Self::from_id(VertexId::parse(id)?))
    }

    /// Rebuilds an entity from persisted state.
    pub fn with_state(id: impl Into<String>, degree: u64, ts: i64) -> ValidationResult<Self> {
        Ok(EntityNode {
            header: VertexHeader::new(VertexId::parse(id)?, degree, ts),
        })
    }

    pub fn from_id(id: VertexId) -> Self {
        EntityNode {
            header: VertexHeader::fresh(id),
        }
    }

    /// Builds the id an entity named `text` gets inside `namespace`:
    /// `namespace/` followed by the lowercased, sanitized text.
    ///
    /// ```
    /// use models::EntityNode;
    /// assert_eq!(EntityNode::id("people", "Alan Turing"), "people/alan_turing");
    /// ```
    pub fn id(namespace: &str, text: &str) -> String {
        identifiers::build(namespace, &identifiers::sanitize(text).to_lowercase())
    }

    /// Mints a fresh entity for `text` inside `namespace`.
    ///
    /// # Errors
    /// `InvalidIdentifier` when the text sanitizes to nothing or the namespace
    /// is empty.
    pub fn from_ns_and_text(namespace: &str, text: &str) -> ValidationResult<Self> {
        Self::new(Self::id(namespace, text))
    }

    pub fn vertex_id(&self) -> &VertexId {
        self.header.id()
    }

    pub fn degree(&self) -> u64 {
        self.header.degree
    }

    pub fn ts(&self) -> i64 {
        self.header.ts
    }

    /// The local part of the id with word separators turned back into spaces.
    pub fn text(&self) -> String {
        self.vertex_id().local_part().replace(WORD_SEPARATOR, " ")
    }

    pub fn copy(&self) -> EntityNode {
        self.clone()
    }
}

impl VertexKind for EntityNode {
    fn vertex_type(&self) -> VertexType {
        VertexType::Entity
    }

    /// The text with its first character uppercased. Empty text gives an empty label.
    fn label(&self) -> String {
        let text = self.text();
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    fn raw(&self) -> String {
        format!("type: {}<br />id: {}<br />", self.vertex_type(), self.vertex_id())
    }

    fn header(&self) -> &VertexHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut VertexHeader {
        &mut self.header
    }
}

impl PartialEq for EntityNode {
    fn eq(&self, other: &EntityNode) -> bool {
        self.vertex_id() == other.vertex_id()
    }
}

impl Eq for EntityNode {}

impl Hash for EntityNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vertex_id().hash(state);
    }
}
