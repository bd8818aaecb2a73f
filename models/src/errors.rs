// models/src/errors.rs

use std::io;
pub use thiserror::Error;
use anyhow::Error as AnyhowError;

use crate::identifiers::Identifier;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Storage error: {0}")]
    StorageError(String), // General storage operation error
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Storage engine is not running: {0}")]
    NotRunning(String),

    #[error("entity with identifier {0} was not found")]
    NotFound(Identifier),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::SerializationError(format!("JSON processing error: {}", err))
    }
}

impl From<rmp_serde::encode::Error> for GraphError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        GraphError::SerializationError(format!("MessagePack encode error: {}", err))
    }
}

impl From<rmp_serde::decode::Error> for GraphError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        GraphError::DeserializationError(format!("MessagePack decode error: {}", err))
    }
}

impl From<AnyhowError> for GraphError {
    fn from(err: AnyhowError) -> Self {
        GraphError::StorageError(format!("Underlying storage operation failed: {}", err))
    }
}

/// A validation error.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// An identifier is malformed: empty, or missing the `namespace/local`
    /// shape a vertex id requires.
    #[error("identifier '{0}' is invalid")]
    InvalidIdentifier(String),
    /// An identifier is empty.
    #[error("identifier has invalid length")]
    InvalidIdentifierLength,
    /// A stored type tag does not name any known vertex variant.
    #[error("unknown vertex type '{0}'")]
    UnknownVertexType(String),
}

/// A type alias for a `Result` that returns a `GraphError` on failure.
pub type GraphResult<T> = Result<T, GraphError>;

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::{GraphError, ValidationError};

    #[test]
    fn validation_error_converts_into_graph_error() {
        let err: GraphError = ValidationError::InvalidIdentifier("people".to_string()).into();
        assert!(matches!(
            err,
            GraphError::Validation(ValidationError::InvalidIdentifier(ref id)) if id == "people"
        ));
        assert_eq!(err.to_string(), "identifier 'people' is invalid");
    }

    #[test]
    fn msgpack_decode_error_maps_to_deserialization_error() {
        let decode_err = rmp_serde::from_slice::<String>(&[0xc1]).unwrap_err();
        let err: GraphError = decode_err.into();
        assert!(matches!(err, GraphError::DeserializationError(_)));
    }
}
