//! Error types for engine access

use thiserror::Error;

use crate::types::ObjectId;

/// Errors returned by [`Engine`](super::Engine) implementations
#[derive(Debug, Error)]
pub enum EngineError {
    /// No object with this id exists (or it was removed)
    #[error("Object {0} not found")]
    ObjectNotFound(ObjectId),

    /// The object exists but does not support the requested operation
    #[error("Object {id} does not support {operation}")]
    Unsupported { id: ObjectId, operation: &'static str },

    /// No array with this name exists
    #[error("Array '{0}' not found")]
    ArrayNotFound(String),

    /// An array with this name already exists
    #[error("Array '{0}' already exists")]
    ArrayExists(String),

    /// A write would run past the end of an array
    #[error("Write of {len} values at offset {offset} exceeds array '{name}' (size {size})")]
    ArrayOutOfRange {
        name: String,
        offset: usize,
        len: usize,
        size: usize,
    },

    /// The engine does not know how to create this object
    #[error("Cannot create object '{0}'")]
    UnknownObject(String),

    /// The backing engine reported a failure
    #[error("Engine backend error: {0}")]
    Backend(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::ArrayOutOfRange {
            name: "table1".to_string(),
            offset: 90,
            len: 20,
            size: 100,
        };
        assert!(err.to_string().contains("table1"));
        assert!(err.to_string().contains("size 100"));

        let err = EngineError::Unsupported {
            id: 7,
            operation: "read_array",
        };
        assert!(err.to_string().contains("read_array"));
    }
}
