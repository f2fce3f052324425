//! Error types for the libpd backend

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::EngineError;

/// Errors raised while driving a libpd instance
#[derive(Debug, Error)]
pub enum PdError {
    #[error("Failed to initialize libpd: {0}")]
    InitializationFailed(String),

    #[error("Failed to open patch '{path}': {reason}")]
    PatchOpenFailed { path: PathBuf, reason: String },

    #[error("Patch file not found: {0}")]
    PatchNotFound(PathBuf),

    #[error("Failed to send {msg_type} to receiver '{receiver}': {reason}")]
    SendFailed {
        msg_type: &'static str,
        receiver: String,
        reason: String,
    },

    #[error("Failed to listen on '{receiver}': {reason}")]
    ListenFailed { receiver: String, reason: String },

    #[error("Array '{name}': {reason}")]
    ArrayAccess { name: String, reason: String },

    #[error("Invalid binding manifest '{path}': {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type PdResult<T> = Result<T, PdError>;

impl From<PdError> for EngineError {
    fn from(err: PdError) -> Self {
        match err {
            PdError::ArrayAccess { name, .. } => EngineError::ArrayNotFound(name),
            other => EngineError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PdError::PatchNotFound(PathBuf::from("/patches/synth.pd"));
        assert!(err.to_string().contains("/patches/synth.pd"));

        let err = PdError::SendFailed {
            msg_type: "float",
            receiver: "vol".to_string(),
            reason: "no such receiver".to_string(),
        };
        assert!(err.to_string().contains("'vol'"));
    }

    #[test]
    fn test_array_errors_map_to_engine_errors() {
        let err: EngineError = PdError::ArrayAccess {
            name: "table1".to_string(),
            reason: "missing".to_string(),
        }
        .into();
        assert!(matches!(err, EngineError::ArrayNotFound(name) if name == "table1"));
    }
}
