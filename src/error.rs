//! Error types for the indexing core.
//!
//! Structured errors via thiserror. Domain anomalies inside the event
//! adapter are not errors: they are logged and the offending event skipped,
//! so a parse either crashes (shielded) or completes.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for indexing operations.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Frontend(#[from] FrontendError),

    /// Serialization format mismatch or codec failure.
    #[error("Index cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

/// Errors surfaced by the compiler frontend.
#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("frontend failed to produce a translation unit for '{path}'")]
    UnitCreation { path: PathBuf },

    /// Non-fatal reparse failure; the caller may retry or give up.
    #[error("frontend reparse failed with code {code}")]
    Reparse { code: i32 },
}

/// Errors specific to the serialized index-file formats.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("major version mismatch: cache has {found}, expected {expected}")]
    MajorVersion { found: u32, expected: u32 },

    #[error("binary minor version mismatch: cache has {found}, expected {expected}")]
    MinorVersion { found: u32, expected: u32 },

    #[error("truncated binary cache")]
    Truncated,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary codec error: {0}")]
    Binary(#[from] bincode::Error),
}

/// Result type alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontend_error_converts_to_index_error() {
        let err: IndexError = FrontendError::Reparse { code: 3 }.into();
        assert!(matches!(
            err,
            IndexError::Frontend(FrontendError::Reparse { code: 3 })
        ));
    }

    #[test]
    fn test_error_messages_name_the_path() {
        let err = IndexError::FileRead {
            path: PathBuf::from("/proj/util.h"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/proj/util.h"));
    }
}
