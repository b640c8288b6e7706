use std::path::PathBuf;

use session_ctx::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextStoreError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize context document for {path}: {source}")]
    JsonSerialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("context file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("output file already exists: {path}; pass overwrite to replace it")]
    OutputExists { path: PathBuf },

    #[error("refusing to write decoded output over the source document {path}")]
    WouldOverwriteSource { path: PathBuf },

    #[error("codec failure for {path}: {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("encoding {path} would lose fields: {}", fields.join(", "))]
    RoundTripMismatch { path: PathBuf, fields: Vec<String> },
}

impl ContextStoreError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn json_parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::JsonParse {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn json_serialize(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::JsonSerialize {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn codec(path: impl Into<PathBuf>, source: CodecError) -> Self {
        Self::Codec {
            path: path.into(),
            source,
        }
    }
}
