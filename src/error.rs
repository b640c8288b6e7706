use thiserror::Error;

use crate::record::RecordKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("field '{field}' has malformed RFC3339 timestamp: {value}")]
    MalformedTimestamp { field: String, value: String },

    #[error("field '{field}' has unknown {table} label '{label}'")]
    UnknownEnumLabel {
        table: &'static str,
        field: String,
        label: String,
    },

    #[error("{record} record {at} has unknown {table} code {code}")]
    UnknownEnumCode {
        table: &'static str,
        record: RecordKind,
        at: usize,
        code: i64,
    },

    #[error("{record} record {at} has {found} positions; expected {expected}")]
    ArityMismatch {
        record: RecordKind,
        at: usize,
        expected: usize,
        found: usize,
    },

    #[error("{record} record {at} references {target} index {index} but only {len} exist")]
    IndexOutOfRange {
        record: RecordKind,
        at: usize,
        target: &'static str,
        index: i64,
        len: usize,
    },

    #[error("unsupported format version '{found}'; expected '{expected}'")]
    UnsupportedVersion {
        found: String,
        expected: &'static str,
    },

    #[error("missing required field '{field}'")]
    MissingRequiredField { field: String },

    #[error("{record} record {at} has a malformed '{field}' slot; expected {expected}")]
    MalformedRecord {
        record: RecordKind,
        at: usize,
        field: &'static str,
        expected: &'static str,
    },
}

impl CodecError {
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }

    #[must_use]
    pub fn malformed_timestamp(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MalformedTimestamp {
            field: field.into(),
            value: value.into(),
        }
    }
}
