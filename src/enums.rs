//! Closed label/code tables for the enumerated fields of a context document.
//!
//! The tables are part of the versioned V2 format. Adding, removing or
//! renumbering a variant requires a new format version.

use crate::error::CodecError;
use crate::record::RecordKind;

/// Bijection between a fixed set of textual labels and small integer codes.
pub trait CodeTable: Copy + Sized + 'static {
    /// Name used in error messages.
    const TABLE: &'static str;
    const ALL: &'static [Self];

    fn code(self) -> u8;
    fn label(self) -> &'static str;

    #[must_use]
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|variant| variant.label() == label)
    }

    #[must_use]
    fn from_code(code: i64) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|variant| i64::from(variant.code()) == code)
    }
}

macro_rules! code_table {
    (
        $(#[$meta:meta])*
        $name:ident, $table:literal {
            $($variant:ident = $code:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl CodeTable for $name {
            const TABLE: &'static str = $table;
            const ALL: &'static [Self] = &[$(Self::$variant,)+];

            fn code(self) -> u8 {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }
    };
}

code_table! {
    /// Lifecycle state of a session.
    SessionState, "session state" {
        InProgress = 0 => "in_progress",
        Completed = 1 => "completed",
        Blocked = 2 => "blocked",
        Cancelled = 3 => "cancelled",
    }
}

code_table! {
    /// What a session did to a file.
    FileAction, "file action" {
        Created = 0 => "created",
        Modified = 1 => "modified",
        Deleted = 2 => "deleted",
        Renamed = 3 => "renamed",
    }
}

code_table! {
    FileStatus, "file status" {
        Complete = 0 => "complete",
        Partial = 1 => "partial",
        Blocked = 2 => "blocked",
        Pending = 3 => "pending",
    }
}

code_table! {
    BlockerStatus, "blocker status" {
        Open = 0 => "open",
        Resolved = 1 => "resolved",
        Wontfix = 2 => "wontfix",
    }
}

pub(crate) fn parse_label<T: CodeTable>(label: &str, field: &str) -> Result<T, CodecError> {
    T::from_label(label).ok_or_else(|| CodecError::UnknownEnumLabel {
        table: T::TABLE,
        field: field.to_string(),
        label: label.to_string(),
    })
}

pub(crate) fn parse_code<T: CodeTable>(
    code: i64,
    record: RecordKind,
    at: usize,
) -> Result<T, CodecError> {
    T::from_code(code).ok_or(CodecError::UnknownEnumCode {
        table: T::TABLE,
        record,
        at,
        code,
    })
}
