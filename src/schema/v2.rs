use serde::{Deserialize, Serialize};

pub const V2_VERSION: &str = "2.0";

/// Compacted form of a context document.
///
/// Every string lives once in `strings`; every record is a positional array
/// whose slots are string-table indices, enum codes, epochs or index lists.
/// Sessions reference the four item arrays by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayeredDocument {
    #[serde(rename = "v", alias = "version")]
    pub version: String,
    pub meta: Meta,
    pub strings: Vec<String>,
    #[serde(default)]
    pub sessions: Vec<Record>,
    #[serde(default)]
    pub decisions: Vec<Record>,
    #[serde(default)]
    pub files: Vec<Record>,
    #[serde(default)]
    pub patterns: Vec<Record>,
    #[serde(default)]
    pub blockers: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Meta {
    #[serde(rename = "p", alias = "project")]
    pub project: String,
    #[serde(rename = "c", alias = "createdEpoch", default)]
    pub created: Option<i64>,
    #[serde(rename = "u", alias = "updatedEpoch", default)]
    pub updated: Option<i64>,
}

/// One positional record as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Vec<Slot>);

impl Record {
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot {
    Null,
    Int(i64),
    List(Vec<i64>),
}

impl Slot {
    #[must_use]
    pub fn index(value: usize) -> Self {
        Self::Int(slot_int(value))
    }

    #[must_use]
    pub fn indices(values: &[usize]) -> Self {
        Self::List(values.iter().copied().map(slot_int).collect())
    }
}

// Vec lengths never exceed isize::MAX, so on 64-bit and narrower targets
// the conversion cannot fail and the fallback is unreachable.
fn slot_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
