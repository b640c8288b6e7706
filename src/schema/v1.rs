use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const V1_VERSION: &str = "1.0";

/// Labeled, human-legible form of a context document.
///
/// Enumerated fields (`state`, `action`, `status`) are kept as their textual
/// labels so that an unrecognized label survives parsing and is rejected by
/// the encoder with a located error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextDocument {
    #[serde(rename = "v", alias = "version")]
    pub version: String,
    pub project: String,
    pub created: String,
    pub updated: String,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl ContextDocument {
    #[must_use]
    pub fn v1(
        project: impl Into<String>,
        created: impl Into<String>,
        updated: impl Into<String>,
    ) -> Self {
        Self {
            version: V1_VERSION.to_string(),
            project: project.into(),
            created: created.into(),
            updated: updated.into(),
            sessions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Session {
    pub id: String,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    pub goal: String,
    pub state: String,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub files: BTreeMap<String, FileEntry>,
    #[serde(default)]
    pub patterns: BTreeMap<String, String>,
    #[serde(default)]
    pub blockers: Vec<Blocker>,
    #[serde(default)]
    pub next: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kv: Option<BTreeMap<String, String>>,
}

impl Session {
    /// An open session with no recorded items.
    #[must_use]
    pub fn open(
        id: impl Into<String>,
        start: impl Into<String>,
        goal: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            start: start.into(),
            end: None,
            goal: goal.into(),
            state: "in_progress".to_string(),
            decisions: Vec::new(),
            files: BTreeMap::new(),
            patterns: BTreeMap::new(),
            blockers: Vec::new(),
            next: Vec::new(),
            kv: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Decision {
    pub id: String,
    pub what: String,
    pub why: String,
    #[serde(default)]
    pub alt: Vec<String>,
    #[serde(default)]
    pub impact: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
    pub action: String,
    pub role: String,
    #[serde(default)]
    pub deps: Vec<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Blocker {
    pub id: String,
    pub desc: String,
    pub status: String,
}
