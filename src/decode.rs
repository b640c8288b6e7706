use std::collections::BTreeMap;

use crate::enums::CodeTable;
use crate::error::CodecError;
use crate::record::{
    BlockerRecord, Bounds, DecisionRecord, FileRecord, PatternRecord, RecordKind, RecordReader,
    SessionRecord,
};
use crate::schema::{
    Blocker, ContextDocument, Decision, FileEntry, LayeredDocument, Record, Session, V1_VERSION,
    V2_VERSION,
};
use crate::timestamp;

/// Expands a layered V2 document back into its labeled V1 form.
///
/// The whole document is validated (version, arity, slot shapes, enum codes,
/// index bounds) before any V1 value is built.
pub fn decode(document: &LayeredDocument) -> Result<ContextDocument, CodecError> {
    if document.version != V2_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: document.version.clone(),
            expected: V2_VERSION,
        });
    }

    let bounds = Bounds {
        strings: document.strings.len(),
        decisions: document.decisions.len(),
        files: document.files.len(),
        patterns: document.patterns.len(),
        blockers: document.blockers.len(),
    };

    let sessions = read_all(
        &document.sessions,
        RecordKind::Session,
        &bounds,
        SessionRecord::read,
    )?;
    let decisions = read_all(
        &document.decisions,
        RecordKind::Decision,
        &bounds,
        DecisionRecord::read,
    )?;
    let files = read_all(&document.files, RecordKind::File, &bounds, FileRecord::read)?;
    let patterns = read_all(
        &document.patterns,
        RecordKind::Pattern,
        &bounds,
        PatternRecord::read,
    )?;
    let blockers = read_all(
        &document.blockers,
        RecordKind::Blocker,
        &bounds,
        BlockerRecord::read,
    )?;

    let created = document
        .meta
        .created
        .ok_or_else(|| CodecError::missing("meta.c"))?;
    let updated = document
        .meta
        .updated
        .ok_or_else(|| CodecError::missing("meta.u"))?;

    let items = Items {
        strings: &document.strings,
        decisions: &decisions,
        files: &files,
        patterns: &patterns,
        blockers: &blockers,
    };

    let sessions = sessions
        .into_iter()
        .enumerate()
        .map(|(at, record)| items.session(at, record))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ContextDocument {
        version: V1_VERSION.to_string(),
        project: document.meta.project.clone(),
        created: timestamp::to_text(created, "meta.c")?,
        updated: timestamp::to_text(updated, "meta.u")?,
        sessions,
    })
}

fn read_all<T>(
    records: &[Record],
    kind: RecordKind,
    bounds: &Bounds,
    read: fn(&RecordReader<'_>) -> Result<T, CodecError>,
) -> Result<Vec<T>, CodecError> {
    records
        .iter()
        .enumerate()
        .map(|(at, record)| read(&RecordReader::new(kind, at, record, bounds)?))
        .collect()
}

/// Validated item arrays; every index handed to these lookups is in bounds.
struct Items<'a> {
    strings: &'a [String],
    decisions: &'a [DecisionRecord],
    files: &'a [FileRecord],
    patterns: &'a [PatternRecord],
    blockers: &'a [BlockerRecord],
}

impl Items<'_> {
    fn string(&self, index: usize) -> String {
        self.strings[index].clone()
    }

    fn string_list(&self, indices: &[usize]) -> Vec<String> {
        indices.iter().map(|index| self.string(*index)).collect()
    }

    fn session(&self, at: usize, record: SessionRecord) -> Result<Session, CodecError> {
        let base = format!("sessions[{at}]");

        let decisions = record
            .decisions
            .iter()
            .map(|index| {
                let decision = &self.decisions[*index];
                Decision {
                    id: self.string(decision.id),
                    what: self.string(decision.what),
                    why: self.string(decision.why),
                    alt: self.string_list(&decision.alt),
                    impact: self.string_list(&decision.impact),
                }
            })
            .collect();

        let files = record
            .files
            .iter()
            .map(|index| {
                let file = &self.files[*index];
                let entry = FileEntry {
                    action: file.action.label().to_string(),
                    role: self.string(file.role),
                    deps: self.string_list(&file.deps),
                    status: file.status.label().to_string(),
                };
                (self.string(file.path), entry)
            });
        let files = rekey(files, at, "files", "file records with distinct paths")?;

        let patterns = record
            .patterns
            .iter()
            .map(|index| {
                let pattern = &self.patterns[*index];
                (self.string(pattern.name), self.string(pattern.desc))
            });
        let patterns = rekey(patterns, at, "patterns", "pattern records with distinct names")?;

        let blockers = record
            .blockers
            .iter()
            .map(|index| {
                let blocker = &self.blockers[*index];
                Blocker {
                    id: self.string(blocker.id),
                    desc: self.string(blocker.desc),
                    status: blocker.status.label().to_string(),
                }
            })
            .collect();

        let kv = record
            .kv
            .map(|pairs| {
                let pairs = pairs
                    .into_iter()
                    .map(|(key, value)| (self.string(key), self.string(value)));
                rekey(pairs, at, "kv", "distinct keys")
            })
            .transpose()?;

        Ok(Session {
            id: self.string(record.id),
            start: timestamp::to_text(record.start, &format!("{base}.start"))?,
            end: timestamp::to_text_opt(record.end, &format!("{base}.end"))?,
            goal: self.string(record.goal),
            state: record.state.label().to_string(),
            decisions,
            files,
            patterns,
            blockers,
            next: self.string_list(&record.next),
            kv,
        })
    }
}

/// Collects keyed entries of session `at`, refusing a key seen twice rather
/// than letting the later entry replace the earlier one.
fn rekey<V>(
    entries: impl Iterator<Item = (String, V)>,
    at: usize,
    field: &'static str,
    expected: &'static str,
) -> Result<BTreeMap<String, V>, CodecError> {
    let mut map = BTreeMap::new();
    for (key, value) in entries {
        if map.insert(key, value).is_some() {
            return Err(CodecError::MalformedRecord {
                record: RecordKind::Session,
                at,
                field,
                expected,
            });
        }
    }
    Ok(map)
}
