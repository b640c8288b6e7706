//! Fidelity checks over the codec.

use std::collections::HashMap;

use crate::decode::decode;
use crate::encode::encode;
use crate::error::CodecError;
use crate::record::RecordKind;
use crate::schema::{ContextDocument, LayeredDocument, Record, Session, Slot};
use crate::timestamp;

/// Returns `document` with every timestamp in canonical form.
pub fn normalize(document: &ContextDocument) -> Result<ContextDocument, CodecError> {
    let mut normalized = document.clone();
    normalized.created = timestamp::canonicalize(&document.created, "created")?;
    normalized.updated = timestamp::canonicalize(&document.updated, "updated")?;

    for (at, session) in normalized.sessions.iter_mut().enumerate() {
        session.start =
            timestamp::canonicalize(&session.start, &format!("sessions[{at}].start"))?;
        session.end = session
            .end
            .as_deref()
            .map(|end| timestamp::canonicalize(end, &format!("sessions[{at}].end")))
            .transpose()?;
    }

    Ok(normalized)
}

/// Encodes and decodes `document`, returning the field paths whose values
/// did not survive. An empty list means the round trip was faithful.
pub fn round_trip(document: &ContextDocument) -> Result<Vec<String>, CodecError> {
    divergent_fields(document, &encode(document)?)
}

/// Decodes `layered` and lists the field paths where it differs from
/// `document`, for callers that already hold the encoding.
pub fn divergent_fields(
    document: &ContextDocument,
    layered: &LayeredDocument,
) -> Result<Vec<String>, CodecError> {
    let expected = normalize(document)?;
    let decoded = decode(layered)?;
    Ok(diff_documents(&expected, &decoded))
}

/// Structural problems found in a layered document without decoding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayeredIssue {
    DuplicateString { first: usize, duplicate: usize },
    DanglingIndex { record: RecordKind, at: usize },
}

/// Checks string uniqueness and that every index slot resolves.
#[must_use]
pub fn check_layered(document: &LayeredDocument) -> Vec<LayeredIssue> {
    let mut issues = Vec::new();

    let mut seen = HashMap::new();
    for (index, value) in document.strings.iter().enumerate() {
        if let Some(first) = seen.insert(value.as_str(), index) {
            issues.push(LayeredIssue::DuplicateString {
                first,
                duplicate: index,
            });
        }
    }

    let strings = document.strings.len();
    check_records(
        RecordKind::Session,
        &document.sessions,
        &[
            Some(strings),
            None,
            None,
            Some(strings),
            None,
            Some(document.decisions.len()),
            Some(document.files.len()),
            Some(document.patterns.len()),
            Some(document.blockers.len()),
            Some(strings),
            Some(strings),
        ],
        &mut issues,
    );
    check_records(
        RecordKind::Decision,
        &document.decisions,
        &[Some(strings); 5],
        &mut issues,
    );
    check_records(
        RecordKind::File,
        &document.files,
        &[Some(strings), None, Some(strings), Some(strings), None],
        &mut issues,
    );
    check_records(
        RecordKind::Pattern,
        &document.patterns,
        &[Some(strings); 2],
        &mut issues,
    );
    check_records(
        RecordKind::Blocker,
        &document.blockers,
        &[Some(strings), Some(strings), None],
        &mut issues,
    );

    issues
}

/// `targets[position]` is the length of the array that slot indexes into, or
/// `None` for slots holding codes and epochs.
fn check_records(
    kind: RecordKind,
    records: &[Record],
    targets: &[Option<usize>],
    issues: &mut Vec<LayeredIssue>,
) {
    for (at, record) in records.iter().enumerate() {
        let dangling = record
            .slots()
            .iter()
            .zip(targets)
            .any(|(slot, target)| match (slot, target) {
                (Slot::Int(value), Some(len)) => !in_bounds(*value, *len),
                (Slot::List(values), Some(len)) => {
                    values.iter().any(|value| !in_bounds(*value, *len))
                }
                _ => false,
            });
        if dangling {
            issues.push(LayeredIssue::DanglingIndex { record: kind, at });
        }
    }
}

fn in_bounds(value: i64, len: usize) -> bool {
    usize::try_from(value).is_ok_and(|index| index < len)
}

fn diff_documents(expected: &ContextDocument, actual: &ContextDocument) -> Vec<String> {
    let mut divergent = Vec::new();

    if expected.version != actual.version {
        divergent.push("v".to_string());
    }
    if expected.project != actual.project {
        divergent.push("project".to_string());
    }
    if expected.created != actual.created {
        divergent.push("created".to_string());
    }
    if expected.updated != actual.updated {
        divergent.push("updated".to_string());
    }
    if expected.sessions.len() != actual.sessions.len() {
        divergent.push("sessions".to_string());
        return divergent;
    }

    for (at, (left, right)) in expected.sessions.iter().zip(&actual.sessions).enumerate() {
        diff_session(at, left, right, &mut divergent);
    }

    divergent
}

fn diff_session(at: usize, expected: &Session, actual: &Session, divergent: &mut Vec<String>) {
    let fields: [(&str, bool); 11] = [
        ("id", expected.id == actual.id),
        ("start", expected.start == actual.start),
        ("end", expected.end == actual.end),
        ("goal", expected.goal == actual.goal),
        ("state", expected.state == actual.state),
        ("decisions", expected.decisions == actual.decisions),
        ("files", expected.files == actual.files),
        ("patterns", expected.patterns == actual.patterns),
        ("blockers", expected.blockers == actual.blockers),
        ("next", expected.next == actual.next),
        ("kv", expected.kv == actual.kv),
    ];

    divergent.extend(
        fields
            .into_iter()
            .filter(|(_, equal)| !equal)
            .map(|(field, _)| format!("sessions[{at}].{field}")),
    );
}
