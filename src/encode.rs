use crate::enums::{parse_label, BlockerStatus, FileAction, FileStatus, SessionState};
use crate::error::CodecError;
use crate::interner::StringTable;
use crate::record::{BlockerRecord, DecisionRecord, FileRecord, PatternRecord, SessionRecord};
use crate::schema::{
    Blocker, ContextDocument, Decision, FileEntry, LayeredDocument, Meta, Record, Session,
    V1_VERSION, V2_VERSION,
};
use crate::timestamp;

/// Compacts a V1 document into its layered V2 form.
///
/// Strings are interned in traversal order: per session the id and goal,
/// then decisions, files, patterns, blockers, next steps and kv pairs. Items
/// are owned by their session and never merged across sessions, even when
/// their content is identical.
pub fn encode(document: &ContextDocument) -> Result<LayeredDocument, CodecError> {
    if document.version != V1_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: document.version.clone(),
            expected: V1_VERSION,
        });
    }
    require_non_empty(&document.project, "project")?;

    let mut encoder = Encoder::default();
    for (at, session) in document.sessions.iter().enumerate() {
        encoder.session(at, session)?;
    }

    let meta = Meta {
        project: document.project.clone(),
        created: Some(timestamp::to_epoch(&document.created, "created")?),
        updated: Some(timestamp::to_epoch(&document.updated, "updated")?),
    };

    Ok(LayeredDocument {
        version: V2_VERSION.to_string(),
        meta,
        strings: encoder.strings.into_strings(),
        sessions: encoder.sessions,
        decisions: encoder.decisions,
        files: encoder.files,
        patterns: encoder.patterns,
        blockers: encoder.blockers,
    })
}

#[derive(Default)]
struct Encoder {
    strings: StringTable,
    sessions: Vec<Record>,
    decisions: Vec<Record>,
    files: Vec<Record>,
    patterns: Vec<Record>,
    blockers: Vec<Record>,
}

impl Encoder {
    fn session(&mut self, at: usize, session: &Session) -> Result<(), CodecError> {
        let base = format!("sessions[{at}]");
        require_non_empty(&session.id, &format!("{base}.id"))?;

        let id = self.strings.intern(&session.id);
        let goal = self.strings.intern(&session.goal);
        let start = timestamp::to_epoch(&session.start, &format!("{base}.start"))?;
        let end = timestamp::to_epoch_opt(session.end.as_deref(), &format!("{base}.end"))?;
        let state = parse_label::<SessionState>(&session.state, &format!("{base}.state"))?;

        let decisions = session
            .decisions
            .iter()
            .enumerate()
            .map(|(position, decision)| {
                self.decision(decision, &format!("{base}.decisions[{position}]"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let files = session
            .files
            .iter()
            .map(|(path, entry)| self.file(path, entry, &format!("{base}.files[{path:?}]")))
            .collect::<Result<Vec<_>, _>>()?;

        let patterns = session
            .patterns
            .iter()
            .map(|(name, desc)| self.pattern(name, desc, &format!("{base}.patterns")))
            .collect::<Result<Vec<_>, _>>()?;

        let blockers = session
            .blockers
            .iter()
            .enumerate()
            .map(|(position, blocker)| {
                self.blocker(blocker, &format!("{base}.blockers[{position}]"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let next = self.strings.intern_all(&session.next);

        let kv = session.kv.as_ref().map(|pairs| {
            pairs
                .iter()
                .map(|(key, value)| (self.strings.intern(key), self.strings.intern(value)))
                .collect::<Vec<_>>()
        });

        let record = SessionRecord {
            id,
            start,
            end,
            goal,
            state,
            decisions,
            files,
            patterns,
            blockers,
            next,
            kv,
        };
        self.sessions.push(record.into_record());
        Ok(())
    }

    fn decision(&mut self, decision: &Decision, field: &str) -> Result<usize, CodecError> {
        require_non_empty(&decision.id, &format!("{field}.id"))?;

        let record = DecisionRecord {
            id: self.strings.intern(&decision.id),
            what: self.strings.intern(&decision.what),
            why: self.strings.intern(&decision.why),
            alt: self.strings.intern_all(&decision.alt),
            impact: self.strings.intern_all(&decision.impact),
        };
        Ok(push(&mut self.decisions, record.into_record()))
    }

    fn file(&mut self, path: &str, entry: &FileEntry, field: &str) -> Result<usize, CodecError> {
        require_non_empty(path, field)?;
        let action = parse_label::<FileAction>(&entry.action, &format!("{field}.action"))?;
        let status = parse_label::<FileStatus>(&entry.status, &format!("{field}.status"))?;

        let record = FileRecord {
            path: self.strings.intern(path),
            action,
            role: self.strings.intern(&entry.role),
            deps: self.strings.intern_all(&entry.deps),
            status,
        };
        Ok(push(&mut self.files, record.into_record()))
    }

    fn pattern(&mut self, name: &str, desc: &str, field: &str) -> Result<usize, CodecError> {
        require_non_empty(name, field)?;

        let record = PatternRecord {
            name: self.strings.intern(name),
            desc: self.strings.intern(desc),
        };
        Ok(push(&mut self.patterns, record.into_record()))
    }

    fn blocker(&mut self, blocker: &Blocker, field: &str) -> Result<usize, CodecError> {
        require_non_empty(&blocker.id, &format!("{field}.id"))?;
        let status = parse_label::<BlockerStatus>(&blocker.status, &format!("{field}.status"))?;

        let record = BlockerRecord {
            id: self.strings.intern(&blocker.id),
            desc: self.strings.intern(&blocker.desc),
            status,
        };
        Ok(push(&mut self.blockers, record.into_record()))
    }
}

fn push(items: &mut Vec<Record>, record: Record) -> usize {
    items.push(record);
    items.len() - 1
}

fn require_non_empty(value: &str, field: &str) -> Result<(), CodecError> {
    if value.is_empty() {
        return Err(CodecError::missing(field));
    }
    Ok(())
}
