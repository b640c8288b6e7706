//! Typed views of the positional V2 records.
//!
//! Each record kind has a fixed arity. Reading a record checks arity, slot
//! shape, enum codes and index bounds before any value is handed out, so the
//! decoder only ever interprets fully validated records.

use std::fmt;

use crate::enums::{parse_code, BlockerStatus, CodeTable, FileAction, FileStatus, SessionState};
use crate::error::CodecError;
use crate::schema::{Record, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Session,
    Decision,
    File,
    Pattern,
    Blocker,
}

impl RecordKind {
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Session => 11,
            Self::Decision => 5,
            Self::File => 5,
            Self::Pattern => 2,
            Self::Blocker => 3,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Decision => "decision",
            Self::File => "file",
            Self::Pattern => "pattern",
            Self::Blocker => "blocker",
        }
    }

    /// Name of the V2 array holding records of this kind.
    #[must_use]
    pub const fn array(self) -> &'static str {
        match self {
            Self::Session => "sessions",
            Self::Decision => "decisions",
            Self::File => "files",
            Self::Pattern => "patterns",
            Self::Blocker => "blockers",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Array an index slot points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Strings,
    Items(RecordKind),
}

impl Target {
    const fn name(self) -> &'static str {
        match self {
            Self::Strings => "strings",
            Self::Items(kind) => kind.array(),
        }
    }
}

/// Lengths of every array of the document being decoded.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bounds {
    pub(crate) strings: usize,
    pub(crate) decisions: usize,
    pub(crate) files: usize,
    pub(crate) patterns: usize,
    pub(crate) blockers: usize,
}

impl Bounds {
    fn len(&self, target: Target) -> usize {
        match target {
            Target::Strings => self.strings,
            Target::Items(RecordKind::Decision) => self.decisions,
            Target::Items(RecordKind::File) => self.files,
            Target::Items(RecordKind::Pattern) => self.patterns,
            Target::Items(RecordKind::Blocker) => self.blockers,
            Target::Items(RecordKind::Session) => 0,
        }
    }
}

pub(crate) struct RecordReader<'a> {
    kind: RecordKind,
    at: usize,
    slots: &'a [Slot],
    bounds: &'a Bounds,
}

impl<'a> RecordReader<'a> {
    pub(crate) fn new(
        kind: RecordKind,
        at: usize,
        record: &'a Record,
        bounds: &'a Bounds,
    ) -> Result<Self, CodecError> {
        if record.len() != kind.arity() {
            return Err(CodecError::ArityMismatch {
                record: kind,
                at,
                expected: kind.arity(),
                found: record.len(),
            });
        }

        Ok(Self {
            kind,
            at,
            slots: record.slots(),
            bounds,
        })
    }

    fn field_path(&self, field: &str) -> String {
        format!("{}[{}].{}", self.kind.array(), self.at, field)
    }

    fn malformed(&self, field: &'static str, expected: &'static str) -> CodecError {
        CodecError::MalformedRecord {
            record: self.kind,
            at: self.at,
            field,
            expected,
        }
    }

    fn int_opt(&self, position: usize, field: &'static str) -> Result<Option<i64>, CodecError> {
        match &self.slots[position] {
            Slot::Null => Ok(None),
            Slot::Int(value) => Ok(Some(*value)),
            Slot::List(_) => Err(self.malformed(field, "an integer")),
        }
    }

    fn int(&self, position: usize, field: &'static str) -> Result<i64, CodecError> {
        self.int_opt(position, field)?
            .ok_or_else(|| CodecError::missing(self.field_path(field)))
    }

    fn list_opt(
        &self,
        position: usize,
        field: &'static str,
    ) -> Result<Option<&'a [i64]>, CodecError> {
        match &self.slots[position] {
            Slot::Null => Ok(None),
            Slot::List(values) => Ok(Some(values.as_slice())),
            Slot::Int(_) => Err(self.malformed(field, "a list of indices")),
        }
    }

    fn resolve(&self, value: i64, target: Target) -> Result<usize, CodecError> {
        let len = self.bounds.len(target);
        usize::try_from(value)
            .ok()
            .filter(|index| *index < len)
            .ok_or(CodecError::IndexOutOfRange {
                record: self.kind,
                at: self.at,
                target: target.name(),
                index: value,
                len,
            })
    }

    fn index(
        &self,
        position: usize,
        field: &'static str,
        target: Target,
    ) -> Result<usize, CodecError> {
        let value = self.int(position, field)?;
        self.resolve(value, target)
    }

    fn indices(
        &self,
        position: usize,
        field: &'static str,
        target: Target,
    ) -> Result<Vec<usize>, CodecError> {
        let values = self
            .list_opt(position, field)?
            .ok_or_else(|| CodecError::missing(self.field_path(field)))?;
        values
            .iter()
            .map(|value| self.resolve(*value, target))
            .collect()
    }

    fn code<T: CodeTable>(&self, position: usize, field: &'static str) -> Result<T, CodecError> {
        let value = self.int(position, field)?;
        parse_code(value, self.kind, self.at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SessionRecord {
    pub(crate) id: usize,
    pub(crate) start: i64,
    pub(crate) end: Option<i64>,
    pub(crate) goal: usize,
    pub(crate) state: SessionState,
    pub(crate) decisions: Vec<usize>,
    pub(crate) files: Vec<usize>,
    pub(crate) patterns: Vec<usize>,
    pub(crate) blockers: Vec<usize>,
    pub(crate) next: Vec<usize>,
    pub(crate) kv: Option<Vec<(usize, usize)>>,
}

impl SessionRecord {
    pub(crate) fn into_record(self) -> Record {
        let kv = match self.kv {
            Some(pairs) => {
                let flat = pairs
                    .into_iter()
                    .flat_map(|(key, value)| [key, value])
                    .collect::<Vec<_>>();
                Slot::indices(&flat)
            }
            None => Slot::Null,
        };

        Record(vec![
            Slot::index(self.id),
            Slot::Int(self.start),
            self.end.map_or(Slot::Null, Slot::Int),
            Slot::index(self.goal),
            Slot::Int(i64::from(self.state.code())),
            Slot::indices(&self.decisions),
            Slot::indices(&self.files),
            Slot::indices(&self.patterns),
            Slot::indices(&self.blockers),
            Slot::indices(&self.next),
            kv,
        ])
    }

    pub(crate) fn read(reader: &RecordReader<'_>) -> Result<Self, CodecError> {
        let kv = match reader.list_opt(10, "kv")? {
            None => None,
            Some(flat) if flat.len() % 2 != 0 => {
                return Err(reader.malformed("kv", "an even-length list of indices"));
            }
            Some(flat) => Some(
                flat.chunks_exact(2)
                    .map(|pair| {
                        Ok((
                            reader.resolve(pair[0], Target::Strings)?,
                            reader.resolve(pair[1], Target::Strings)?,
                        ))
                    })
                    .collect::<Result<Vec<_>, CodecError>>()?,
            ),
        };

        Ok(Self {
            id: reader.index(0, "id", Target::Strings)?,
            start: reader.int(1, "start")?,
            end: reader.int_opt(2, "end")?,
            goal: reader.index(3, "goal", Target::Strings)?,
            state: reader.code(4, "state")?,
            decisions: reader.indices(5, "decisions", Target::Items(RecordKind::Decision))?,
            files: reader.indices(6, "files", Target::Items(RecordKind::File))?,
            patterns: reader.indices(7, "patterns", Target::Items(RecordKind::Pattern))?,
            blockers: reader.indices(8, "blockers", Target::Items(RecordKind::Blocker))?,
            next: reader.indices(9, "next", Target::Strings)?,
            kv,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DecisionRecord {
    pub(crate) id: usize,
    pub(crate) what: usize,
    pub(crate) why: usize,
    pub(crate) alt: Vec<usize>,
    pub(crate) impact: Vec<usize>,
}

impl DecisionRecord {
    pub(crate) fn into_record(self) -> Record {
        Record(vec![
            Slot::index(self.id),
            Slot::index(self.what),
            Slot::index(self.why),
            Slot::indices(&self.alt),
            Slot::indices(&self.impact),
        ])
    }

    pub(crate) fn read(reader: &RecordReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            id: reader.index(0, "id", Target::Strings)?,
            what: reader.index(1, "what", Target::Strings)?,
            why: reader.index(2, "why", Target::Strings)?,
            alt: reader.indices(3, "alt", Target::Strings)?,
            impact: reader.indices(4, "impact", Target::Strings)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileRecord {
    pub(crate) path: usize,
    pub(crate) action: FileAction,
    pub(crate) role: usize,
    pub(crate) deps: Vec<usize>,
    pub(crate) status: FileStatus,
}

impl FileRecord {
    pub(crate) fn into_record(self) -> Record {
        Record(vec![
            Slot::index(self.path),
            Slot::Int(i64::from(self.action.code())),
            Slot::index(self.role),
            Slot::indices(&self.deps),
            Slot::Int(i64::from(self.status.code())),
        ])
    }

    pub(crate) fn read(reader: &RecordReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            path: reader.index(0, "path", Target::Strings)?,
            action: reader.code(1, "action")?,
            role: reader.index(2, "role", Target::Strings)?,
            deps: reader.indices(3, "deps", Target::Strings)?,
            status: reader.code(4, "status")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PatternRecord {
    pub(crate) name: usize,
    pub(crate) desc: usize,
}

impl PatternRecord {
    pub(crate) fn into_record(self) -> Record {
        Record(vec![Slot::index(self.name), Slot::index(self.desc)])
    }

    pub(crate) fn read(reader: &RecordReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            name: reader.index(0, "name", Target::Strings)?,
            desc: reader.index(1, "desc", Target::Strings)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlockerRecord {
    pub(crate) id: usize,
    pub(crate) desc: usize,
    pub(crate) status: BlockerStatus,
}

impl BlockerRecord {
    pub(crate) fn into_record(self) -> Record {
        Record(vec![
            Slot::index(self.id),
            Slot::index(self.desc),
            Slot::Int(i64::from(self.status.code())),
        ])
    }

    pub(crate) fn read(reader: &RecordReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            id: reader.index(0, "id", Target::Strings)?,
            desc: reader.index(1, "desc", Target::Strings)?,
            status: reader.code(2, "status")?,
        })
    }
}
