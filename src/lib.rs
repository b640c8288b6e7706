//! Layered compaction codec for session-context documents.
//!
//! A V1 [`ContextDocument`] is the labeled form agents read and write. [`encode`]
//! turns it into a [`LayeredDocument`] (V2): one deduplicated string table,
//! four flat item arrays and positional session records that reference both
//! by index. [`decode`] is the exact inverse, up to timestamp normalization
//! and mapping key order.
//!
//! Both operations are pure, synchronous transforms over one complete
//! document. They hold no state between calls and produce no output on
//! error. Reading and writing the storage medium is left to callers; see the
//! `context_store` crate.

mod decode;
mod encode;
mod error;
mod interner;
mod record;

pub mod enums;
pub mod schema;
pub mod timestamp;
pub mod validate;

pub use decode::decode;
pub use encode::encode;
pub use error::CodecError;
pub use record::RecordKind;
pub use schema::{
    Blocker, ContextDocument, Decision, FileEntry, LayeredDocument, Meta, Record, Session, Slot,
    V1_VERSION, V2_VERSION,
};
