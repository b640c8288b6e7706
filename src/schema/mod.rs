mod v1;
mod v2;

pub use v1::{Blocker, ContextDocument, Decision, FileEntry, Session, V1_VERSION};
pub use v2::{LayeredDocument, Meta, Record, Slot, V2_VERSION};
