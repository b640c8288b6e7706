use std::path::{Path, PathBuf};

pub const V1_FILE_NAME: &str = ".session-ctx.json";
pub const V2_FILE_NAME: &str = ".session-ctx.v2.json";
pub const DECODED_FILE_NAME: &str = ".session-ctx.v1-from-v2.json";

#[must_use]
pub fn v1_path(root: &Path) -> PathBuf {
    root.join(V1_FILE_NAME)
}

#[must_use]
pub fn v2_path(root: &Path) -> PathBuf {
    root.join(V2_FILE_NAME)
}

#[must_use]
pub fn decoded_path(root: &Path) -> PathBuf {
    root.join(DECODED_FILE_NAME)
}

/// Compares two paths after resolving symlinks and `..` where the files
/// exist; falls back to a lexical comparison otherwise.
#[must_use]
pub fn same_file(left: &Path, right: &Path) -> bool {
    match (left.canonicalize(), right.canonicalize()) {
        (Ok(left), Ok(right)) => left == right,
        _ => left == right,
    }
}
