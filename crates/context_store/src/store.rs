use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use session_ctx::validate::divergent_fields;
use session_ctx::{decode, encode, timestamp, ContextDocument, LayeredDocument};
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::ContextStoreError;
use crate::paths;

/// Context files of one repository directory.
///
/// The V1 document is the source of truth and is only ever written by
/// [`ContextStore::save_v1`]; conversions write to their own files. Every
/// write goes through a temporary file in the same directory and is renamed
/// into place, so a failed write never leaves a truncated file behind.
#[derive(Debug, Clone)]
pub struct ContextStore {
    root: PathBuf,
    overwrite: bool,
}

/// Byte sizes of the context files that exist on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSizes {
    pub v1: Option<u64>,
    pub v2: Option<u64>,
}

impl ContextStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overwrite: false,
        }
    }

    /// Resolves the root directory and the default overwrite policy of
    /// conversions from `config`.
    #[must_use]
    pub fn from_config(cwd: &Path, config: &StoreConfig) -> Self {
        Self::new(config.root(cwd)).with_overwrite(config.overwrite)
    }

    /// Sets the overwrite policy used when a conversion is given `None`.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn v1_path(&self) -> PathBuf {
        paths::v1_path(&self.root)
    }

    #[must_use]
    pub fn v2_path(&self) -> PathBuf {
        paths::v2_path(&self.root)
    }

    pub fn load_v1(&self) -> Result<ContextDocument, ContextStoreError> {
        read_json(&self.v1_path())
    }

    pub fn load_v2(&self) -> Result<LayeredDocument, ContextStoreError> {
        read_json(&self.v2_path())
    }

    /// Stamps `updated` with the current time and writes the V1 document.
    pub fn save_v1(&self, document: &mut ContextDocument) -> Result<(), ContextStoreError> {
        let path = self.v1_path();
        let now = OffsetDateTime::now_utc().unix_timestamp();
        document.updated = timestamp::to_text(now, "updated")
            .map_err(|source| ContextStoreError::codec(&path, source))?;

        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|source| ContextStoreError::json_serialize(&path, source))?;
        write_file(&path, &bytes, true)
    }

    /// Encodes the V1 document into the V2 file.
    ///
    /// The conversion is verified to decode back to the same document before
    /// anything is written. Unless overwriting (`overwrite`, or the store's
    /// policy when `None`) an existing V2 file is left untouched and the call
    /// fails.
    pub fn convert_v1_to_v2(
        &self,
        overwrite: Option<bool>,
    ) -> Result<LayeredDocument, ContextStoreError> {
        let source = self.v1_path();
        let document = self.load_v1()?;

        let layered =
            encode(&document).map_err(|error| ContextStoreError::codec(&source, error))?;
        let divergent = divergent_fields(&document, &layered)
            .map_err(|error| ContextStoreError::codec(&source, error))?;
        if !divergent.is_empty() {
            return Err(ContextStoreError::RoundTripMismatch {
                path: source,
                fields: divergent,
            });
        }

        let target = self.v2_path();
        let bytes = serde_json::to_vec(&layered)
            .map_err(|source| ContextStoreError::json_serialize(&target, source))?;
        write_file(&target, &bytes, overwrite.unwrap_or(self.overwrite))?;

        info!(
            source = %source.display(),
            target = %target.display(),
            strings = layered.strings.len(),
            sessions = layered.sessions.len(),
            "encoded context document"
        );
        Ok(layered)
    }

    /// Decodes the V2 file into `output`, or the default decode path.
    ///
    /// The V1 source document is never a valid target.
    pub fn convert_v2_to_v1(
        &self,
        output: Option<&Path>,
        overwrite: Option<bool>,
    ) -> Result<ContextDocument, ContextStoreError> {
        let target = output.map_or_else(|| paths::decoded_path(&self.root), Path::to_path_buf);
        let source_document = self.v1_path();
        if paths::same_file(&target, &source_document) {
            return Err(ContextStoreError::WouldOverwriteSource {
                path: source_document,
            });
        }

        let source = self.v2_path();
        let layered = self.load_v2()?;
        let document =
            decode(&layered).map_err(|error| ContextStoreError::codec(&source, error))?;

        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|error| ContextStoreError::json_serialize(&target, error))?;
        write_file(&target, &bytes, overwrite.unwrap_or(self.overwrite))?;

        info!(
            source = %source.display(),
            target = %target.display(),
            sessions = document.sessions.len(),
            "decoded context document"
        );
        Ok(document)
    }

    pub fn sizes(&self) -> Result<FileSizes, ContextStoreError> {
        Ok(FileSizes {
            v1: file_size(&self.v1_path())?,
            v2: file_size(&self.v2_path())?,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ContextStoreError> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ContextStoreError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ContextStoreError::io("reading context file", path, source)
        }
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "read context file");

    serde_json::from_slice(&bytes).map_err(|source| ContextStoreError::json_parse(path, source))
}

fn write_file(path: &Path, bytes: &[u8], overwrite: bool) -> Result<(), ContextStoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|source| ContextStoreError::io("creating temporary context file", dir, source))?;
    temp.write_all(bytes)
        .map_err(|source| ContextStoreError::io("writing context file", temp.path(), source))?;

    if overwrite {
        if path.exists() {
            warn!(path = %path.display(), "replacing existing context file");
        }
        temp.persist(path).map_err(|error| {
            ContextStoreError::io("moving context file into place", path, error.error)
        })?;
    } else {
        temp.persist_noclobber(path).map_err(|error| {
            if error.error.kind() == ErrorKind::AlreadyExists {
                ContextStoreError::OutputExists {
                    path: path.to_path_buf(),
                }
            } else {
                ContextStoreError::io("moving context file into place", path, error.error)
            }
        })?;
    }

    debug!(path = %path.display(), bytes = bytes.len(), "wrote context file");
    Ok(())
}

fn file_size(path: &Path) -> Result<Option<u64>, ContextStoreError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata.len())),
        Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ContextStoreError::io("reading context file metadata", path, source)),
    }
}
