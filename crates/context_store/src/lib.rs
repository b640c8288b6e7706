//! Repository-local persistence for session-context documents.
//!
//! Reads and writes `.session-ctx.json` (V1) and `.session-ctx.v2.json` (V2)
//! and runs the codec between them. Conversions never overwrite the V1
//! source, and refuse to replace an existing output unless asked to.

mod config;
mod error;
mod paths;
mod store;

pub use config::{StoreConfig, DIR_ENV, OVERWRITE_ENV};
pub use error::ContextStoreError;
pub use paths::{decoded_path, v1_path, v2_path, DECODED_FILE_NAME, V1_FILE_NAME, V2_FILE_NAME};
pub use store::{ContextStore, FileSizes};
