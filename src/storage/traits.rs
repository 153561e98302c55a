//! Storage traits and error types
//!
//! This module defines the trait interface for output backends and
//! associated error types.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Path escapes the output directory: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for output backends
///
/// All paths are relative to the backend's root. Parent directories are
/// created as needed and existing files are overwritten.
pub trait OutputStore {
    /// Writes raw bytes
    fn write_bytes(&self, relative: &Path, bytes: &[u8]) -> StorageResult<()>;

    /// Writes a JSON document, pretty-printed with two-space indentation
    fn write_json(&self, relative: &Path, value: &Value) -> StorageResult<()> {
        let mut text = serde_json::to_string_pretty(value)?;
        text.push('\n');
        self.write_bytes(relative, text.as_bytes())
    }

    /// Writes UTF-8 text
    fn write_text(&self, relative: &Path, text: &str) -> StorageResult<()> {
        self.write_bytes(relative, text.as_bytes())
    }

    /// Location of the root, for reporting
    fn root(&self) -> &Path;
}
