//! Storage module for persisting exported data
//!
//! This module handles all writes to the export directory, including:
//! - JSON documents (metadata, portal descriptors, page records, summaries)
//! - Binary blobs (images, specification files)
//! - Converted Markdown pages
//! - Safe file naming for remote-derived names

mod fs;
mod naming;
mod traits;

pub use fs::FsStore;
pub use naming::{last_segment, sanitize_filename};
pub use traits::{OutputStore, StorageError, StorageResult};

use crate::ExportError;
use std::path::Path;

/// Opens the export directory as an output store
///
/// # Arguments
///
/// * `path` - Root of the export directory
///
/// # Returns
///
/// * `Ok(FsStore)` - Store rooted at `path`
/// * `Err(ExportError)` - The directory could not be created
pub fn open_store(path: &Path) -> Result<FsStore, ExportError> {
    Ok(FsStore::new(path)?)
}
