//! Run summary documents
//!
//! This module defines the JSON documents written at the end of a run and
//! the helpers that persist them.

use crate::catalog::{AssetCoordinates, Category};
use crate::config::ExportConfig;
use crate::storage::{OutputStore, StorageResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// File name of the catalog run summary
pub const DOWNLOAD_SUMMARY_FILE: &str = "download_summary.json";

/// File name of the single-asset run summary
pub const EXTRACTION_SUMMARY_FILE: &str = "extraction_summary.json";

/// File name of the consolidated category list
pub const CATEGORIES_FILE: &str = "categories.json";

/// Formats a timestamp the way every summary records it
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Rounds a duration to hundredths of a second
pub fn round_seconds(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

/// Summary of a catalog-wide export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub download_timestamp: String,
    pub organization_id: String,
    pub total_assets_found: usize,
    pub latest_assets_processed: usize,
    pub skipped_entries: usize,
    pub superseded_entries: usize,
    pub docs_downloaded: usize,
    pub specs_downloaded: usize,
    pub categories_extracted: usize,
    pub unique_categories: usize,
    pub output_directory: String,
    pub duration_seconds: f64,
    pub config_hash: Option<String>,
    pub settings: RunSettings,
}

/// Settings a catalog export ran with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSettings {
    #[serde(flatten)]
    pub export: ExportConfig,
    /// Group passed to the catalog listing, if any
    pub group_id_filter: Option<String>,
    /// Search term passed to the catalog listing, if any
    pub asset_id_filter: Option<String>,
}

/// Summary of a single-asset documentation extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionSummary {
    pub extraction_timestamp: String,
    pub group_id: String,
    pub asset_id: String,
    pub asset_version: String,
    pub organization_id: String,
    pub pages_listed: usize,
    pub images_saved: usize,
    pub images_failed: usize,
    pub markdown_files: usize,
    pub docs_downloaded: usize,
    pub output_directory: String,
    pub duration_seconds: f64,
}

impl ExtractionSummary {
    pub fn coordinates(&self) -> AssetCoordinates {
        AssetCoordinates::new(&self.group_id, &self.asset_id, &self.asset_version)
    }
}

/// Writes a summary document at the root of the store
pub fn write_summary<O, T>(store: &O, file_name: &str, summary: &T) -> StorageResult<()>
where
    O: OutputStore + ?Sized,
    T: Serialize,
{
    let value = serde_json::to_value(summary)?;
    store.write_json(Path::new(file_name), &value)
}

/// Writes the consolidated category list to `categories.json`
pub fn write_categories<O>(store: &O, categories: &[Category]) -> StorageResult<()>
where
    O: OutputStore + ?Sized,
{
    write_summary(store, CATEGORIES_FILE, &categories)
}

/// Lines appended to the CI step output file
pub fn github_output_lines(summary: &RunSummary) -> String {
    format!(
        "docs-count={}\ncategories-count={}\nspecs-count={}\noutput-path={}\n",
        summary.docs_downloaded,
        summary.unique_categories,
        summary.specs_downloaded,
        summary.output_directory
    )
}

/// Appends the run's outputs to the file named by `GITHUB_OUTPUT`
///
/// # Arguments
///
/// * `path` - The step output file
/// * `summary` - The finished run
pub fn append_github_outputs(path: &Path, summary: &RunSummary) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(github_output_lines(summary).as_bytes())
}
