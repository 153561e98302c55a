//! Output module for run summaries and reports
//!
//! This module handles:
//! - Writing `download_summary.json` and `extraction_summary.json`
//! - Writing the consolidated `categories.json`
//! - CI step outputs
//! - Console reports

pub mod stats;
mod summary;

pub use stats::{print_extraction_summary, print_resolution, print_run_summary};
pub use summary::{
    append_github_outputs, format_timestamp, github_output_lines, round_seconds, write_categories,
    write_summary, ExtractionSummary, RunSettings, RunSummary, CATEGORIES_FILE,
    DOWNLOAD_SUMMARY_FILE, EXTRACTION_SUMMARY_FILE,
};
