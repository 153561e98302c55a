//! Console reports
//!
//! This module prints run results and asset listings to stdout.

use crate::catalog::Resolution;
use crate::output::summary::{ExtractionSummary, RunSummary};

/// Prints a catalog run summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The finished run
pub fn print_run_summary(summary: &RunSummary) {
    println!("\n=== Export Summary ===\n");

    println!("Catalog:");
    println!("  Organization: {}", summary.organization_id);
    println!("  Entries listed: {}", summary.total_assets_found);
    println!("  Latest assets processed: {}", summary.latest_assets_processed);
    println!("  Older versions superseded: {}", summary.superseded_entries);
    println!("  Entries skipped: {}", summary.skipped_entries);
    println!();

    println!("Downloads:");
    println!("  Documentation items: {}", summary.docs_downloaded);
    println!("  Specification files: {}", summary.specs_downloaded);
    println!(
        "  Categories: {} ({} unique)",
        summary.categories_extracted, summary.unique_categories
    );
    println!();

    println!("Duration: {:.2} seconds", summary.duration_seconds);
    println!("Output directory: {}", summary.output_directory);
}

/// Prints a single-asset extraction summary to stdout
pub fn print_extraction_summary(summary: &ExtractionSummary) {
    println!("\n=== Extraction Summary ===\n");

    println!("  Asset: {}", summary.coordinates());
    println!("  Organization: {}", summary.organization_id);
    println!("  Pages listed: {}", summary.pages_listed);
    println!(
        "  Images: {} saved, {} failed",
        summary.images_saved, summary.images_failed
    );
    println!("  Markdown files: {}", summary.markdown_files);
    println!("  Documentation items downloaded: {}", summary.docs_downloaded);
    println!();

    println!("Duration: {:.2} seconds", summary.duration_seconds);
    println!("Output directory: {}", summary.output_directory);
}

/// Prints the latest version of every asset
pub fn print_resolution(resolution: &Resolution) {
    println!("=== Latest Asset Versions ({}) ===\n", resolution.assets.len());

    for asset in &resolution.assets {
        println!("  - {}", asset.coordinates);
    }

    if resolution.skipped > 0 || resolution.superseded > 0 {
        println!();
        println!("  Older versions superseded: {}", resolution.superseded);
        println!("  Entries skipped: {}", resolution.skipped);
    }
}
