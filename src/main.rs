//! Exchange-Export main entry point
//!
//! This is the command-line interface for the catalog and documentation exporter.

use anyhow::Context;
use clap::Parser;
use exchange_export::catalog::AssetCoordinates;
use exchange_export::config::{load_effective_config, Config};
use exchange_export::crawler::{markup, Exporter};
use exchange_export::output::{
    append_github_outputs, print_extraction_summary, print_resolution, print_run_summary,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Exchange-Export: catalog and documentation exporter
///
/// Exports the latest version of every asset in an organization's API
/// catalog, with metadata, categories, specification files and the
/// documentation portal rendered to Markdown with local images.
#[derive(Parser, Debug)]
#[command(name = "exchange-export")]
#[command(version = "1.0.0")]
#[command(about = "Export API catalog assets and their documentation", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (environment variables apply on top)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the effective settings without exporting
    #[arg(long, conflicts_with_all = ["list", "asset"])]
    dry_run: bool,

    /// List the latest version of every asset and exit
    #[arg(long, conflicts_with_all = ["dry_run", "asset"])]
    list: bool,

    /// Extract the documentation of a single asset (requires --asset-version)
    #[arg(long, value_name = "ASSET_ID", requires = "asset_version")]
    asset: Option<String>,

    /// Version of the single asset to extract
    #[arg(long, value_name = "VERSION", requires = "asset")]
    asset_version: Option<String>,

    /// Group of the single asset (defaults to `group-id`, then the organization id)
    #[arg(long, value_name = "GROUP_ID", requires = "asset")]
    group: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file given, using defaults and environment"),
    }
    let (config, config_hash) = load_effective_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(hash) = &config_hash {
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.list {
        handle_list(config, config_hash).await?;
    } else if let Some(asset) = single_asset(&cli, &config) {
        handle_extract(config, config_hash, &asset).await?;
    } else {
        handle_export(config, config_hash).await?;
    }

    Ok(())
}

/// Asset to extract on its own, from the command line or else the configuration
fn single_asset(cli: &Cli, config: &Config) -> Option<AssetCoordinates> {
    match (&cli.asset, &cli.asset_version) {
        (Some(asset_id), Some(version)) => {
            let group_id = cli
                .group
                .as_deref()
                .or(config.exchange.group_id.as_deref())
                .unwrap_or(&config.exchange.organization_id);
            Some(AssetCoordinates::new(group_id, asset_id, version))
        }
        _ => config.exchange.single_asset(),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("exchange_export=info,warn"),
            1 => EnvFilter::new("exchange_export=debug,info"),
            2 => EnvFilter::new("exchange_export=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Exchange-Export Dry Run ===\n");

    println!("Catalog Service:");
    println!("  Base URL: {}", config.exchange.base_url);
    println!("  Organization: {}", config.exchange.organization_id);
    println!(
        "  Search filter: {}",
        config.exchange.asset_id.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Group filter: {}",
        config.exchange.group_id.as_deref().unwrap_or("(none)")
    );
    if let Some(asset) = config.exchange.single_asset() {
        println!("  Single asset: {}", asset);
    }
    println!("  Search limit: {}", config.exchange.search_limit);

    println!("\nExport:");
    println!("  Output directory: {}", config.export.output_dir);
    println!("  Include documentation: {}", config.export.include_docs);
    println!("  Include metadata: {}", config.export.include_metadata);
    println!("  Include files: {}", config.export.include_files);
    println!("  Convert to Markdown: {}", config.export.convert_markdown);
    println!("  Image naming: {:?}", config.export.image_naming);
    println!("  Request delay: {}ms", config.export.request_delay_ms);

    if config.export.convert_markdown && !markup::converter_available() {
        println!("\n! Markdown conversion requested but this build lacks the `markdown` feature");
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --list mode: prints the latest version of every asset
async fn handle_list(config: Config, config_hash: Option<String>) -> anyhow::Result<()> {
    let exporter = Exporter::new(config, config_hash)?;
    let token = exporter.authenticate().await?;
    let (_, resolution) = exporter.list_latest(&token).await?;

    print_resolution(&resolution);
    Ok(())
}

/// Handles single-asset documentation extraction
async fn handle_extract(
    config: Config,
    config_hash: Option<String>,
    asset: &AssetCoordinates,
) -> anyhow::Result<()> {
    tracing::info!("Extracting documentation for {}", asset);

    let exporter = Exporter::new(config, config_hash)?;
    let summary = exporter
        .extract_asset(asset)
        .await
        .with_context(|| format!("Extraction failed for {}", asset))?;

    print_extraction_summary(&summary);
    Ok(())
}

/// Handles the main export operation
async fn handle_export(config: Config, config_hash: Option<String>) -> anyhow::Result<()> {
    tracing::info!(
        "Docs: {}, Metadata: {}, Files: {}",
        config.export.include_docs,
        config.export.include_metadata,
        config.export.include_files
    );

    let exporter = Exporter::new(config, config_hash)?;
    let summary = match exporter.run().await {
        Ok(summary) => {
            tracing::info!("Export completed successfully");
            summary
        }
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            return Err(e.into());
        }
    };

    print_run_summary(&summary);

    if let Some(path) = std::env::var_os("GITHUB_OUTPUT") {
        append_github_outputs(PathBuf::from(path).as_path(), &summary)
            .context("Failed to write GITHUB_OUTPUT")?;
    }

    Ok(())
}
