//! Export coordinator - main run orchestration logic
//!
//! This module drives a whole export:
//! - Authenticating against the catalog service
//! - Listing the catalog and resolving the latest version of every asset
//! - Saving metadata, categories and specification files per asset
//! - Crawling each asset's documentation portal
//! - Writing the run summaries

use crate::catalog::{
    consolidate_categories, extract_categories, resolve, AssetCoordinates, Category, Resolution,
    ResolvedAsset,
};
use crate::client::{AccessToken, ExchangeClient};
use crate::config::Config;
use crate::crawler::documents::{CrawlOptions, DocumentCrawler, DocumentationTree};
use crate::output::{
    format_timestamp, round_seconds, write_categories, write_summary, ExtractionSummary,
    RunSettings, RunSummary, DOWNLOAD_SUMMARY_FILE, EXTRACTION_SUMMARY_FILE,
};
use crate::storage::{open_store, sanitize_filename, FsStore, OutputStore};
use crate::{ConfigError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Keywords marking a file as an API specification
const SPEC_KEYWORDS: [&str; 6] = ["openapi", "swagger", "api-spec", ".yaml", ".yml", ".json"];

/// Keywords marking a file as documentation
const DOC_KEYWORDS: [&str; 6] = ["doc", "readme", "guide", ".md", ".html", ".pdf"];

/// Kind of an asset file, judged from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Specification,
    Documentation,
    Other,
}

impl FileKind {
    /// Classifies a file name; specification keywords take precedence
    pub fn classify(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if SPEC_KEYWORDS.iter().any(|k| lower.contains(k)) {
            Self::Specification
        } else if DOC_KEYWORDS.iter().any(|k| lower.contains(k)) {
            Self::Documentation
        } else {
            Self::Other
        }
    }
}

/// Counters accumulated across the assets of a run
#[derive(Debug, Default)]
struct RunTotals {
    docs_downloaded: usize,
    specs_downloaded: usize,
    categories: Vec<Category>,
}

/// Main export coordinator structure
pub struct Exporter {
    config: Config,
    config_hash: Option<String>,
    client: ExchangeClient,
    store: FsStore,
}

impl Exporter {
    /// Creates a new exporter
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `config_hash` - Hash of the configuration file, if one was read
    ///
    /// # Returns
    ///
    /// * `Ok(Exporter)` - Client built and output directory created
    /// * `Err(ExportError)` - Failed to initialize
    pub fn new(config: Config, config_hash: Option<String>) -> Result<Self> {
        let client = ExchangeClient::new(&config.exchange)?;
        let store = open_store(Path::new(&config.export.output_dir))?;

        Ok(Self {
            config,
            config_hash,
            client,
            store,
        })
    }

    pub fn store(&self) -> &FsStore {
        &self.store
    }

    /// Exchanges the configured credentials for a token
    pub async fn authenticate(&self) -> Result<AccessToken> {
        let client_id = self
            .config
            .exchange
            .client_id
            .as_deref()
            .ok_or(ConfigError::Missing("client-id (CLIENT_ID)"))?;
        let client_secret = self
            .config
            .exchange
            .client_secret
            .as_deref()
            .ok_or(ConfigError::Missing("client-secret (CLIENT_SECRET)"))?;

        self.client.authenticate(client_id, client_secret).await
    }

    /// Lists the catalog and keeps the latest version of every asset
    ///
    /// # Returns
    ///
    /// The number of listed entries and the resolution.
    pub async fn list_latest(&self, token: &AccessToken) -> Result<(usize, Resolution)> {
        tracing::info!("Searching for assets");
        let entries = self
            .client
            .search_assets(
                token,
                self.config.exchange.group_id.as_deref(),
                self.config.exchange.asset_id.as_deref(),
            )
            .await?;
        let total = entries.len();

        let resolution = resolve(entries);
        tracing::info!(
            "Processing {} latest assets out of {} listed",
            resolution.assets.len(),
            total
        );
        Ok((total, resolution))
    }

    /// Runs a catalog-wide export
    ///
    /// Authentication and catalog listing failures abort the run; failures
    /// within one asset are logged and the run continues with the next.
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        tracing::info!(
            "Starting export for organization {} into {}",
            self.config.exchange.organization_id,
            self.store.root().display()
        );

        let token = self.authenticate().await?;
        let (total, resolution) = self.list_latest(&token).await?;
        if resolution.assets.is_empty() {
            tracing::warn!("No assets found");
        }

        let mut totals = RunTotals::default();
        for asset in &resolution.assets {
            self.export_asset(&token, asset, &mut totals).await;
        }

        let unique = consolidate_categories(&totals.categories);
        if unique.is_empty() {
            tracing::info!("No categories found");
        } else if let Err(e) = write_categories(&self.store, &unique) {
            tracing::warn!("Failed to save categories: {}", e);
        } else {
            tracing::info!("Saved {} unique categories", unique.len());
        }

        let summary = RunSummary {
            download_timestamp: format_timestamp(chrono::Utc::now()),
            organization_id: self.config.exchange.organization_id.clone(),
            total_assets_found: total,
            latest_assets_processed: resolution.assets.len(),
            skipped_entries: resolution.skipped,
            superseded_entries: resolution.superseded,
            docs_downloaded: totals.docs_downloaded,
            specs_downloaded: totals.specs_downloaded,
            categories_extracted: totals.categories.len(),
            unique_categories: unique.len(),
            output_directory: self.output_directory(),
            duration_seconds: round_seconds(start_time.elapsed().as_secs_f64()),
            config_hash: self.config_hash.clone(),
            settings: RunSettings {
                export: self.config.export.clone(),
                group_id_filter: self.config.exchange.group_id.clone(),
                asset_id_filter: self.config.exchange.asset_id.clone(),
            },
        };
        write_summary(&self.store, DOWNLOAD_SUMMARY_FILE, &summary)?;

        tracing::info!("Export completed in {:?}", start_time.elapsed());
        Ok(summary)
    }

    /// Extracts the documentation of one asset version
    pub async fn extract_asset(&self, asset: &AssetCoordinates) -> Result<ExtractionSummary> {
        let start_time = Instant::now();
        let token = self.authenticate().await?;
        let tree = self.crawl_documentation(&token, asset).await;

        let summary = ExtractionSummary {
            extraction_timestamp: format_timestamp(chrono::Utc::now()),
            group_id: asset.group_id.clone(),
            asset_id: asset.asset_id.clone(),
            asset_version: asset.version.clone(),
            organization_id: self.config.exchange.organization_id.clone(),
            pages_listed: tree.stats.pages_listed,
            images_saved: tree.stats.images_saved,
            images_failed: tree.stats.images_failed,
            markdown_files: tree.stats.conversions,
            docs_downloaded: tree.stats.docs_downloaded(),
            output_directory: self.output_directory(),
            duration_seconds: round_seconds(start_time.elapsed().as_secs_f64()),
        };
        write_summary(&self.store, EXTRACTION_SUMMARY_FILE, &summary)?;

        Ok(summary)
    }

    /// Exports one resolved asset
    async fn export_asset(&self, token: &AccessToken, asset: &ResolvedAsset, totals: &mut RunTotals) {
        let coordinates = &asset.coordinates;
        let dir = PathBuf::from(asset.dir_name());
        tracing::info!("Processing asset: {}", coordinates);

        if self.config.export.include_metadata {
            match self.client.asset_details(token, coordinates).await {
                Ok(details) => {
                    let metadata_file = dir.join("metadata.json");
                    match self.store.write_json(&metadata_file, &details) {
                        Ok(()) => tracing::debug!("Saved metadata: {}", metadata_file.display()),
                        Err(e) => tracing::warn!("Failed to save metadata for {}: {}", coordinates, e),
                    }

                    let categories = extract_categories(&details);
                    tracing::debug!("Found {} categories for {}", categories.len(), coordinates);
                    totals.categories.extend(categories);
                }
                Err(e) => tracing::warn!("Failed to get asset details for {}: {}", coordinates, e),
            }
        }

        if self.config.export.include_files {
            self.download_files(token, coordinates, &dir, totals).await;
        }

        if self.config.export.include_docs {
            let tree = self.crawl_documentation(token, coordinates).await;
            totals.docs_downloaded += tree.stats.docs_downloaded();
        }
    }

    /// Downloads the files listed for an asset into `files/`
    async fn download_files(
        &self,
        token: &AccessToken,
        asset: &AssetCoordinates,
        dir: &Path,
        totals: &mut RunTotals,
    ) {
        let files = match self.client.asset_files(token, asset).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!("Failed to get asset files for {}: {}", asset, e);
                return;
            }
        };

        if files.is_empty() {
            tracing::info!("No files found for asset {}", asset);
            return;
        }

        for file in &files {
            let file_name = file
                .get("fileName")
                .and_then(Value::as_str)
                .unwrap_or("unknown");

            let Some(download_url) = file.get("downloadURL").and_then(Value::as_str) else {
                tracing::warn!("No download URL for file: {}", file_name);
                continue;
            };

            let kind = FileKind::classify(file_name);
            if !self.config.export.include_docs && kind == FileKind::Documentation {
                tracing::debug!("Skipping documentation file {}", file_name);
                continue;
            }

            tracing::info!("Downloading: {}", file_name);
            match self.client.download(token, download_url).await {
                Ok(bytes) => {
                    let safe_name = match sanitize_filename(file_name, true) {
                        name if name.is_empty() => "unknown".to_string(),
                        name => name,
                    };
                    let path = dir.join("files").join(safe_name);
                    match self.store.write_bytes(&path, &bytes) {
                        Ok(()) => {
                            tracing::debug!("Saved: {}", path.display());
                            if kind == FileKind::Specification {
                                totals.specs_downloaded += 1;
                            }
                        }
                        Err(e) => tracing::warn!("Failed to save file {}: {}", path.display(), e),
                    }
                }
                Err(e) => tracing::warn!("Failed to download file {}: {}", file_name, e),
            }

            self.pace().await;
        }
    }

    async fn crawl_documentation(&self, token: &AccessToken, asset: &AssetCoordinates) -> DocumentationTree {
        let portal = self.client.portal(token);
        let crawler = DocumentCrawler::new(
            &portal,
            &self.store,
            CrawlOptions::from_config(&self.config.export),
        );
        crawler.crawl(asset).await
    }

    fn output_directory(&self) -> String {
        let root = self.store.root();
        std::fs::canonicalize(root)
            .unwrap_or_else(|_| root.to_path_buf())
            .display()
            .to_string()
    }

    async fn pace(&self) {
        let delay = Duration::from_millis(self.config.export.request_delay_ms);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Runs a complete catalog export
///
/// # Example
///
/// ```no_run
/// use exchange_export::config::load_effective_config;
/// use exchange_export::crawler::run_export;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_effective_config(None)?;
/// let summary = run_export(config, hash).await?;
/// println!("{} documents", summary.docs_downloaded);
/// # Ok(())
/// # }
/// ```
pub async fn run_export(config: Config, config_hash: Option<String>) -> Result<RunSummary> {
    let exporter = Exporter::new(config, config_hash)?;
    exporter.run().await
}
