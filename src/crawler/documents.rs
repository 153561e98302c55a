//! Documentation crawl of one asset's portal
//!
//! The crawl is a single sequential pass: descriptor, page list, page
//! records, then each page's content with its images. Every unit of work
//! logs its failure and the crawl moves on; nothing here aborts the run.

use crate::catalog::AssetCoordinates;
use crate::client::PortalSource;
use crate::config::{ExportConfig, ImageNaming};
use crate::crawler::content::PageContent;
use crate::crawler::images::{
    extract_image_references, local_image_name, numbered_name, request_path, rewrite_reference,
    strip_resource_marker, ImageReference,
};
use crate::crawler::markup;
use crate::state::PageState;
use crate::storage::{last_segment, sanitize_filename, OutputStore};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory, relative to the asset directory, holding downloaded images
pub const IMAGES_DIR: &str = "images";

/// Directory, relative to the asset directory, holding page list records
pub const PAGES_DIR: &str = "pages";

/// Knobs of a documentation crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    pub image_naming: ImageNaming,
    pub convert_markdown: bool,
    /// Pause after every page and image fetch
    pub request_delay: Duration,
}

impl CrawlOptions {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            image_naming: config.image_naming,
            convert_markdown: config.convert_markdown,
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

/// Per-asset crawl counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub portal_info_saved: bool,
    pub pages_listed: usize,
    pub page_records_saved: usize,
    pub contents_saved: usize,
    pub images_saved: usize,
    pub images_failed: usize,
    pub conversions: usize,
}

impl CrawlStats {
    /// Number of documentation files written for the asset
    pub fn docs_downloaded(&self) -> usize {
        usize::from(self.portal_info_saved)
            + self.page_records_saved
            + self.contents_saved
            + self.images_saved
            + self.conversions
    }
}

/// Outcome of one page
#[derive(Debug, Clone, PartialEq)]
pub struct CrawledPage {
    pub path: Option<String>,
    pub title: String,
    pub state: PageState,
    /// Content record, relative to the output root
    pub content_file: Option<PathBuf>,
    /// Markdown rendition, relative to the output root
    pub markdown_file: Option<PathBuf>,
    pub images: Vec<ImageReference>,
}

/// An image written under the asset's `images/` directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub request_path: String,
    /// Path as written into rewritten pages (`images/...`)
    pub local_path: String,
}

/// Everything one asset crawl produced
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentationTree {
    pub asset: AssetCoordinates,
    /// Asset directory, relative to the output root
    pub dir: PathBuf,
    pub portal_info: Option<Value>,
    pub pages: Vec<CrawledPage>,
    pub images: Vec<SavedImage>,
    pub stats: CrawlStats,
}

impl DocumentationTree {
    fn new(asset: &AssetCoordinates) -> Self {
        Self {
            asset: asset.clone(),
            dir: PathBuf::from(asset.dir_name()),
            portal_info: None,
            pages: Vec::new(),
            images: Vec::new(),
            stats: CrawlStats::default(),
        }
    }

    pub fn pages_in(&self, state: PageState) -> usize {
        self.pages.iter().filter(|p| p.state == state).count()
    }
}

/// Fetch outcomes of distinct images, keyed by request path
///
/// Failures are cached too, so a broken image is requested once per asset.
/// Local paths handed out are tracked so two request paths that sanitize to
/// the same name do not share a file.
#[derive(Debug, Default)]
struct ImageCache {
    outcomes: HashMap<String, Option<String>>,
    saved: Vec<SavedImage>,
    used: HashSet<String>,
}

impl ImageCache {
    fn get(&self, request_path: &str) -> Option<&Option<String>> {
        self.outcomes.get(request_path)
    }

    /// First free local path for `name`: `images/{name}`, then `_1`, `_2`, ...
    fn unique_local_path(&self, name: &str) -> String {
        let mut local_path = format!("{}/{}", IMAGES_DIR, name);
        let mut n = 0;
        while self.used.contains(&local_path) {
            n += 1;
            local_path = format!("{}/{}", IMAGES_DIR, numbered_name(name, n));
        }
        local_path
    }

    fn record(&mut self, request_path: String, local_path: Option<String>) {
        if let Some(local_path) = &local_path {
            self.used.insert(local_path.clone());
            self.saved.push(SavedImage {
                request_path: request_path.clone(),
                local_path: local_path.clone(),
            });
        }
        self.outcomes.insert(request_path, local_path);
    }

    fn distinct(&self) -> usize {
        self.outcomes.len()
    }
}

/// Crawls asset portals into an output store
pub struct DocumentCrawler<'a, S, O> {
    source: &'a S,
    store: &'a O,
    options: CrawlOptions,
}

impl<'a, S: PortalSource, O: OutputStore> DocumentCrawler<'a, S, O> {
    pub fn new(source: &'a S, store: &'a O, options: CrawlOptions) -> Self {
        Self {
            source,
            store,
            options,
        }
    }

    /// Crawls the documentation portal of one asset version
    ///
    /// # Arguments
    ///
    /// * `asset` - Coordinates of the asset version
    ///
    /// # Returns
    ///
    /// The documentation tree. A portal that is absent or lists no pages
    /// yields a tree without pages.
    pub async fn crawl(&self, asset: &AssetCoordinates) -> DocumentationTree {
        let mut tree = DocumentationTree::new(asset);
        let dir = tree.dir.clone();
        tracing::info!("Downloading documentation for {}", asset);

        match self.source.portal_info(asset).await {
            Ok(info) => {
                tree.stats.portal_info_saved = self.save_json(&dir.join("portal_info.json"), &info);
                tree.portal_info = Some(info);
            }
            Err(e) => tracing::warn!("No portal info for {}: {}", asset, e),
        }

        let pages = match self.source.page_list(asset).await {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!("No portal pages for {}: {}", asset, e);
                Vec::new()
            }
        };

        if pages.is_empty() {
            tracing::info!("No documentation pages found for {}", asset);
            return tree;
        }

        tree.stats.pages_listed = pages.len();
        tracing::info!("Found {} portal pages for {}", pages.len(), asset);
        self.save_json(&dir.join("portal_pages.json"), &Value::Array(pages.clone()));

        for (idx, page) in pages.iter().enumerate() {
            let name = sanitize_or(&page_title(page, idx), false, idx);
            let record = dir.join(PAGES_DIR).join(format!("{}.json", name));
            if self.save_json(&record, page) {
                tree.stats.page_records_saved += 1;
            }
        }

        let mut cache = ImageCache::default();
        for (idx, page) in pages.iter().enumerate() {
            let crawled = self
                .crawl_page(asset, &dir, idx, page, &mut cache, &mut tree.stats)
                .await;
            tracing::debug!("Page {:?} finished as {}", crawled.path, crawled.state);
            tree.pages.push(crawled);
        }
        tree.images = cache.saved;

        tracing::info!(
            "Documentation for {}: {} pages, {} contents, {} images ({} failed), {} markdown",
            asset,
            tree.stats.pages_listed,
            tree.stats.contents_saved,
            tree.stats.images_saved,
            tree.stats.images_failed,
            tree.stats.conversions
        );

        tree
    }

    async fn crawl_page(
        &self,
        asset: &AssetCoordinates,
        dir: &Path,
        idx: usize,
        page: &Value,
        cache: &mut ImageCache,
        stats: &mut CrawlStats,
    ) -> CrawledPage {
        let mut crawled = CrawledPage {
            path: None,
            title: page_title(page, idx),
            state: PageState::Listed,
            content_file: None,
            markdown_file: None,
            images: Vec::new(),
        };

        let Some(path) = page
            .get("path")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
        else {
            tracing::warn!("No path found for page: {}", page_name(page, idx));
            advance(&mut crawled.state, PageState::Failed);
            return crawled;
        };
        crawled.path = Some(path.to_string());

        let fetched = self.source.page_content(asset, path).await;
        self.pace().await;

        let raw = match fetched {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to fetch page content for {}: {}", path, e);
                advance(&mut crawled.state, PageState::Failed);
                return crawled;
            }
        };

        let stem = sanitize_or(last_segment(path), true, idx);
        let content = PageContent::classify(path, raw);
        let content_file = dir.join(format!("{}_content.json", stem));
        if self.save_json(&content_file, &content.to_record()) {
            stats.contents_saved += 1;
            crawled.content_file = Some(content_file);
        }

        if content.is_empty_body() {
            tracing::warn!("Empty content for page {}", path);
            advance(&mut crawled.state, PageState::EmptyBody);
            return crawled;
        }
        advance(&mut crawled.state, PageState::ContentFetched);

        let Some(raw_html) = content.html() else {
            return crawled;
        };

        // References come from the body as served; rewriting and conversion
        // work on the body with `resources/` removed, as stored in the record.
        crawled.images = extract_image_references(raw_html);
        tracing::debug!("Found {} images in {}", crawled.images.len(), path);

        let mut html = strip_resource_marker(raw_html);
        for reference in &crawled.images {
            if let Some(local_path) = self.fetch_image(asset, dir, reference, cache, stats).await {
                let source_url = strip_resource_marker(&reference.source_url);
                html = rewrite_reference(&html, &source_url, &local_path);
            }
        }
        advance(&mut crawled.state, PageState::Rewritten);

        if !self.options.convert_markdown {
            return crawled;
        }

        match markup::html_to_markdown(&html) {
            Some(markdown) => {
                let markdown_file = dir.join(format!("{}.md", stem));
                match self.store.write_text(&markdown_file, &markdown) {
                    Ok(()) => {
                        stats.conversions += 1;
                        crawled.markdown_file = Some(markdown_file);
                        advance(&mut crawled.state, PageState::Converted);
                    }
                    Err(e) => tracing::warn!("Failed to save markdown for {}: {}", path, e),
                }
            }
            None => tracing::debug!("Markdown converter unavailable, skipping {}", path),
        }

        crawled
    }

    /// Fetches one image unless its outcome is already known
    ///
    /// Returns the local path to rewrite the reference to.
    async fn fetch_image(
        &self,
        asset: &AssetCoordinates,
        dir: &Path,
        reference: &ImageReference,
        cache: &mut ImageCache,
        stats: &mut CrawlStats,
    ) -> Option<String> {
        let request_path = request_path(&reference.resource_path);
        if let Some(outcome) = cache.get(&request_path) {
            return outcome.clone();
        }

        if request_path.is_empty() {
            tracing::warn!("Image {} has no usable resource path", reference.source_url);
            stats.images_failed += 1;
            cache.record(request_path, None);
            return None;
        }

        let fetched = self.source.resource_bytes(asset, &request_path).await;
        self.pace().await;

        let outcome = match fetched {
            Ok(bytes) => {
                let name = local_image_name(&request_path, self.options.image_naming, cache.distinct());
                let local_path = cache.unique_local_path(&name);
                match self.store.write_bytes(&dir.join(&local_path), &bytes) {
                    Ok(()) => {
                        tracing::debug!("Saved image {} ({} bytes)", local_path, bytes.len());
                        stats.images_saved += 1;
                        Some(local_path)
                    }
                    Err(e) => {
                        tracing::warn!("Failed to save image {}: {}", local_path, e);
                        stats.images_failed += 1;
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Failed to fetch image {}: {}", reference.resource_path, e);
                stats.images_failed += 1;
                None
            }
        };

        cache.record(request_path, outcome.clone());
        outcome
    }

    fn save_json(&self, path: &Path, value: &Value) -> bool {
        match self.store.write_json(path, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to save {}: {}", path.display(), e);
                false
            }
        }
    }

    async fn pace(&self) {
        if !self.options.request_delay.is_zero() {
            tokio::time::sleep(self.options.request_delay).await;
        }
    }
}

fn advance(state: &mut PageState, next: PageState) {
    if let Err(e) = state.advance(next) {
        tracing::error!("{}", e);
    }
}

fn page_title(page: &Value, idx: usize) -> String {
    page.get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("page_{}", idx))
}

fn page_name(page: &Value, idx: usize) -> String {
    page.get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("page_{}", idx))
}

fn sanitize_or(text: &str, allow_dot: bool, idx: usize) -> String {
    let name = sanitize_filename(text, allow_dot);
    if name.is_empty() {
        format!("page_{}", idx)
    } else {
        name
    }
}
