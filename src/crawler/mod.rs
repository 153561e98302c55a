//! Crawler module for catalog export and documentation crawling
//!
//! This module contains the core export logic, including:
//! - Image reference extraction and rewriting
//! - Page content classification
//! - HTML to Markdown conversion
//! - Per-asset documentation crawls
//! - Overall run coordination

mod content;
mod coordinator;
mod documents;
mod images;
pub mod markup;

pub use content::{is_json_media_type, PageContent, EMPTY_BODY_ERROR};
pub use coordinator::{run_export, Exporter, FileKind};
pub use documents::{
    CrawlOptions, CrawlStats, CrawledPage, DocumentCrawler, DocumentationTree, SavedImage,
    IMAGES_DIR, PAGES_DIR,
};
pub use images::{
    extract_image_references, local_image_name, numbered_name, request_path,
    resolve_resource_path, rewrite_reference, strip_resource_marker, ImageReference, ResourceRule,
    RESOURCE_MARKER,
};
