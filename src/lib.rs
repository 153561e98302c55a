//! Exchange-Export: catalog and documentation exporter
//!
//! This crate exports catalog entries, asset metadata, categories and portal
//! documentation from an API catalog service. The catalog listing is collapsed
//! to the latest version of every asset, then each asset's documentation
//! portal is crawled into a self-contained local tree.

pub mod catalog;
pub mod client;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Exchange-Export operations
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Unexpected response from {url}: {message}")]
    UnexpectedResponse { url: String, message: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageState,
        to: state::PageState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Result type alias for Exchange-Export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{resolve, AssetCoordinates, CatalogEntry, ResolvedAsset, Version};
pub use config::Config;
pub use crawler::{DocumentCrawler, DocumentationTree};
pub use state::PageState;
