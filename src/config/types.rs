use crate::catalog::AssetCoordinates;
use serde::{Deserialize, Serialize};

/// Main configuration structure for Exchange-Export
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub export: ExportConfig,
}

/// Catalog service connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExchangeConfig {
    /// Base URL of the platform (token and catalog endpoints hang off it)
    pub base_url: String,

    /// Organization whose catalog is exported
    pub organization_id: String,

    /// OAuth2 client id; usually supplied through `CLIENT_ID`
    pub client_id: Option<String>,

    /// OAuth2 client secret; usually supplied through `CLIENT_SECRET`
    pub client_secret: Option<String>,

    /// Optional search filter passed to the catalog listing
    pub asset_id: Option<String>,

    /// Optional group filter passed to the catalog listing
    pub group_id: Option<String>,

    /// Version of `asset-id` to extract on its own instead of a full export
    pub asset_version: Option<String>,

    /// Page size of the catalog listing
    pub search_limit: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://anypoint.mulesoft.com".to_string(),
            organization_id: String::new(),
            client_id: None,
            client_secret: None,
            asset_id: None,
            group_id: None,
            asset_version: None,
            search_limit: 100,
        }
    }
}

impl ExchangeConfig {
    /// Asset named for single-asset extraction, if both id and version are set
    ///
    /// The group falls back to the organization id.
    pub fn single_asset(&self) -> Option<AssetCoordinates> {
        let asset_id = self.asset_id.as_deref()?;
        let version = self.asset_version.as_deref()?;
        let group_id = self.group_id.as_deref().unwrap_or(&self.organization_id);
        Some(AssetCoordinates::new(group_id, asset_id, version))
    }
}

/// What to export and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExportConfig {
    /// Root of the export directory
    pub output_dir: String,

    /// Crawl documentation portals
    pub include_docs: bool,

    /// Save asset details and extract categories
    pub include_metadata: bool,

    /// Download the asset's specification files
    pub include_files: bool,

    /// Convert HTML pages to Markdown (requires the `markdown` feature)
    pub convert_markdown: bool,

    /// How downloaded images are named
    pub image_naming: ImageNaming,

    /// Fixed pause after every page and resource fetch (milliseconds)
    pub request_delay_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: "api-specs".to_string(),
            include_docs: true,
            include_metadata: true,
            include_files: false,
            convert_markdown: true,
            image_naming: ImageNaming::ResourcePath,
            request_delay_ms: 100,
        }
    }
}

/// Local file naming for downloaded portal images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageNaming {
    /// Derive the file name from the resource path
    ResourcePath,

    /// `image_{n}.png`, numbered per asset
    Sequential,
}
