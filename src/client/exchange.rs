//! HTTP client for the catalog service
//!
//! This module handles all HTTP requests, including:
//! - Building the HTTP client with a proper user agent
//! - Exchanging client credentials for a bearer token
//! - Catalog search, asset details and asset files
//! - Portal descriptor, pages, page content and resources

use crate::catalog::{AssetCoordinates, CatalogEntry};
use crate::client::{truncate_for_log, AccessToken, PortalSource, RawContent, LOG_EXCERPT_LEN};
use crate::config::ExchangeConfig;
use crate::{ExportError, Result};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> std::result::Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the catalog service endpoints
///
/// Holds no credentials: every call takes the [`AccessToken`] explicitly.
#[derive(Debug, Clone)]
pub struct ExchangeClient {
    http: Client,
    base_url: Url,
    organization_id: String,
    search_limit: u32,
}

impl ExchangeClient {
    /// Creates a client for the configured service
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        let http = build_http_client().map_err(|source| ExportError::Http {
            url: config.base_url.clone(),
            source,
        })?;

        Ok(Self {
            http,
            base_url: Url::parse(&config.base_url)?,
            organization_id: config.organization_id.clone(),
            search_limit: config.search_limit,
        })
    }

    /// Builds an endpoint URL from path segments
    ///
    /// Each segment is percent-encoded on its own; a segment containing `/`
    /// is split first so that slashes stay literal.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ExportError::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.extend(segment.split('/'));
            }
        }
        Ok(url)
    }

    fn asset_endpoint(&self, asset: &AssetCoordinates, rest: &[&str]) -> Result<Url> {
        let mut segments = vec![
            "exchange",
            "api",
            "v2",
            "assets",
            asset.group_id.as_str(),
            asset.asset_id.as_str(),
            asset.version.as_str(),
        ];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    /// Exchanges client credentials for a bearer token
    ///
    /// `POST /accounts/api/v2/oauth2/token` with a form body. Any failure
    /// here is fatal to the run.
    pub async fn authenticate(&self, client_id: &str, client_secret: &str) -> Result<AccessToken> {
        let url = self.endpoint(&["accounts", "api", "v2", "oauth2", "token"])?;
        tracing::info!("Getting access token");
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(url.clone())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await
            .map_err(|source| ExportError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        tracing::debug!("Response Status: {}", status.as_u16());
        if !status.is_success() {
            return Err(ExportError::Auth(format!("token endpoint returned HTTP {}", status)));
        }

        let body: Value = read_json(response, &url).await?;
        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExportError::Auth("no access_token in response".to_string()))?;

        tracing::info!("Successfully obtained access token");
        Ok(AccessToken::new(token))
    }

    /// Lists catalog entries of the organization
    ///
    /// Accepts both a bare JSON array and an object with an `assets` array.
    pub async fn search_assets(
        &self,
        token: &AccessToken,
        group_filter: Option<&str>,
        asset_filter: Option<&str>,
    ) -> Result<Vec<CatalogEntry>> {
        let mut url = self.endpoint(&["exchange", "api", "v2", "assets"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("organizationId", &self.organization_id);
            query.append_pair("limit", &self.search_limit.to_string());
            if let Some(group_id) = group_filter {
                query.append_pair("groupId", group_id);
            }
            if let Some(filter) = asset_filter {
                query.append_pair("search", filter);
            }
        }

        let body = self.get_json(token, url.clone()).await?;
        let listed = match body {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("assets") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => {
                return Err(ExportError::UnexpectedResponse {
                    url: url.to_string(),
                    message: "expected a list of assets".to_string(),
                })
            }
        };

        tracing::info!("Found {} assets", listed.len());
        Ok(listed.into_iter().map(CatalogEntry::from_json).collect())
    }

    /// Detailed record of one asset version
    pub async fn asset_details(&self, token: &AccessToken, asset: &AssetCoordinates) -> Result<Value> {
        let mut url = self.asset_endpoint(asset, &[])?;
        url.query_pairs_mut()
            .append_pair("organizationId", &self.organization_id);
        self.get_json(token, url).await
    }

    /// File listing of one asset version (`files` array of the response)
    pub async fn asset_files(&self, token: &AccessToken, asset: &AssetCoordinates) -> Result<Vec<Value>> {
        let mut url = self.asset_endpoint(asset, &["files"])?;
        url.query_pairs_mut()
            .append_pair("organizationId", &self.organization_id);

        let body = self.get_json(token, url).await?;
        let files = match body {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("files") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Ok(files)
    }

    /// Downloads an absolute URL (e.g. a file's `downloadURL`)
    pub async fn download(&self, token: &AccessToken, download_url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(download_url)?;
        let response = self.get(token, url.clone()).await?;
        read_bytes(response, &url).await
    }

    /// Binds a token to this client for the documentation crawler
    pub fn portal<'a>(&'a self, token: &'a AccessToken) -> Portal<'a> {
        Portal { client: self, token }
    }

    async fn get(&self, token: &AccessToken, url: Url) -> Result<Response> {
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(url.clone())
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|source| ExportError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        tracing::debug!("Response Status: {}", status.as_u16());

        if !status.is_success() {
            return Err(ExportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn get_json(&self, token: &AccessToken, url: Url) -> Result<Value> {
        let response = self.get(token, url.clone()).await?;
        read_json(response, &url).await
    }
}

async fn read_json(response: Response, url: &Url) -> Result<Value> {
    let text = response.text().await.map_err(|source| ExportError::Http {
        url: url.to_string(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text)?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        let pretty = serde_json::to_string_pretty(&value).unwrap_or_default();
        tracing::debug!("Response Body: {}", truncate_for_log(&pretty, LOG_EXCERPT_LEN));
    }

    Ok(value)
}

async fn read_bytes(response: Response, url: &Url) -> Result<Vec<u8>> {
    let bytes = response.bytes().await.map_err(|source| ExportError::Http {
        url: url.to_string(),
        source,
    })?;
    tracing::debug!("Content Length: {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

/// A client bound to a token, serving one crawl
#[derive(Debug, Clone, Copy)]
pub struct Portal<'a> {
    client: &'a ExchangeClient,
    token: &'a AccessToken,
}

impl PortalSource for Portal<'_> {
    async fn portal_info(&self, asset: &AssetCoordinates) -> Result<Value> {
        let url = self.client.asset_endpoint(asset, &["portal"])?;
        self.client.get_json(self.token, url).await
    }

    async fn page_list(&self, asset: &AssetCoordinates) -> Result<Vec<Value>> {
        let url = self.client.asset_endpoint(asset, &["portal", "pages"])?;
        let body = self.client.get_json(self.token, url).await?;

        let pages = match body {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("pages") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Ok(pages)
    }

    async fn page_content(&self, asset: &AssetCoordinates, path: &str) -> Result<RawContent> {
        let url = self.client.asset_endpoint(asset, &["portal", "pages", path])?;
        let response = self.client.get(self.token, url.clone()).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        let body = response.text().await.map_err(|source| ExportError::Http {
            url: url.to_string(),
            source,
        })?;
        tracing::debug!(
            "Response Body ({}): {}",
            content_type,
            truncate_for_log(&body, 200)
        );

        Ok(RawContent { content_type, body })
    }

    async fn resource_bytes(&self, asset: &AssetCoordinates, resource_path: &str) -> Result<Vec<u8>> {
        let url = self
            .client
            .asset_endpoint(asset, &["portal", "resources", resource_path])?;
        let response = self.client.get(self.token, url.clone()).await?;
        read_bytes(response, &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client(base_url: &str) -> ExchangeClient {
        let config = ExchangeConfig {
            base_url: base_url.to_string(),
            organization_id: "org-1".to_string(),
            ..ExchangeConfig::default()
        };
        ExchangeClient::new(&config).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client().is_ok());
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = create_test_client("https://catalog.example.com");
        let url = client.endpoint(&["exchange", "api", "v2", "assets"]).unwrap();
        assert_eq!(url.as_str(), "https://catalog.example.com/exchange/api/v2/assets");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = create_test_client("https://example.com/gateway/");
        let url = client.endpoint(&["accounts", "login"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/gateway/accounts/login");
    }

    #[test]
    fn test_page_path_is_encoded_per_segment() {
        let client = create_test_client("https://catalog.example.com");
        let asset = AssetCoordinates::new("g1", "a1", "1.0.0");
        let url = client
            .asset_endpoint(&asset, &["portal", "pages", "9uv-lqc/Content Paged"])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://catalog.example.com/exchange/api/v2/assets/g1/a1/1.0.0/portal/pages/9uv-lqc/Content%20Paged"
        );
    }

    #[test]
    fn test_resource_path_with_reserved_characters() {
        let client = create_test_client("https://catalog.example.com");
        let asset = AssetCoordinates::new("g1", "a1", "1.0.0");
        let url = client
            .asset_endpoint(&asset, &["portal", "resources", "img/Screen Shot?.png"])
            .unwrap();

        assert!(url.path().ends_with("/portal/resources/img/Screen%20Shot%3F.png"));
        assert!(url.query().is_none());
    }
}
