//! Client module for the catalog service
//!
//! This module contains everything that talks to the network:
//! - Building the HTTP client
//! - The OAuth2 client-credentials handshake
//! - Catalog, asset and portal endpoints
//!
//! The documentation crawler only sees the [`PortalSource`] trait, so it can
//! run against any source of portal data.

mod exchange;

pub use exchange::{build_http_client, ExchangeClient, Portal};

use crate::catalog::AssetCoordinates;
use crate::Result;
use serde_json::Value;
use std::fmt;

/// Longest response excerpt written to debug logs
pub const LOG_EXCERPT_LEN: usize = 1000;

/// Bearer token obtained from the client-credentials handshake
///
/// Immutable once issued; passed explicitly into every request.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Raw body of a portal page together with its declared content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    /// Lowercased `Content-Type` header, empty when absent
    pub content_type: String,

    /// Response body decoded as text
    pub body: String,
}

/// Source of an asset's documentation portal
///
/// Each method is one fetch. Errors cover both transport failures and
/// missing data; the crawler treats them as "absent" and carries on.
#[allow(async_fn_in_trait)]
pub trait PortalSource {
    /// Portal descriptor of the asset
    async fn portal_info(&self, asset: &AssetCoordinates) -> Result<Value>;

    /// Page records (`path`, `title`, `name`, ...)
    async fn page_list(&self, asset: &AssetCoordinates) -> Result<Vec<Value>>;

    /// Content of one page, addressed by its unencoded path
    async fn page_content(&self, asset: &AssetCoordinates, path: &str) -> Result<RawContent>;

    /// Bytes of one portal resource, addressed by its unencoded path
    async fn resource_bytes(&self, asset: &AssetCoordinates, resource_path: &str)
        -> Result<Vec<u8>>;
}

/// Shortens text for logging, respecting character boundaries
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!(
            "{}... (truncated, total length: {} chars)",
            &text[..cut],
            text.chars().count()
        ),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text() {
        assert_eq!(truncate_for_log("hello", 10), "hello");
        assert_eq!(truncate_for_log("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(
            truncate_for_log("hello world", 5),
            "hello... (truncated, total length: 11 chars)"
        );
    }

    #[test]
    fn test_truncate_multibyte() {
        let text = "ééééé";
        assert!(truncate_for_log(text, 2).starts_with("éé..."));
    }

    #[test]
    fn test_token_debug_hides_secret() {
        let token = AccessToken::new("abc123");
        assert_eq!(format!("{:?}", token), "AccessToken(***)");
        assert_eq!(token.secret(), "abc123");
    }
}
