//! Classification of fetched page content
//!
//! A page body becomes one of three records: parsed JSON, text, or an empty
//! marker. The record is what ends up in `{name}_content.json`.

use crate::client::RawContent;
use crate::crawler::images::strip_resource_marker;
use serde_json::{json, Value};

/// Error recorded for pages whose body is empty or whitespace-only
pub const EMPTY_BODY_ERROR: &str = "Empty response body";

/// Content of one portal page
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    /// Body declared and parsed as JSON
    Json(Value),

    /// Any other non-empty body
    Text {
        path: String,
        content_type: String,
        /// Body as fetched, before any rewriting
        body: String,
    },

    /// Body was empty or whitespace-only
    Empty { path: String, content_type: String },
}

impl PageContent {
    /// Classifies a raw response
    ///
    /// JSON is attempted only when the content type says so; a body that
    /// fails to parse falls through to text.
    pub fn classify(path: &str, raw: RawContent) -> Self {
        if is_json_media_type(&raw.content_type) {
            match serde_json::from_str::<Value>(&raw.body) {
                Ok(value) => return Self::Json(value),
                Err(e) => tracing::debug!("Declared JSON at {} did not parse: {}", path, e),
            }
        }

        if raw.body.trim().is_empty() {
            return Self::Empty {
                path: path.to_string(),
                content_type: raw.content_type,
            };
        }

        Self::Text {
            path: path.to_string(),
            content_type: raw.content_type,
            body: raw.body,
        }
    }

    /// Record written to the content file
    pub fn to_record(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Text {
                path,
                content_type,
                body,
            } => json!({
                "path": path,
                "content_type": content_type,
                "content": strip_resource_marker(body),
                "content_length": body.chars().count(),
            }),
            Self::Empty { path, content_type } => json!({
                "path": path,
                "content_type": content_type,
                "content": "",
                "error": EMPTY_BODY_ERROR,
            }),
        }
    }

    /// Body of an HTML page, if this is one
    pub fn html(&self) -> Option<&str> {
        match self {
            Self::Text {
                content_type, body, ..
            } if content_type.starts_with("text/html") => Some(body),
            _ => None,
        }
    }

    pub fn is_empty_body(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}

/// Whether a (lowercased) content type denotes JSON
pub fn is_json_media_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    content_type.contains("application/json") || essence.ends_with("+json")
}
