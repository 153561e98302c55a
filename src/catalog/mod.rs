//! Catalog data model and version resolution
//!
//! This module handles:
//! - Catalog entries as returned by the asset search
//! - Collapsing the listing to the latest version per asset
//! - Category extraction from asset details

mod categories;
mod resolver;
mod version;

pub use categories::{consolidate_categories, extract_categories, Category};
pub use resolver::{resolve, Resolution};
pub use version::{Component, Version};

use crate::storage::sanitize_filename;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// One listed item of the catalog
///
/// The record is kept verbatim so unknown attributes pass through untouched;
/// identity fields are read on demand.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct CatalogEntry(Map<String, Value>);

impl CatalogEntry {
    /// Wraps a JSON value from the catalog listing
    ///
    /// Non-object values become an empty entry, which the resolver skips.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Builds an entry from its identity fields
    pub fn new(group_id: &str, asset_id: &str, version: &str) -> Self {
        let mut map = Map::new();
        map.insert("groupId".to_string(), Value::from(group_id));
        map.insert("assetId".to_string(), Value::from(asset_id));
        map.insert("version".to_string(), Value::from(version));
        Self(map)
    }

    pub fn group_id(&self) -> Option<String> {
        self.text_field("groupId")
    }

    pub fn asset_id(&self) -> Option<String> {
        self.text_field("assetId")
    }

    pub fn version(&self) -> Option<String> {
        self.text_field("version")
    }

    /// Raw access to any attribute
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the coordinates if all identity fields are present
    pub fn coordinates(&self) -> Option<AssetCoordinates> {
        Some(AssetCoordinates {
            group_id: self.group_id()?,
            asset_id: self.asset_id()?,
            version: self.version()?,
        })
    }

    fn text_field(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// The `(group, asset, version)` triple addressing one asset version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetCoordinates {
    pub group_id: String,
    pub asset_id: String,
    pub version: String,
}

impl AssetCoordinates {
    pub fn new(group_id: &str, asset_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            asset_id: asset_id.to_string(),
            version: version.to_string(),
        }
    }

    /// Identity key shared by every version of the asset
    pub fn identity_key(&self) -> String {
        format!("{}/{}", self.group_id, self.asset_id)
    }

    /// Output directory name for this asset version
    pub fn dir_name(&self) -> String {
        sanitize_filename(
            &format!("{}_{}_{}", self.group_id, self.asset_id, self.version),
            true,
        )
    }
}

impl fmt::Display for AssetCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.group_id, self.asset_id, self.version)
    }
}

/// The single retained entry for an asset identity
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAsset {
    pub coordinates: AssetCoordinates,
    pub entry: CatalogEntry,
}

impl ResolvedAsset {
    /// Output directory name for this asset
    pub fn dir_name(&self) -> String {
        self.coordinates.dir_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_fields() {
        let entry = CatalogEntry::from_json(json!({
            "groupId": "g1",
            "assetId": "a1",
            "version": "1.0.0",
            "name": "Orders API"
        }));

        assert_eq!(entry.group_id().as_deref(), Some("g1"));
        assert_eq!(entry.asset_id().as_deref(), Some("a1"));
        assert_eq!(entry.version().as_deref(), Some("1.0.0"));
        assert_eq!(entry.get("name"), Some(&json!("Orders API")));
    }

    #[test]
    fn test_empty_field_is_missing() {
        let entry = CatalogEntry::from_json(json!({"groupId": "", "assetId": "a", "version": "1"}));
        assert!(entry.coordinates().is_none());
    }

    #[test]
    fn test_numeric_version_is_text() {
        let entry = CatalogEntry::from_json(json!({"groupId": "g", "assetId": "a", "version": 2}));
        assert_eq!(entry.version().as_deref(), Some("2"));
    }

    #[test]
    fn test_non_object_entry() {
        let entry = CatalogEntry::from_json(json!("not an asset"));
        assert!(entry.coordinates().is_none());
    }

    #[test]
    fn test_entry_serializes_verbatim() {
        let raw = json!({"version": "1.0.0", "assetId": "a1", "groupId": "g1", "extra": [1, 2]});
        let entry = CatalogEntry::from_json(raw.clone());
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn test_dir_name() {
        let coords = AssetCoordinates::new("org-1", "orders api", "1.0.0");
        assert_eq!(coords.dir_name(), "org-1_orders_api_1.0.0");
        assert_eq!(coords.identity_key(), "org-1/orders api");
        assert_eq!(coords.to_string(), "org-1/orders api:1.0.0");
    }
}
