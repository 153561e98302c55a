//! Category extraction from asset details

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// A catalog category in export form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "tagKey")]
    pub tag_key: String,
    pub value: Value,
}

/// Extracts categories from an asset details document
///
/// Categories are listed as `{key, value, displayName}`; entries without both
/// `key` and `value` are ignored and `displayName` is dropped.
pub fn extract_categories(asset_details: &Value) -> Vec<Category> {
    let Some(listed) = asset_details.get("categories").and_then(Value::as_array) else {
        return Vec::new();
    };

    listed
        .iter()
        .filter_map(|item| {
            let key = item.get("key")?.as_str()?;
            let value = item.get("value")?;
            Some(Category {
                tag_key: key.to_string(),
                value: value.clone(),
            })
        })
        .collect()
}

/// Keeps the first category per tag key, sorted by tag key
pub fn consolidate_categories(all: &[Category]) -> Vec<Category> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Category> = all
        .iter()
        .filter(|c| !c.tag_key.is_empty() && seen.insert(c.tag_key.as_str()))
        .cloned()
        .collect();

    unique.sort_by(|a, b| a.tag_key.cmp(&b.tag_key));
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_renames_key() {
        let details = json!({
            "categories": [
                {"key": "Domain", "value": ["Finance"], "displayName": "Business Domain"},
                {"key": "Tier", "value": ["Gold"]}
            ]
        });

        let categories = extract_categories(&details);
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].tag_key, "Domain");
        assert_eq!(
            serde_json::to_value(&categories[0]).unwrap(),
            json!({"tagKey": "Domain", "value": ["Finance"]})
        );
    }

    #[test]
    fn test_extract_ignores_incomplete() {
        let details = json!({"categories": [{"key": "NoValue"}, {"value": "NoKey"}, "junk"]});
        assert!(extract_categories(&details).is_empty());
    }

    #[test]
    fn test_extract_without_categories() {
        assert!(extract_categories(&json!({"name": "x"})).is_empty());
    }

    #[test]
    fn test_consolidate_first_wins_and_sorts() {
        let all = vec![
            Category { tag_key: "Tier".into(), value: json!("Gold") },
            Category { tag_key: "Domain".into(), value: json!("Finance") },
            Category { tag_key: "Tier".into(), value: json!("Silver") },
        ];

        let unique = consolidate_categories(&all);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].tag_key, "Domain");
        assert_eq!(unique[1].value, json!("Gold"));
    }
}
