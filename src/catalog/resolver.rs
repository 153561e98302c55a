//! Latest-version selection over the catalog listing

use crate::catalog::{CatalogEntry, ResolvedAsset, Version};
use std::collections::HashMap;

/// Outcome of collapsing a catalog listing
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// One asset per `(group, asset)` identity, in first-seen order
    pub assets: Vec<ResolvedAsset>,

    /// Entries skipped for missing identity fields
    pub skipped: usize,

    /// Entries that lost to another version of the same asset
    pub superseded: usize,
}

/// Collapses catalog entries to the latest version per identity
///
/// # Rules
///
/// | Input | Action |
/// |-------|--------|
/// | Missing group, asset or version | Skip and count |
/// | First entry for an identity | Keep |
/// | Strictly newer version | Replace the kept entry |
/// | Same or older version | Keep the existing entry |
///
/// Version comparison follows [`Version`]; malformed versions fall back to
/// text comparison, so this never fails.
///
/// # Example
///
/// ```
/// use exchange_export::{resolve, CatalogEntry};
///
/// let resolution = resolve(vec![
///     CatalogEntry::new("g1", "a1", "1.0.0"),
///     CatalogEntry::new("g1", "a1", "1.1.0"),
/// ]);
/// assert_eq!(resolution.assets.len(), 1);
/// assert_eq!(resolution.assets[0].coordinates.version, "1.1.0");
/// ```
pub fn resolve(entries: impl IntoIterator<Item = CatalogEntry>) -> Resolution {
    let mut resolution = Resolution::default();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut total = 0usize;

    for entry in entries {
        total += 1;

        let coordinates = match entry.coordinates() {
            Some(c) => c,
            None => {
                tracing::warn!(
                    "Skipping asset with missing identifiers: {}",
                    serde_json::to_string(&entry).unwrap_or_default()
                );
                resolution.skipped += 1;
                continue;
            }
        };

        let key = coordinates.identity_key();
        match index.get(&key) {
            None => {
                tracing::debug!("New asset: {} v{}", key, coordinates.version);
                index.insert(key, resolution.assets.len());
                resolution.assets.push(ResolvedAsset { coordinates, entry });
            }
            Some(&slot) => {
                let kept = &mut resolution.assets[slot];
                let current = Version::parse(&kept.coordinates.version);
                let incoming = Version::parse(&coordinates.version);

                resolution.superseded += 1;
                if incoming.is_newer_than(&current) {
                    tracing::debug!("Updated {}: v{} -> v{}", key, current, incoming);
                    *kept = ResolvedAsset { coordinates, entry };
                } else {
                    tracing::debug!("Keeping {}: v{} (skipping v{})", key, current, incoming);
                }
            }
        }
    }

    tracing::info!(
        "Filtered to {} latest versions from {} total assets ({} skipped)",
        resolution.assets.len(),
        total,
        resolution.skipped
    );

    resolution
}
