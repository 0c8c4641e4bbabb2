//! Search filtering over bundle records.

use super::bundle::BundleStockInfo;

/// Filter bundles by a case-insensitive substring of their name or SKU.
///
/// Component names and SKUs are never searched; a matching bundle keeps all
/// of its components. A blank query matches everything.
#[must_use]
pub fn filter_bundles<'a>(bundles: &'a [BundleStockInfo], query: &str) -> Vec<&'a BundleStockInfo> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return bundles.iter().collect();
    }

    bundles
        .iter()
        .filter(|b| {
            b.name.to_lowercase().contains(&needle) || b.sku.to_lowercase().contains(&needle)
        })
        .collect()
}
