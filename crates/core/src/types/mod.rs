//! Core types for bundle stock.
//!
//! This module provides type-safe wrappers and the bundle domain model.

pub mod bundle;
pub mod id;
pub mod linked;
pub mod metafield;
pub mod search;

pub use bundle::{
    BundleComponent, BundleStockInfo, UNKNOWN_COMPONENT_NAME, UNKNOWN_COMPONENT_SKU,
    VARIANT_NAME_FALLBACK, max_bundles, variant_display_name,
};
pub use id::*;
pub use linked::{LinkedComponentRef, LinkedComponentsError, parse_linked_components};
pub use metafield::{
    BUNDLE_NAMESPACE, BundleFlag, IS_BUNDLE_KEY, LINKED_PRODUCT_IDS_KEY, Metafield, detect_bundle,
};
pub use search::filter_bundles;
