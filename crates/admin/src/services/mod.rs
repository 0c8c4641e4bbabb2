//! Business logic services for admin.
//!
//! # Services
//!
//! - `bundles` - Bundle detection and component stock resolution

pub mod bundles;

pub use bundles::{
    BundleError, build_bundle_report, fetch_category_products, resolve_component,
    resolve_components,
};
