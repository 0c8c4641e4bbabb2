//! The metafield contract that marks catalog entities as bundles.
//!
//! A product or variant is a bundle when it carries
//! `bundle/is_bundle = "true"`; its components are listed as JSON in the
//! sibling `bundle/linked_product_ids` metafield.

use serde::{Deserialize, Serialize};

use super::linked::{LinkedComponentRef, LinkedComponentsError, parse_linked_components};

/// Metafield namespace owned by this app.
pub const BUNDLE_NAMESPACE: &str = "bundle";

/// Key of the bundle flag.
pub const IS_BUNDLE_KEY: &str = "is_bundle";

/// Key of the JSON component list.
pub const LINKED_PRODUCT_IDS_KEY: &str = "linked_product_ids";

/// A namespaced key/value attribute attached to a product or variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metafield {
    /// Namespace (e.g., `bundle`).
    pub namespace: String,
    /// Key within the namespace.
    pub key: String,
    /// Raw string value.
    pub value: String,
}

impl Metafield {
    /// Create a metafield from its parts.
    #[must_use]
    pub fn new(namespace: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    fn is(&self, key: &str) -> bool {
        self.namespace == BUNDLE_NAMESPACE && self.key == key
    }
}

/// Outcome of inspecting an entity's metafields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleFlag {
    /// The entity is not flagged as a bundle.
    NotABundle,
    /// Flagged with `is_bundle = "true"` but has no `linked_product_ids` entry.
    MissingComponents,
    /// A bundle with its parsed component references.
    Bundle(Vec<LinkedComponentRef>),
}

impl BundleFlag {
    /// Component references, if this is a usable bundle.
    #[must_use]
    pub fn into_components(self) -> Option<Vec<LinkedComponentRef>> {
        match self {
            Self::Bundle(refs) => Some(refs),
            Self::NotABundle | Self::MissingComponents => None,
        }
    }
}

/// Decide whether a set of metafields describes a bundle.
///
/// Only the exact string `"true"` sets the flag. The first matching
/// `linked_product_ids` entry is used.
///
/// # Errors
///
/// Returns [`LinkedComponentsError`] when the entity is flagged and its
/// component list cannot be parsed.
pub fn detect_bundle(metafields: &[Metafield]) -> Result<BundleFlag, LinkedComponentsError> {
    let flagged = metafields
        .iter()
        .any(|m| m.is(IS_BUNDLE_KEY) && m.value == "true");
    if !flagged {
        return Ok(BundleFlag::NotABundle);
    }

    let Some(linked) = metafields.iter().find(|m| m.is(LINKED_PRODUCT_IDS_KEY)) else {
        return Ok(BundleFlag::MissingComponents);
    };

    parse_linked_components(&linked.value).map(BundleFlag::Bundle)
}
