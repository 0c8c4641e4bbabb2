//! Bundle records and the buildable-quantity arithmetic.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, VariantId};
use super::linked::LinkedComponentRef;

/// Name shown for a component whose lookup failed.
pub const UNKNOWN_COMPONENT_NAME: &str = "Unknown Component";

/// SKU shown for a component whose lookup failed.
pub const UNKNOWN_COMPONENT_SKU: &str = "N/A";

/// Label used when a variant has no option values.
pub const VARIANT_NAME_FALLBACK: &str = "Variant";

/// Number of complete bundles that `stock` units can supply when each bundle
/// consumes `quantity` units.
///
/// Non-positive quantities are malformed references and yield zero, as does
/// negative stock.
///
/// ```
/// use bundle_stock_core::max_bundles;
///
/// assert_eq!(max_bundles(10, 2), 5);
/// assert_eq!(max_bundles(7, 3), 2);
/// assert_eq!(max_bundles(7, 0), 0);
/// ```
#[must_use]
pub fn max_bundles(stock: i64, quantity: i64) -> u64 {
    if quantity <= 0 || stock <= 0 {
        return 0;
    }
    u64::try_from(stock / quantity).unwrap_or(0)
}

/// Display name of a variant: `"<product> - <label> - <label>"`.
///
/// Falls back to `"<product> - Variant"` when the variant has no option values.
#[must_use]
pub fn variant_display_name<S: AsRef<str>>(product_name: &str, option_labels: &[S]) -> String {
    let labels = option_labels
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" - ");

    if labels.is_empty() {
        format!("{product_name} - {VARIANT_NAME_FALLBACK}")
    } else {
        format!("{product_name} - {labels}")
    }
}

/// A resolved component of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleComponent {
    /// Component product.
    pub product_id: ProductId,
    /// Component variant, when the bundle consumes a specific variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    /// Display name.
    pub name: String,
    /// Component SKU.
    pub sku: String,
    /// Units consumed per bundle.
    pub quantity: i64,
    /// Current inventory level.
    pub stock: i64,
    /// Bundles buildable from this component's stock alone.
    pub max_bundles: u64,
}

impl BundleComponent {
    /// Build a component from a reference and the looked-up catalog values.
    #[must_use]
    pub fn resolved(reference: &LinkedComponentRef, name: String, sku: String, stock: i64) -> Self {
        Self {
            product_id: reference.product_id,
            variant_id: reference.variant_id,
            name,
            sku,
            quantity: reference.quantity,
            stock,
            max_bundles: max_bundles(stock, reference.quantity),
        }
    }

    /// Placeholder used when the component could not be looked up.
    #[must_use]
    pub fn unknown(reference: &LinkedComponentRef) -> Self {
        Self {
            product_id: reference.product_id,
            variant_id: reference.variant_id,
            name: UNKNOWN_COMPONENT_NAME.to_string(),
            sku: UNKNOWN_COMPONENT_SKU.to_string(),
            quantity: reference.quantity,
            stock: 0,
            max_bundles: 0,
        }
    }
}

/// Stock information for one bundle product or bundle variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleStockInfo {
    /// Product id for product bundles, variant id for variant bundles.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Bundle SKU.
    pub sku: String,
    /// The bundle's own inventory level.
    pub stock: i64,
    /// Components in the order they are linked.
    pub components: Vec<BundleComponent>,
}

impl BundleStockInfo {
    /// Bundles buildable from current component stock: the minimum
    /// `max_bundles` across components, or 0 when there are none.
    #[must_use]
    pub fn buildable(&self) -> u64 {
        self.components
            .iter()
            .map(|c| c.max_bundles)
            .min()
            .unwrap_or(0)
    }

    /// Whether `component` is a binding constraint on [`Self::buildable`].
    #[must_use]
    pub fn is_limiting(&self, component: &BundleComponent) -> bool {
        !self.components.is_empty() && component.max_bundles == self.buildable()
    }

    /// Components whose `max_bundles` equals the minimum.
    pub fn limiting_components(&self) -> impl Iterator<Item = &BundleComponent> {
        let min = self.buildable();
        self.components.iter().filter(move |c| c.max_bundles == min)
    }
}
