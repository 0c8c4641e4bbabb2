//! BigCommerce catalog API types.
//!
//! Only the fields the bundle scan reads are modelled; everything else in the
//! payloads is ignored.

use bundle_stock_core::{CategoryId, ProductId, VariantId};
use serde::Deserialize;

/// Response envelope: `{"data": T, "meta": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub meta: Meta,
}

/// Response metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination metadata of list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total_pages: u32,
}

/// A catalog category.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A catalog product.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub inventory_level: Option<i64>,
    /// Present when requested with `include=variants`.
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// SKU, or an empty string when unset.
    #[must_use]
    pub fn sku(&self) -> &str {
        self.sku.as_deref().unwrap_or_default()
    }

    /// Inventory level, 0 when absent.
    #[must_use]
    pub fn stock(&self) -> i64 {
        self.inventory_level.unwrap_or(0)
    }
}

/// A product variant.
#[derive(Debug, Clone, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub inventory_level: Option<i64>,
    #[serde(default)]
    pub option_values: Vec<OptionValue>,
}

impl Variant {
    /// SKU, or an empty string when unset.
    #[must_use]
    pub fn sku(&self) -> &str {
        self.sku.as_deref().unwrap_or_default()
    }

    /// Inventory level, 0 when absent.
    #[must_use]
    pub fn stock(&self) -> i64 {
        self.inventory_level.unwrap_or(0)
    }

    /// Option value labels in display order (e.g., `["Red", "Large"]`).
    #[must_use]
    pub fn option_labels(&self) -> Vec<&str> {
        self.option_values.iter().map(|v| v.label.as_str()).collect()
    }
}

/// One option value of a variant (e.g., Color: Red).
#[derive(Debug, Clone, Deserialize)]
pub struct OptionValue {
    pub label: String,
}

/// One page of products with the total page count reported by the API.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_pages: u32,
}
