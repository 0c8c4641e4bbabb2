//! Catalog read operations used by the bundle scan.

use std::future::Future;

use bundle_stock_core::{BUNDLE_NAMESPACE, CategoryId, Metafield, ProductId, VariantId};
use tracing::instrument;

use super::BigCommerceError;
use super::client::BigCommerceClient;
use super::types::{Category, Envelope, Product, ProductPage, Variant};

/// Metafields requested per entity; the bundle namespace holds two keys.
const METAFIELD_PAGE_LIMIT: &str = "250";

/// Read access to a store catalog.
///
/// Implemented by [`BigCommerceClient`]; the bundle resolution functions are
/// generic over it so they can run against an in-memory catalog in tests.
pub trait CatalogSource: Sync {
    /// Look up a category by exact name.
    fn find_category(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Category>, BigCommerceError>> + Send;

    /// Fetch one page (1-based) of the products in a category, variants included.
    fn products_page(
        &self,
        category_id: CategoryId,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<ProductPage, BigCommerceError>> + Send;

    /// Fetch a single product.
    fn product(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Product, BigCommerceError>> + Send;

    /// Fetch a single variant of a product.
    fn variant(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
    ) -> impl Future<Output = Result<Variant, BigCommerceError>> + Send;

    /// Metafields of a product in the `bundle` namespace.
    fn product_metafields(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Vec<Metafield>, BigCommerceError>> + Send;

    /// Metafields of a variant in the `bundle` namespace.
    fn variant_metafields(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
    ) -> impl Future<Output = Result<Vec<Metafield>, BigCommerceError>> + Send;
}

impl CatalogSource for BigCommerceClient {
    #[instrument(skip(self))]
    async fn find_category(&self, name: &str) -> Result<Option<Category>, BigCommerceError> {
        let url = self.endpoint(&["catalog", "categories"], &[("name", name)]);
        let response: Envelope<Vec<Category>> = self.get(url).await?;

        Ok(response.data.into_iter().find(|c| c.name == name))
    }

    #[instrument(skip_all, fields(category_id = %category_id, page = page, limit = limit))]
    async fn products_page(
        &self,
        category_id: CategoryId,
        page: u32,
        limit: u32,
    ) -> Result<ProductPage, BigCommerceError> {
        let category = category_id.to_string();
        let page_param = page.to_string();
        let limit_param = limit.to_string();
        let url = self.endpoint(
            &["catalog", "products"],
            &[
                ("categories:in", category.as_str()),
                ("include", "variants"),
                ("limit", limit_param.as_str()),
                ("page", page_param.as_str()),
            ],
        );
        let response: Envelope<Vec<Product>> = self.get(url).await?;

        let total_pages = response
            .meta
            .pagination
            .map_or(1, |pagination| pagination.total_pages);

        Ok(ProductPage {
            products: response.data,
            total_pages,
        })
    }

    #[instrument(skip_all, fields(product_id = %product_id))]
    async fn product(&self, product_id: ProductId) -> Result<Product, BigCommerceError> {
        let id = product_id.to_string();
        let url = self.endpoint(&["catalog", "products", id.as_str()], &[]);
        let response: Envelope<Product> = self.get(url).await?;
        Ok(response.data)
    }

    #[instrument(skip_all, fields(product_id = %product_id, variant_id = %variant_id))]
    async fn variant(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
    ) -> Result<Variant, BigCommerceError> {
        let product = product_id.to_string();
        let variant = variant_id.to_string();
        let url = self.endpoint(
            &["catalog", "products", product.as_str(), "variants", variant.as_str()],
            &[],
        );
        let response: Envelope<Variant> = self.get(url).await?;
        Ok(response.data)
    }

    #[instrument(skip_all, fields(product_id = %product_id))]
    async fn product_metafields(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Metafield>, BigCommerceError> {
        let product = product_id.to_string();
        let url = self.endpoint(
            &["catalog", "products", product.as_str(), "metafields"],
            &[("namespace", BUNDLE_NAMESPACE), ("limit", METAFIELD_PAGE_LIMIT)],
        );
        let response: Envelope<Vec<Metafield>> = self.get(url).await?;
        Ok(response.data)
    }

    #[instrument(skip_all, fields(product_id = %product_id, variant_id = %variant_id))]
    async fn variant_metafields(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
    ) -> Result<Vec<Metafield>, BigCommerceError> {
        let product = product_id.to_string();
        let variant = variant_id.to_string();
        let url = self.endpoint(
            &[
                "catalog",
                "products",
                product.as_str(),
                "variants",
                variant.as_str(),
                "metafields",
            ],
            &[("namespace", BUNDLE_NAMESPACE), ("limit", METAFIELD_PAGE_LIMIT)],
        );
        let response: Envelope<Vec<Metafield>> = self.get(url).await?;
        Ok(response.data)
    }
}
