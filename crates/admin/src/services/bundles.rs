//! Bundle resolution: scan a category, detect bundles, resolve component stock.
//!
//! Every function takes the catalog explicitly. Nothing is cached between
//! calls, so each report reflects live inventory.

use bundle_stock_core::{
    BundleComponent, BundleFlag, BundleStockInfo, LinkedComponentRef, LinkedComponentsError,
    Metafield, detect_bundle, variant_display_name,
};
use futures::{StreamExt, stream};
use thiserror::Error;
use tracing::instrument;

use crate::bigcommerce::{BigCommerceError, CatalogSource, Product};
use crate::config::BundleConfig;

/// Errors that fail a whole bundle report.
#[derive(Debug, Error)]
pub enum BundleError {
    /// A catalog page or metafield lookup failed.
    #[error("catalog request failed: {0}")]
    Catalog(#[from] BigCommerceError),

    /// A bundle's `linked_product_ids` metafield could not be parsed.
    #[error("invalid linked components on {entity}: {source}")]
    InvalidComponents {
        /// The product or variant carrying the metafield.
        entity: String,
        #[source]
        source: LinkedComponentsError,
    },
}

/// Fetch every product in the named category, following pagination.
///
/// Returns an empty list when no category has that name. Pages are requested
/// one at a time; any failed page fails the whole fetch.
///
/// # Errors
///
/// Returns `BundleError::Catalog` if the category lookup or any page fails.
#[instrument(skip(catalog))]
pub async fn fetch_category_products<C: CatalogSource>(
    catalog: &C,
    category: &str,
    page_size: u32,
) -> Result<Vec<Product>, BundleError> {
    let Some(category) = catalog.find_category(category).await? else {
        tracing::info!("Bundle category not found");
        return Ok(Vec::new());
    };

    let mut products = Vec::new();
    let mut page = 1;
    loop {
        let batch = catalog.products_page(category.id, page, page_size).await?;
        tracing::debug!(
            page,
            total_pages = batch.total_pages,
            count = batch.products.len(),
            "Fetched product page"
        );
        products.extend(batch.products);

        if page >= batch.total_pages {
            break;
        }
        page += 1;
    }

    Ok(products)
}

/// Resolve one linked reference to a component with current stock.
///
/// Lookup failures never propagate: the component degrades to the
/// "Unknown Component" placeholder with zero stock.
pub async fn resolve_component<C: CatalogSource>(
    catalog: &C,
    reference: &LinkedComponentRef,
) -> BundleComponent {
    match lookup_component(catalog, reference).await {
        Ok(component) => component,
        Err(e) => {
            tracing::warn!(
                product_id = %reference.product_id,
                variant_id = ?reference.variant_id.map(|v| v.as_u64()),
                error = %e,
                "Component lookup failed, using placeholder"
            );
            BundleComponent::unknown(reference)
        }
    }
}

async fn lookup_component<C: CatalogSource>(
    catalog: &C,
    reference: &LinkedComponentRef,
) -> Result<BundleComponent, BigCommerceError> {
    if let Some(variant_id) = reference.variant_id {
        let variant = catalog.variant(reference.product_id, variant_id).await?;
        let product = catalog.product(reference.product_id).await?;
        let name = variant_display_name(&product.name, &variant.option_labels());

        return Ok(BundleComponent::resolved(
            reference,
            name,
            variant.sku().to_string(),
            variant.stock(),
        ));
    }

    let product = catalog.product(reference.product_id).await?;
    Ok(BundleComponent::resolved(
        reference,
        product.name.clone(),
        product.sku().to_string(),
        product.stock(),
    ))
}

/// Resolve references with at most `concurrency` lookups in flight.
///
/// The output order always matches `references`.
pub async fn resolve_components<C: CatalogSource>(
    catalog: &C,
    references: &[LinkedComponentRef],
    concurrency: usize,
) -> Vec<BundleComponent> {
    stream::iter(references.iter().copied())
        .map(|reference| async move { resolve_component(catalog, &reference).await })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Build the stock report for every bundle in the configured category.
///
/// Products come in catalog order; each product's own record (if it is a
/// bundle) precedes the records of its bundle variants.
///
/// # Errors
///
/// Returns `BundleError` if fetching products or metafields fails, or if a
/// bundle's component list is malformed. Component lookups never fail the report.
#[instrument(skip_all, fields(category = %config.category))]
pub async fn build_bundle_report<C: CatalogSource>(
    catalog: &C,
    config: &BundleConfig,
) -> Result<Vec<BundleStockInfo>, BundleError> {
    let products = fetch_category_products(catalog, &config.category, config.page_size).await?;
    let mut bundles = Vec::new();

    for product in &products {
        let metafields = catalog.product_metafields(product.id).await?;
        let entity = format!("product {}", product.id);
        if let Some(references) = bundle_references(&metafields, &entity)? {
            let components =
                resolve_components(catalog, &references, config.component_concurrency).await;
            bundles.push(BundleStockInfo {
                id: product.id.as_u64(),
                name: product.name.clone(),
                sku: product.sku().to_string(),
                stock: product.stock(),
                components,
            });
        }

        for variant in &product.variants {
            let metafields = catalog.variant_metafields(product.id, variant.id).await?;
            let entity = format!("variant {} of product {}", variant.id, product.id);
            if let Some(references) = bundle_references(&metafields, &entity)? {
                let components =
                    resolve_components(catalog, &references, config.component_concurrency).await;
                bundles.push(BundleStockInfo {
                    id: variant.id.as_u64(),
                    name: variant_display_name(&product.name, &variant.option_labels()),
                    sku: variant.sku().to_string(),
                    stock: variant.stock(),
                    components,
                });
            }
        }
    }

    tracing::info!(
        products = products.len(),
        bundles = bundles.len(),
        "Bundle report built"
    );
    Ok(bundles)
}

fn bundle_references(
    metafields: &[Metafield],
    entity: &str,
) -> Result<Option<Vec<LinkedComponentRef>>, BundleError> {
    let flag = detect_bundle(metafields).map_err(|source| BundleError::InvalidComponents {
        entity: entity.to_string(),
        source,
    })?;

    if flag == BundleFlag::MissingComponents {
        tracing::debug!(entity, "Flagged as bundle without linked_product_ids, skipping");
    }

    Ok(flag.into_components())
}
