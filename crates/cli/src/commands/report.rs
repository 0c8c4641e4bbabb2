//! Bundle stock report command.
//!
//! # Environment Variables
//!
//! - `BIGCOMMERCE_STORE_HASH` - Store to scan
//! - `BIGCOMMERCE_ACCESS_TOKEN` - API account token
//! - `BIGCOMMERCE_API_URL`, `BIGCOMMERCE_TIMEOUT_SECS` - Optional client settings
//! - `BUNDLE_CATEGORY`, `BUNDLE_PAGE_SIZE`, `BUNDLE_COMPONENT_CONCURRENCY` - Scan settings

use bundle_stock_admin::bigcommerce::{BigCommerceClient, BigCommerceError, build_http_client};
use bundle_stock_admin::config::{BigCommerceConfig, BundleConfig, ConfigError};
use bundle_stock_admin::models::StoreSession;
use bundle_stock_admin::services::{BundleError, build_bundle_report};
use bundle_stock_core::{BundleStockInfo, filter_bundles};
use thiserror::Error;

/// Errors that can occur while producing the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Environment configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The BigCommerce client could not be created.
    #[error("BigCommerce error: {0}")]
    BigCommerce(#[from] BigCommerceError),

    /// Building the report failed.
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// Serializing the JSON payload failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options of the `report` subcommand.
#[derive(Debug, Default)]
pub struct ReportOptions {
    pub category: Option<String>,
    pub query: Option<String>,
    pub json: bool,
}

/// Resolve every bundle and print the report to stdout.
///
/// # Errors
///
/// Returns `ReportError` if configuration is invalid or any fatal catalog
/// request fails.
pub async fn run(options: &ReportOptions) -> Result<(), ReportError> {
    dotenvy::dotenv().ok();

    let bigcommerce = BigCommerceConfig::from_env()?;
    let mut bundles = BundleConfig::from_env()?;
    if let Some(category) = &options.category {
        bundles.category.clone_from(category);
    }

    let session = StoreSession::new(
        bigcommerce.store_hash.clone(),
        bigcommerce.access_token.clone(),
    );
    let client = BigCommerceClient::new(
        build_http_client(bigcommerce.timeout)?,
        &bigcommerce.api_url,
        &session,
    )?;

    tracing::info!(store_hash = %session.store_hash, category = %bundles.category, "Building report");
    let report = build_bundle_report(&client, &bundles).await?;
    let selected = filter_bundles(&report, options.query.as_deref().unwrap_or_default());

    let output = if options.json {
        serde_json::to_string_pretty(&serde_json::json!({ "bundles": selected }))?
    } else {
        render_table(&selected)
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}

/// Plain-text report: one header line per bundle, then its components with
/// the limiting ones marked `*`.
fn render_table(bundles: &[&BundleStockInfo]) -> String {
    if bundles.is_empty() {
        return "No bundles found.".to_string();
    }

    let mut out = String::new();
    for bundle in bundles {
        out.push_str(&format!(
            "{} [{}]  stock {}  buildable {}\n",
            bundle.name,
            bundle.sku,
            bundle.stock,
            bundle.buildable()
        ));
        for component in &bundle.components {
            let marker = if bundle.is_limiting(component) { '*' } else { ' ' };
            out.push_str(&format!(
                "  {marker} {:<32} {:<16} qty {:>3}  stock {:>6}  max {:>6}\n",
                component.name,
                component.sku,
                component.quantity,
                component.stock,
                component.max_bundles
            ));
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use bundle_stock_core::{BundleComponent, LinkedComponentRef, ProductId};

    use super::*;

    fn bundle(name: &str, stocks: &[(i64, i64)]) -> BundleStockInfo {
        let components = stocks
            .iter()
            .enumerate()
            .map(|(i, &(quantity, stock))| {
                let reference = LinkedComponentRef {
                    product_id: ProductId::new(100 + i as u64),
                    variant_id: None,
                    quantity,
                };
                BundleComponent::resolved(&reference, format!("Part {i}"), format!("P-{i}"), stock)
            })
            .collect();
        BundleStockInfo {
            id: 1,
            name: name.to_string(),
            sku: "BDL".to_string(),
            stock: 2,
            components,
        }
    }

    #[test]
    fn test_table_marks_limiting_components() {
        let report = bundle("Starter Kit", &[(2, 10), (1, 3)]);
        let table = render_table(&[&report]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Starter Kit [BDL]  stock 2  buildable 3");
        assert!(lines[1].starts_with("    Part 0"));
        assert!(lines[2].starts_with("  * Part 1"));
    }

    #[test]
    fn test_table_lists_bundles_in_order() {
        let first = bundle("Starter Kit", &[(1, 4)]);
        let second = bundle("Travel Kit", &[(3, 3), (1, 9)]);
        let table = render_table(&[&first, &second]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Starter Kit [BDL]  stock 2  buildable 4");
        assert!(lines[1].starts_with("  * Part 0"));
        assert_eq!(lines[2], "Travel Kit [BDL]  stock 2  buildable 1");
        assert!(lines[3].starts_with("  * Part 0"));
        assert!(lines[4].starts_with("    Part 1"));
        assert!(!table.ends_with('\n'));
    }

    #[test]
    fn test_table_empty_report() {
        assert_eq!(render_table(&[]), "No bundles found.");
    }
}
