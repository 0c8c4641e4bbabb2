//! Bundle stock page.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};
use bundle_stock_core::{BundleComponent, BundleStockInfo, filter_bundles};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    error::AppError, middleware::RequireStoreSession, services::build_bundle_report,
    state::AppState,
};

/// Query parameters for the bundles page.
#[derive(Debug, Default, Deserialize)]
pub struct BundlesQuery {
    pub context: Option<String>,
    pub q: Option<String>,
}

/// Component row for templates.
#[derive(Debug, Clone)]
pub struct ComponentRowView {
    pub name: String,
    pub sku: String,
    pub product_id: u64,
    pub variant_label: String,
    pub quantity: i64,
    pub stock: i64,
    pub max_bundles: u64,
    pub is_limiting: bool,
}

impl ComponentRowView {
    fn new(component: &BundleComponent, is_limiting: bool) -> Self {
        Self {
            name: component.name.clone(),
            sku: component.sku.clone(),
            product_id: component.product_id.as_u64(),
            variant_label: component
                .variant_id
                .map_or_else(|| "-".to_string(), |v| v.to_string()),
            quantity: component.quantity,
            stock: component.stock,
            max_bundles: component.max_bundles,
            is_limiting,
        }
    }
}

/// Bundle row for templates.
#[derive(Debug, Clone)]
pub struct BundleRowView {
    pub id: u64,
    pub name: String,
    pub sku: String,
    pub stock: i64,
    pub buildable: u64,
    pub components: Vec<ComponentRowView>,
}

impl From<&BundleStockInfo> for BundleRowView {
    fn from(bundle: &BundleStockInfo) -> Self {
        Self {
            id: bundle.id,
            name: bundle.name.clone(),
            sku: bundle.sku.clone(),
            stock: bundle.stock,
            buildable: bundle.buildable(),
            components: bundle
                .components
                .iter()
                .map(|c| ComponentRowView::new(c, bundle.is_limiting(c)))
                .collect(),
        }
    }
}

/// Bundles index page template.
#[derive(Template)]
#[template(path = "bundles/index.html")]
pub struct BundlesIndexTemplate {
    pub context: String,
    pub search_query: String,
    pub bundles: Vec<BundleRowView>,
    pub total_count: usize,
}

/// Bundles index page handler.
///
/// # Errors
///
/// Returns 401 if the store context does not resolve, 500 if the report fails.
#[instrument(skip_all, fields(store_hash = tracing::field::Empty))]
pub async fn index(
    RequireStoreSession(session): RequireStoreSession,
    State(state): State<AppState>,
    Query(query): Query<BundlesQuery>,
) -> Result<Html<String>, AppError> {
    tracing::Span::current().record("store_hash", session.store_hash.as_str());

    let catalog = state.catalog_client(&session)?;
    let report = build_bundle_report(&catalog, &state.config().bundles).await?;

    let search_query = query.q.unwrap_or_default();
    let bundles = filter_bundles(&report, &search_query)
        .into_iter()
        .map(BundleRowView::from)
        .collect();

    let template = BundlesIndexTemplate {
        context: query.context.unwrap_or_default(),
        search_query,
        bundles,
        total_count: report.len(),
    };

    let html = template
        .render()
        .map_err(|e| AppError::Internal(format!("Template render error: {e}")))?;
    Ok(Html(html))
}
