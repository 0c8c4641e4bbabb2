//! Bundle stock API handlers.

use axum::{Json, Router, extract::State, routing::get};
use bundle_stock_core::BundleStockInfo;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    error::AppError, middleware::RequireStoreSession, services::build_bundle_report,
    state::AppState,
};

/// Build the bundles API router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/bundles/stock",
        get(stock).fallback(method_not_allowed),
    )
}

/// Response for the bundle stock endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct BundlesResponse {
    pub bundles: Vec<BundleStockInfo>,
}

/// Bundle stock for every bundle in the configured category.
///
/// # Errors
///
/// Returns 401 if the store context does not resolve, 500 if any catalog or
/// metafield request fails or a component list is malformed.
#[instrument(skip_all, fields(store_hash = tracing::field::Empty))]
pub async fn stock(
    RequireStoreSession(session): RequireStoreSession,
    State(state): State<AppState>,
) -> Result<Json<BundlesResponse>, AppError> {
    tracing::Span::current().record("store_hash", session.store_hash.as_str());

    let catalog = state.catalog_client(&session)?;
    let bundles = build_bundle_report(&catalog, &state.config().bundles).await?;

    Ok(Json(BundlesResponse { bundles }))
}

/// Rejects every method other than GET (and HEAD) before any processing.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("Method not allowed".to_string())
}
