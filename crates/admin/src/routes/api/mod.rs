//! API route handlers for admin.
//!
//! JSON endpoints consumed by the BigCommerce control panel app.

pub mod bundles;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new().merge(bundles::router())
}
