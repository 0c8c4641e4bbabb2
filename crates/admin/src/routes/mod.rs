//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check (in `crate::app`)
//!
//! # Bundles (require ?context=<store context>)
//! GET  /bundles?context=&q=            - Bundle stock page
//! GET  /api/bundles/stock?context=     - Bundle stock JSON
//! ```

pub mod api;
pub mod bundles;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the complete admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bundles", get(bundles::index))
        .merge(api::router())
}
