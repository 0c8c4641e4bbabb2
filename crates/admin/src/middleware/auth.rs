//! Store session extractor.
//!
//! Every bundle route requires a signed `context` query parameter identifying
//! the store. The extractor verifies it before the handler runs, so a request
//! without a valid signature never reaches BigCommerce.

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};

use crate::error::AppError;
use crate::models::StoreSession;
use crate::state::AppState;

/// Query parameter carrying the signed BigCommerce store context.
pub const CONTEXT_PARAM: &str = "context";

/// Extractor that requires a verified store session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireStoreSession(session): RequireStoreSession) -> String {
///     session.store_hash
/// }
/// ```
#[derive(Debug)]
pub struct RequireStoreSession(pub StoreSession);

impl FromRequestParts<AppState> for RequireStoreSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let mut query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();

        let context = query
            .remove(CONTEXT_PARAM)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing store context".to_string()))?;

        let session = state.sessions().resolve(&context).ok_or_else(|| {
            tracing::warn!(path = %parts.uri.path(), "Rejected store context");
            AppError::Unauthorized("Invalid store context".to_string())
        })?;

        Ok(Self(session))
    }
}
