//! BigCommerce REST API client (catalog read access).
//!
//! # Architecture
//!
//! - REST v3 catalog endpoints under `{api_url}/stores/{store_hash}/v3/`
//! - Authentication via the `X-Auth-Token` header of the store session
//! - One client per request, built from the resolved [`StoreSession`]; the
//!   underlying `reqwest::Client` connection pool is shared
//! - Direct API calls on every request (no local sync, no cache)
//!
//! # API Reference
//!
//! - Responses wrap payloads in `{"data": ..., "meta": {...}}`
//! - List endpoints report `meta.pagination.total_pages`
//!
//! [`StoreSession`]: crate::models::StoreSession

mod catalog;
mod client;
pub mod types;

pub use catalog::CatalogSource;
pub use client::{BigCommerceClient, build_http_client};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the BigCommerce API.
#[derive(Debug, Error)]
pub enum BigCommerceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by BigCommerce.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Unauthorized (invalid or revoked access token).
    #[error("Unauthorized: invalid access token")]
    Unauthorized,

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The configured API URL cannot carry a store path.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bigcommerce_error_display() {
        let err = BigCommerceError::NotFound("product 20".to_string());
        assert_eq!(err.to_string(), "Not found: product 20");

        let err = BigCommerceError::Api {
            status: 422,
            message: "bad filter".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 422 - bad filter");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = BigCommerceError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");
    }
}
