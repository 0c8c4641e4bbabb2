//! HTTP plumbing for the BigCommerce REST API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::BigCommerceError;
use crate::models::StoreSession;

/// Header carrying the API account access token.
const AUTH_HEADER: &str = "X-Auth-Token";

/// Build the shared HTTP client used for all stores.
///
/// # Errors
///
/// Returns error if the HTTP client fails to build.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, BigCommerceError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}

/// BigCommerce API client bound to one store.
#[derive(Clone)]
pub struct BigCommerceClient {
    inner: Arc<BigCommerceClientInner>,
}

struct BigCommerceClientInner {
    client: reqwest::Client,
    /// `{api_url}/stores/{store_hash}/v3`
    base_url: Url,
    store_hash: String,
    access_token: SecretString,
}

impl BigCommerceClient {
    /// Create a client for the store of `session`.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::InvalidUrl` if `api_url` cannot carry a path.
    pub fn new(
        client: reqwest::Client,
        api_url: &Url,
        session: &StoreSession,
    ) -> Result<Self, BigCommerceError> {
        let mut base_url = api_url.clone();
        base_url
            .path_segments_mut()
            .map_err(|()| BigCommerceError::InvalidUrl(api_url.to_string()))?
            .pop_if_empty()
            .extend(["stores", session.store_hash.as_str(), "v3"]);

        Ok(Self {
            inner: Arc::new(BigCommerceClientInner {
                client,
                base_url,
                store_hash: session.store_hash.clone(),
                access_token: session.access_token.clone(),
            }),
        })
    }

    /// Build an endpoint URL from path segments and query pairs.
    pub(crate) fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// Execute a GET request and decode the JSON body.
    #[instrument(skip_all, fields(store_hash = %self.inner.store_hash, url = %url))]
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, BigCommerceError> {
        let response = self
            .inner
            .client
            .get(url)
            .header(AUTH_HEADER, self.inner.access_token.expose_secret())
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BigCommerceError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| BigCommerceError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(self.parse_error(response).await)
    }

    /// Parse error response from the BigCommerce API.
    async fn parse_error(&self, response: reqwest::Response) -> BigCommerceError {
        let status = response.status().as_u16();

        // Check for rate limiting
        if status == 429 {
            let retry_after = response
                .headers()
                .get("X-Rate-Limit-Time-Reset-Ms")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map_or(60, |ms| ms.div_ceil(1000));
            return BigCommerceError::RateLimited(retry_after);
        }

        // Check for unauthorized
        if status == 401 || status == 403 {
            return BigCommerceError::Unauthorized;
        }

        // Check for not found
        if status == 404 {
            return BigCommerceError::NotFound(response.url().path().to_string());
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        BigCommerceError::Api { status, message }
    }
}

impl std::fmt::Debug for BigCommerceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigCommerceClient")
            .field("store_hash", &self.inner.store_hash)
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
