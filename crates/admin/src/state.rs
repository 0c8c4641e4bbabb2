//! Application state shared across handlers.

use std::sync::Arc;

use crate::bigcommerce::{BigCommerceClient, BigCommerceError, build_http_client};
use crate::config::AppConfig;
use crate::models::{SessionResolver, SignedContextResolver, StoreSession};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    http: reqwest::Client,
    sessions: Arc<dyn SessionResolver>,
}

impl AppState {
    /// Create state that accepts contexts signed for the configured store.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: AppConfig) -> Result<Self, BigCommerceError> {
        let sessions = Arc::new(SignedContextResolver::new(&config.bigcommerce, &config.auth));
        Self::with_session_resolver(config, sessions)
    }

    /// Create state with a custom session resolver.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_session_resolver(
        config: AppConfig,
        sessions: Arc<dyn SessionResolver>,
    ) -> Result<Self, BigCommerceError> {
        let http = build_http_client(config.bigcommerce.timeout)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                http,
                sessions,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn sessions(&self) -> &dyn SessionResolver {
        self.inner.sessions.as_ref()
    }

    /// Build a catalog client for the store of `session`.
    ///
    /// The underlying connection pool is shared between stores.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::InvalidUrl` if the configured API URL cannot carry a path.
    pub fn catalog_client(&self, session: &StoreSession) -> Result<BigCommerceClient, BigCommerceError> {
        BigCommerceClient::new(
            self.inner.http.clone(),
            &self.inner.config.bigcommerce.api_url,
            session,
        )
    }
}
