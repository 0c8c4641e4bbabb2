//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BIGCOMMERCE_STORE_HASH` - Store hash of the BigCommerce store served by this app
//! - `BIGCOMMERCE_ACCESS_TOKEN` - API account access token (catalog read scope)
//! - `BIGCOMMERCE_CLIENT_ID` - App client id, the expected audience of signed contexts
//! - `BIGCOMMERCE_CLIENT_SECRET` - App client secret that signs the `context` token
//!
//! ## Optional
//! - `APP_HOST` - Bind address (default: 127.0.0.1)
//! - `APP_PORT` - Listen port (default: 3000)
//! - `BIGCOMMERCE_API_URL` - API base URL (default: <https://api.bigcommerce.com>)
//! - `BIGCOMMERCE_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `BUNDLE_CATEGORY` - Category scanned for bundles (default: Bundle)
//! - `BUNDLE_PAGE_SIZE` - Products per catalog page, 1-250 (default: 50)
//! - `BUNDLE_COMPONENT_CONCURRENCY` - Component lookups in flight per bundle (default: 4)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_API_URL: &str = "https://api.bigcommerce.com";
const DEFAULT_BUNDLE_CATEGORY: &str = "Bundle";
const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 250;
const DEFAULT_COMPONENT_CONCURRENCY: usize = 4;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// BigCommerce API configuration
    pub bigcommerce: BigCommerceConfig,
    /// App credentials used to verify the signed store context
    pub auth: AppAuthConfig,
    /// Bundle scan settings
    pub bundles: BundleConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// BigCommerce API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct BigCommerceConfig {
    /// Store hash (the `{store_hash}` path segment of API URLs)
    pub store_hash: String,
    /// API account access token
    pub access_token: SecretString,
    /// API base URL, without the `/stores/...` suffix
    pub api_url: Url,
    /// Timeout applied to each API request
    pub timeout: Duration,
}

impl std::fmt::Debug for BigCommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigCommerceConfig")
            .field("store_hash", &self.store_hash)
            .field("access_token", &"[REDACTED]")
            .field("api_url", &self.api_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Credentials of the registered BigCommerce app.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct AppAuthConfig {
    /// App client id (`aud` claim of signed payloads)
    pub client_id: String,
    /// App client secret (HS256 signing key of signed payloads)
    pub client_secret: SecretString,
}

impl std::fmt::Debug for AppAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Settings for the bundle scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleConfig {
    /// Name of the category holding bundle products
    pub category: String,
    /// Products requested per catalog page
    pub page_size: u32,
    /// Component lookups kept in flight per bundle (1 = strictly sequential)
    pub component_concurrency: usize,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            category: DEFAULT_BUNDLE_CATEGORY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            component_concurrency: DEFAULT_COMPONENT_CONCURRENCY,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the access token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("APP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("APP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("APP_PORT".to_string(), e.to_string()))?;

        let bigcommerce = BigCommerceConfig::from_env()?;
        let auth = AppAuthConfig::from_env()?;
        let bundles = BundleConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            bigcommerce,
            auth,
            bundles,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BigCommerceConfig {
    /// Load BigCommerce settings from environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the store hash or token is missing, the token
    /// looks like a placeholder, or the URL/timeout cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = parse_api_url(&get_env_or_default("BIGCOMMERCE_API_URL", DEFAULT_API_URL))?;
        let timeout_secs = get_env_or_default("BIGCOMMERCE_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BIGCOMMERCE_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            store_hash: get_required_env("BIGCOMMERCE_STORE_HASH")?,
            access_token: get_validated_secret("BIGCOMMERCE_ACCESS_TOKEN")?,
            api_url,
            timeout: Duration::from_secs(if timeout_secs == 0 {
                DEFAULT_TIMEOUT_SECS
            } else {
                timeout_secs
            }),
        })
    }
}

impl AppAuthConfig {
    /// Load app credentials from environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either variable is missing or the secret
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: get_required_env("BIGCOMMERCE_CLIENT_ID")?,
            client_secret: get_validated_secret("BIGCOMMERCE_CLIENT_SECRET")?,
        })
    }
}

impl BundleConfig {
    /// Load bundle scan settings from environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for an out-of-range page size or
    /// concurrency.
    pub fn from_env() -> Result<Self, ConfigError> {
        let page_size = parse_page_size(&get_env_or_default(
            "BUNDLE_PAGE_SIZE",
            &DEFAULT_PAGE_SIZE.to_string(),
        ))?;
        let component_concurrency = parse_concurrency(&get_env_or_default(
            "BUNDLE_COMPONENT_CONCURRENCY",
            &DEFAULT_COMPONENT_CONCURRENCY.to_string(),
        ))?;

        Ok(Self {
            category: get_env_or_default("BUNDLE_CATEGORY", DEFAULT_BUNDLE_CATEGORY),
            page_size,
            component_concurrency,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar("BIGCOMMERCE_API_URL".to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "BIGCOMMERCE_API_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

fn parse_page_size(value: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("BUNDLE_PAGE_SIZE".to_string(), reason);
    let size = value.parse::<u32>().map_err(|e| invalid(e.to_string()))?;
    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(invalid(format!("must be between 1 and {MAX_PAGE_SIZE}")));
    }
    Ok(size)
}

fn parse_concurrency(value: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::InvalidEnvVar("BUNDLE_COMPONENT_CONCURRENCY".to_string(), reason)
    };
    let width = value.parse::<usize>().map_err(|e| invalid(e.to_string()))?;
    if width == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    Ok(width)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real API tokens have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued by BigCommerce."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
impl AppConfig {
    /// Single-store configuration for unit tests.
    pub(crate) fn for_tests(store_hash: &str, client_secret: &str) -> Self {
        Self {
            host: IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            port: 3000,
            bigcommerce: BigCommerceConfig {
                store_hash: store_hash.to_string(),
                access_token: SecretString::from("token-value"),
                api_url: Url::parse(DEFAULT_API_URL).unwrap(),
                timeout: Duration::from_secs(5),
            },
            auth: AppAuthConfig {
                client_id: "bundle-stock-test".to_string(),
                client_secret: SecretString::from(client_secret),
            },
            bundles: BundleConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}
