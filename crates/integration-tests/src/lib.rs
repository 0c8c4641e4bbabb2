//! Integration test harness for the bundle stock admin app.
//!
//! A [`TestContext`] starts a `wiremock` server standing in for the
//! BigCommerce REST API and builds the real axum router pointed at it.
//! Requests are driven through the router with `tower::ServiceExt::oneshot`,
//! so no port is bound for the app itself.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bundle-stock-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use bundle_stock_admin::config::{AppAuthConfig, AppConfig, BigCommerceConfig, BundleConfig};
use bundle_stock_admin::state::AppState;
use jsonwebtoken::{EncodingKey, Header, encode, get_current_timestamp};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Store served by the test app.
pub const STORE_HASH: &str = "abc123";

/// Access token expected on every upstream call.
pub const ACCESS_TOKEN: &str = "bc-test-7Qx9mL2vR8kP4wN6";

/// Client id of the test app (`aud` of signed contexts).
pub const CLIENT_ID: &str = "bundle-stock-test-app";

/// Client secret that signs contexts for the test app.
pub const CLIENT_SECRET: &str = "cs-test-Vq4nR7xK2mB9wL5pT8zY";

/// Category id returned for the bundle category.
pub const BUNDLE_CATEGORY_ID: u64 = 23;

/// Mocked BigCommerce API plus the app router wired to it.
pub struct TestContext {
    pub server: MockServer,
    pub app: Router,
}

/// Response captured from the router.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl TestContext {
    /// Start a mock server and an app with default bundle settings.
    pub async fn new() -> Self {
        Self::with_bundles(BundleConfig::default()).await
    }

    /// Start a mock server and an app with the given bundle settings.
    pub async fn with_bundles(bundles: BundleConfig) -> Self {
        let server = MockServer::start().await;
        let state = AppState::new(app_config(&server.uri(), bundles)).unwrap();
        Self {
            server,
            app: bundle_stock_admin::app(state),
        }
    }

    /// Send a GET request through the router.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri).await
    }

    /// Send a request with an empty body through the router.
    pub async fn request(&self, method: Method, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Number of requests the mock BigCommerce API has received.
    pub async fn upstream_request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }

    /// Serve the bundle category under `name`.
    pub async fn mount_category(&self, name: &str) {
        Mock::given(method("GET"))
            .and(path(catalog_path("categories")))
            .and(query_param("name", name))
            .and(header("X-Auth-Token", ACCESS_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_envelope(
                json!([{ "id": BUNDLE_CATEGORY_ID, "name": name }]),
                1,
                1,
            )))
            .mount(&self.server)
            .await;
    }

    /// Answer the category lookup with no match.
    pub async fn mount_no_category(&self) {
        Mock::given(method("GET"))
            .and(path(catalog_path("categories")))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_envelope(json!([]), 0, 0)))
            .mount(&self.server)
            .await;
    }

    /// Serve one page of category products.
    pub async fn mount_products_page(&self, page: u32, total_pages: u32, products: Value) {
        products_page_mock(page, total_pages, products)
            .mount(&self.server)
            .await;
    }

    /// Serve one page of category products that must be requested exactly once.
    ///
    /// Checked by `MockServer::verify` or when the context is dropped.
    pub async fn expect_products_page(&self, page: u32, total_pages: u32, products: Value) {
        products_page_mock(page, total_pages, products)
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Serve a single product by id.
    pub async fn mount_product(&self, product: Value) {
        let id = product["id"].as_u64().unwrap();
        Mock::given(method("GET"))
            .and(path(catalog_path(&format!("products/{id}"))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": product, "meta": {} })))
            .mount(&self.server)
            .await;
    }

    /// Fail lookups of a single product with the given status.
    pub async fn mount_product_failure(&self, product_id: u64, status: u16) {
        Mock::given(method("GET"))
            .and(path(catalog_path(&format!("products/{product_id}"))))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream failure"))
            .mount(&self.server)
            .await;
    }

    /// Serve a single variant by product and variant id.
    pub async fn mount_variant(&self, variant: Value) {
        let product_id = variant["product_id"].as_u64().unwrap();
        let id = variant["id"].as_u64().unwrap();
        Mock::given(method("GET"))
            .and(path(catalog_path(&format!(
                "products/{product_id}/variants/{id}"
            ))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": variant, "meta": {} })))
            .mount(&self.server)
            .await;
    }

    /// Serve the bundle metafields of a product.
    pub async fn mount_product_metafields(&self, product_id: u64, metafields: Value) {
        self.mount_metafields(&format!("products/{product_id}/metafields"), metafields)
            .await;
    }

    /// Serve the bundle metafields of a variant.
    pub async fn mount_variant_metafields(&self, product_id: u64, variant_id: u64, metafields: Value) {
        self.mount_metafields(
            &format!("products/{product_id}/variants/{variant_id}/metafields"),
            metafields,
        )
        .await;
    }

    async fn mount_metafields(&self, rest: &str, metafields: Value) {
        Mock::given(method("GET"))
            .and(path(catalog_path(rest)))
            .and(query_param("namespace", "bundle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_envelope(metafields, 1, 1)))
            .mount(&self.server)
            .await;
    }

    /// Answer every metafield lookup not mounted explicitly with an empty list.
    pub async fn mount_default_metafields(&self) {
        Mock::given(method("GET"))
            .and(path_regex(r"/metafields$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_envelope(json!([]), 1, 1)))
            .with_priority(10)
            .mount(&self.server)
            .await;
    }
}

fn products_page_mock(page: u32, total_pages: u32, products: Value) -> Mock {
    Mock::given(method("GET"))
        .and(path(catalog_path("products")))
        .and(query_param("categories:in", BUNDLE_CATEGORY_ID.to_string()))
        .and(query_param("include", "variants"))
        .and(query_param("page", page.to_string()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(list_envelope(products, page, total_pages)),
        )
}

/// App configuration pointed at a mock API.
#[must_use]
pub fn app_config(api_url: &str, bundles: BundleConfig) -> AppConfig {
    AppConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        bigcommerce: BigCommerceConfig {
            store_hash: STORE_HASH.to_string(),
            access_token: SecretString::from(ACCESS_TOKEN),
            api_url: Url::parse(api_url).unwrap(),
            timeout: Duration::from_secs(5),
        },
        auth: AppAuthConfig {
            client_id: CLIENT_ID.to_string(),
            client_secret: SecretString::from(CLIENT_SECRET),
        },
        bundles,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Claims of a signed payload for `store_hash`, valid for fifteen minutes.
#[must_use]
pub fn context_claims(store_hash: &str) -> Value {
    let now = get_current_timestamp();
    json!({
        "aud": CLIENT_ID,
        "iss": "bc",
        "iat": now,
        "nbf": now,
        "exp": now + 900,
        "jti": "0b0e0f1a-test",
        "sub": format!("stores/{store_hash}"),
        "user": { "id": 1, "email": "owner@store.test", "locale": "en-US" },
        "owner": { "id": 1, "email": "owner@store.test" },
        "url": "/",
        "channel_id": null
    })
}

/// Sign `claims` as an HS256 token with `secret`.
#[must_use]
pub fn sign_context(claims: &Value, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Valid signed context for the test store.
#[must_use]
pub fn signed_context() -> String {
    sign_context(&context_claims(STORE_HASH), CLIENT_SECRET)
}

/// Path of a catalog endpoint for the test store.
#[must_use]
pub fn catalog_path(rest: &str) -> String {
    format!("/stores/{STORE_HASH}/v3/catalog/{rest}")
}

/// List response envelope with pagination metadata.
#[must_use]
pub fn list_envelope(data: Value, current_page: u32, total_pages: u32) -> Value {
    let count = data.as_array().map_or(0, Vec::len);
    json!({
        "data": data,
        "meta": {
            "pagination": {
                "total": count,
                "count": count,
                "per_page": 50,
                "current_page": current_page,
                "total_pages": total_pages
            }
        }
    })
}

/// Metafields flagging an entity as a bundle, optionally with a component list.
#[must_use]
pub fn bundle_metafields(linked: Option<Value>) -> Value {
    let mut fields = vec![json!({
        "id": 1,
        "namespace": "bundle",
        "key": "is_bundle",
        "value": "true"
    })];
    if let Some(linked) = linked {
        let value = match linked {
            Value::String(raw) => raw,
            other => other.to_string(),
        };
        fields.push(json!({
            "id": 2,
            "namespace": "bundle",
            "key": "linked_product_ids",
            "value": value
        }));
    }
    Value::Array(fields)
}

/// Minimal product payload.
#[must_use]
pub fn product(id: u64, name: &str, sku: &str, inventory: i64, variants: Value) -> Value {
    json!({
        "id": id,
        "name": name,
        "sku": sku,
        "inventory_level": inventory,
        "variants": variants
    })
}

/// Minimal variant payload; `labels` become option values.
#[must_use]
pub fn variant(id: u64, product_id: u64, sku: &str, inventory: i64, labels: &[&str]) -> Value {
    let option_values: Vec<Value> = labels
        .iter()
        .map(|label| json!({ "label": label, "option_display_name": "Option" }))
        .collect();
    json!({
        "id": id,
        "product_id": product_id,
        "sku": sku,
        "inventory_level": inventory,
        "option_values": option_values
    })
}
