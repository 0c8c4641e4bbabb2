//! End-to-end tests of the bundle stock API and page against a mocked
//! BigCommerce catalog.

use axum::http::{Method, StatusCode, header};
use bundle_stock_admin::config::BundleConfig;
use bundle_stock_integration_tests::{
    CLIENT_SECRET, STORE_HASH, TestContext, bundle_metafields, context_claims, product,
    sign_context, signed_context, variant,
};
use serde_json::json;

fn stock_uri() -> String {
    format!("/api/bundles/stock?context={}", signed_context())
}

fn page_uri(search: &str) -> String {
    format!("/bundles?context={}{search}", signed_context())
}

/// P1 (id 10) links product 20 x2 and variant 5 of product 21 x1.
async fn mount_example(ctx: &TestContext) {
    ctx.mount_category("Bundle").await;
    ctx.mount_products_page(
        1,
        1,
        json!([product(10, "P1", "BDL-1", 5, json!([variant(100, 10, "BDL-1", 5, &[])]))]),
    )
    .await;
    ctx.mount_product_metafields(
        10,
        bundle_metafields(Some(json!([
            { "productId": 20, "quantity": 2 },
            { "productId": 21, "variantId": 5, "quantity": 1 }
        ]))),
    )
    .await;
    ctx.mount_default_metafields().await;
    ctx.mount_product(product(20, "Shaker", "SHK-1", 10, json!([]))).await;
    ctx.mount_product(product(21, "Tee", "TEE", 40, json!([]))).await;
    ctx.mount_variant(variant(5, 21, "TEE-RED", 3, &["Red"])).await;
}

// =============================================================================
// Stock API
// =============================================================================

#[tokio::test]
async fn test_stock_reports_example_bundle() {
    let ctx = TestContext::new().await;
    mount_example(&ctx).await;

    let response = ctx.get(&stock_uri()).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({
            "bundles": [{
                "id": 10,
                "name": "P1",
                "sku": "BDL-1",
                "stock": 5,
                "components": [
                    {
                        "productId": 20,
                        "name": "Shaker",
                        "sku": "SHK-1",
                        "quantity": 2,
                        "stock": 10,
                        "maxBundles": 5
                    },
                    {
                        "productId": 21,
                        "variantId": 5,
                        "name": "Tee - Red",
                        "sku": "TEE-RED",
                        "quantity": 1,
                        "stock": 3,
                        "maxBundles": 3
                    }
                ]
            }]
        })
    );
}

#[tokio::test]
async fn test_stock_with_sequential_component_lookups() {
    let ctx = TestContext::with_bundles(BundleConfig {
        component_concurrency: 1,
        ..BundleConfig::default()
    })
    .await;
    mount_example(&ctx).await;

    let body = ctx.get(&stock_uri()).await.json();
    let names: Vec<&str> = body["bundles"][0]["components"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Shaker", "Tee - Red"]);
}

#[tokio::test]
async fn test_stock_requests_every_page_exactly_once() {
    let ctx = TestContext::new().await;
    ctx.mount_category("Bundle").await;
    ctx.expect_products_page(1, 3, json!([product(1, "A", "A", 1, json!([]))]))
        .await;
    ctx.expect_products_page(2, 3, json!([product(2, "B", "B", 1, json!([]))]))
        .await;
    ctx.expect_products_page(3, 3, json!([product(3, "C", "C", 1, json!([]))]))
        .await;
    ctx.mount_default_metafields().await;

    let response = ctx.get(&stock_uri()).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "bundles": [] }));
    ctx.server.verify().await;
}

#[tokio::test]
async fn test_failed_component_becomes_placeholder() {
    let ctx = TestContext::new().await;
    ctx.mount_category("Bundle").await;
    ctx.mount_products_page(1, 1, json!([product(10, "P1", "BDL-1", 5, json!([]))]))
        .await;
    ctx.mount_product_metafields(
        10,
        bundle_metafields(Some(json!([
            { "productId": 20, "quantity": 2 },
            { "productId": 22, "quantity": 1 }
        ]))),
    )
    .await;
    ctx.mount_default_metafields().await;
    ctx.mount_product(product(20, "Shaker", "SHK-1", 10, json!([]))).await;
    ctx.mount_product_failure(22, 500).await;

    let response = ctx.get(&stock_uri()).await;

    assert_eq!(response.status, StatusCode::OK);
    let components = response.json()["bundles"][0]["components"].clone();
    assert_eq!(components[0]["maxBundles"], 5);
    assert_eq!(
        components[1],
        json!({
            "productId": 22,
            "name": "Unknown Component",
            "sku": "N/A",
            "quantity": 1,
            "stock": 0,
            "maxBundles": 0
        })
    );
}

#[tokio::test]
async fn test_flag_without_component_list_is_skipped() {
    let ctx = TestContext::new().await;
    ctx.mount_category("Bundle").await;
    ctx.mount_products_page(1, 1, json!([product(10, "P1", "BDL-1", 5, json!([]))]))
        .await;
    ctx.mount_product_metafields(10, bundle_metafields(None)).await;

    let response = ctx.get(&stock_uri()).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "bundles": [] }));
}

#[tokio::test]
async fn test_variant_bundle_uses_variant_name_and_stock() {
    let ctx = TestContext::new().await;
    ctx.mount_category("Bundle").await;
    ctx.mount_products_page(
        1,
        1,
        json!([product(
            30,
            "Gift Box",
            "GFT",
            9,
            json!([variant(301, 30, "GFT-L", 4, &["Large", "Blue"])])
        )]),
    )
    .await;
    ctx.mount_variant_metafields(
        30,
        301,
        bundle_metafields(Some(json!("[{\"product_id\": \"20\", \"quantity\": \"3\"}]"))),
    )
    .await;
    ctx.mount_default_metafields().await;
    ctx.mount_product(product(20, "Shaker", "SHK-1", 10, json!([]))).await;

    let body = ctx.get(&stock_uri()).await.json();

    let bundle = &body["bundles"][0];
    assert_eq!(bundle["id"], 301);
    assert_eq!(bundle["name"], "Gift Box - Large - Blue");
    assert_eq!(bundle["sku"], "GFT-L");
    assert_eq!(bundle["stock"], 4);
    assert_eq!(bundle["components"][0]["maxBundles"], 3);
}

#[tokio::test]
async fn test_missing_category_returns_empty_list() {
    let ctx = TestContext::new().await;
    ctx.mount_no_category().await;

    let response = ctx.get(&stock_uri()).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "bundles": [] }));
    assert_eq!(ctx.upstream_request_count().await, 1);
}

#[tokio::test]
async fn test_configured_category_name_is_used() {
    let ctx = TestContext::with_bundles(BundleConfig {
        category: "Gift Sets & Kits".to_string(),
        ..BundleConfig::default()
    })
    .await;
    ctx.mount_category("Gift Sets & Kits").await;
    ctx.mount_products_page(1, 1, json!([])).await;

    let response = ctx.get(&stock_uri()).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "bundles": [] }));
}

#[tokio::test]
async fn test_invalid_component_list_fails_request() {
    let ctx = TestContext::new().await;
    ctx.mount_category("Bundle").await;
    ctx.mount_products_page(1, 1, json!([product(10, "P1", "BDL-1", 5, json!([]))]))
        .await;
    ctx.mount_product_metafields(10, bundle_metafields(Some(json!("[{\"productId\": 20,"))))
        .await;

    let response = ctx.get(&stock_uri()).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json(), json!({ "message": "Internal server error" }));
}

#[tokio::test]
async fn test_upstream_page_failure_fails_request() {
    let ctx = TestContext::new().await;
    ctx.mount_category("Bundle").await;
    // No products page mounted: the mock answers 404.

    let response = ctx.get(&stock_uri()).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["message"], "Internal server error");
}

// =============================================================================
// Session and method checks
// =============================================================================

#[tokio::test]
async fn test_missing_context_is_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/api/bundles/stock").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.json()["message"].is_string());
    assert_eq!(ctx.upstream_request_count().await, 0);
}

#[tokio::test]
async fn test_unsigned_store_hash_is_unauthorized() {
    let ctx = TestContext::new().await;
    mount_example(&ctx).await;

    for context in [STORE_HASH.to_string(), format!("stores%2F{STORE_HASH}")] {
        let response = ctx.get(&format!("/api/bundles/stock?context={context}")).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{context}");
        assert_eq!(response.json(), json!({ "message": "Invalid store context" }));
    }
    assert_eq!(ctx.upstream_request_count().await, 0);
}

#[tokio::test]
async fn test_tampered_context_is_unauthorized() {
    let ctx = TestContext::new().await;
    mount_example(&ctx).await;

    // Signature of a genuine token for another store over a rewritten payload.
    let genuine = sign_context(&context_claims("someone-else"), CLIENT_SECRET);
    let rewritten = sign_context(&context_claims(STORE_HASH), "not-the-client-secret");
    let (_, signature) = genuine.rsplit_once('.').unwrap();
    let (signed_part, _) = rewritten.rsplit_once('.').unwrap();

    for context in [format!("{signed_part}.{signature}"), rewritten] {
        let response = ctx.get(&format!("/api/bundles/stock?context={context}")).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
    assert_eq!(ctx.upstream_request_count().await, 0);
}

#[tokio::test]
async fn test_context_for_other_store_is_unauthorized() {
    let ctx = TestContext::new().await;

    let context = sign_context(&context_claims("someone-else"), CLIENT_SECRET);
    let response = ctx.get(&format!("/api/bundles/stock?context={context}")).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.upstream_request_count().await, 0);
}

#[tokio::test]
async fn test_expired_or_foreign_app_context_is_unauthorized() {
    let ctx = TestContext::new().await;

    let mut expired = context_claims(STORE_HASH);
    expired["exp"] = json!(expired["iat"].as_u64().unwrap() - 3600);
    expired["nbf"] = json!(expired["iat"].as_u64().unwrap() - 7200);
    let mut other_app = context_claims(STORE_HASH);
    other_app["aud"] = json!("another-app");

    for claims in [expired, other_app] {
        let context = sign_context(&claims, CLIENT_SECRET);
        let response = ctx.get(&format!("/api/bundles/stock?context={context}")).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
    assert_eq!(ctx.upstream_request_count().await, 0);
}

#[tokio::test]
async fn test_non_get_methods_are_rejected() {
    let ctx = TestContext::new().await;

    for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
        let response = ctx.request(method.clone(), &stock_uri()).await;

        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(response.headers.get(header::ALLOW).unwrap(), "GET");
        assert_eq!(response.json(), json!({ "message": "Method not allowed" }));
    }
    assert_eq!(ctx.upstream_request_count().await, 0);
}

// =============================================================================
// Page and health
// =============================================================================

#[tokio::test]
async fn test_page_lists_bundles_with_limiting_component() {
    let ctx = TestContext::new().await;
    mount_example(&ctx).await;

    let response = ctx.get(&page_uri("")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );
    let html = response.text();
    assert!(html.contains("P1"));
    assert!(html.contains("Buildable: 3"));
    assert!(html.contains("class=\"limiting\""));
}

#[tokio::test]
async fn test_page_search_filters_by_name_or_sku() {
    let ctx = TestContext::new().await;
    mount_example(&ctx).await;

    let html = ctx
        .get(&page_uri("&q=shaker"))
        .await
        .text();
    // Component names are not searched.
    assert!(html.contains("No bundles match"));

    let html = ctx
        .get(&page_uri("&q=bdl"))
        .await
        .text();
    assert!(html.contains("Showing 1 of 1 bundles"));
}

#[tokio::test]
async fn test_page_requires_signed_context() {
    let ctx = TestContext::new().await;

    for uri in ["/bundles", "/bundles?context=abc123", "/bundles?context=stores%2Fabc123"] {
        let response = ctx.get(uri).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
    }
    assert_eq!(ctx.upstream_request_count().await, 0);
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "ok");
}
