use serde_json::json;

use super::*;

#[test]
fn products_url_with_paging() {
    let url = CatalogClient::products_url("https://drinkcann.com/collections/all", Some(250), Some(3))
        .unwrap();
    assert_eq!(url, "https://drinkcann.com/products.json?limit=250&page=3");
}

#[test]
fn products_url_without_paging() {
    let url = CatalogClient::products_url("https://drinkcann.com", None, None).unwrap();
    assert_eq!(url, "https://drinkcann.com/products.json");
}

#[test]
fn products_url_strips_trailing_slash() {
    let url = CatalogClient::products_url("https://drinkcann.com/", Some(50), Some(1)).unwrap();
    assert_eq!(url, "https://drinkcann.com/products.json?limit=50&page=1");
}

#[test]
fn products_url_prefixes_bare_host() {
    let url = CatalogClient::products_url("drinkcann.com", Some(250), Some(1)).unwrap();
    assert_eq!(url, "https://drinkcann.com/products.json?limit=250&page=1");
}

#[test]
fn products_url_drops_existing_query() {
    let url =
        CatalogClient::products_url("https://drinkcann.com/products.json?page=9", Some(10), Some(2))
            .unwrap();
    assert_eq!(url, "https://drinkcann.com/products.json?limit=10&page=2");
}

#[test]
fn products_url_rejects_invalid_origin() {
    for input in ["", "   ", "https://bad host.com", "ftp://drinkcann.com"] {
        let err = CatalogClient::products_url(input, Some(250), Some(1)).unwrap_err();
        assert!(
            matches!(err, ScraperError::InvalidShopUrl { .. }),
            "expected InvalidShopUrl for {input:?}, got: {err:?}"
        );
    }
}

#[test]
fn normalize_store_url_drops_trailing_slashes() {
    assert_eq!(normalize_store_url(" https://drinkcann.com/ "), "https://drinkcann.com");
    assert_eq!(normalize_store_url("https://drinkcann.com//"), "https://drinkcann.com");
    assert_eq!(normalize_store_url("https://drinkcann.com"), "https://drinkcann.com");
    assert_eq!(normalize_store_url("drinkcann.com/"), "drinkcann.com");
}

#[test]
fn store_origin_keeps_http_and_port() {
    let origin = store_origin("http://127.0.0.1:8080/collections/all").unwrap();
    assert_eq!(origin.as_str(), "http://127.0.0.1:8080/");
}

#[test]
fn extract_domain_strips_scheme() {
    assert_eq!(extract_domain("https://drinkcann.com"), "drinkcann.com");
    assert_eq!(extract_domain("http://shop.example.com"), "shop.example.com");
}

#[test]
fn extract_domain_handles_path() {
    assert_eq!(
        extract_domain("https://drinkcann.com/products"),
        "drinkcann.com"
    );
}

#[test]
fn extract_domain_bare_host() {
    assert_eq!(extract_domain("drinkcann.com"), "drinkcann.com");
}

#[test]
fn extract_domain_keeps_non_default_port() {
    assert_eq!(extract_domain("http://localhost:3000/"), "localhost:3000");
}

#[test]
fn products_array_extracts_elements() {
    let products = products_array(json!({ "products": [{ "id": 1 }, { "id": 2 }] }), "u").unwrap();
    assert_eq!(products.len(), 2);
}

#[test]
fn products_array_reports_missing_key_with_present_keys() {
    let err = products_array(json!({ "errors": "Not Found" }), "u").unwrap_err();
    match err {
        ScraperError::InvalidResponse { reason, .. } => {
            assert!(reason.contains("missing `products`"), "reason: {reason}");
            assert!(reason.contains("errors"), "reason: {reason}");
        }
        other => panic!("expected InvalidResponse, got {other:?}"),
    }
}

#[test]
fn products_array_rejects_non_object_body() {
    let err = products_array(json!([1, 2, 3]), "u").unwrap_err();
    assert!(matches!(err, ScraperError::InvalidResponse { .. }));
}

#[test]
fn products_array_rejects_non_array_products() {
    let err = products_array(json!({ "products": { "id": 1 } }), "u").unwrap_err();
    match err {
        ScraperError::InvalidResponse { reason, .. } => assert!(reason.contains("an object")),
        other => panic!("expected InvalidResponse, got {other:?}"),
    }
}

#[test]
fn fetch_options_default_matches_storefront_limits() {
    let options = FetchOptions::default();
    assert_eq!(options.page_size, 250);
    assert_eq!(options.inter_request_delay_ms, 1500);
    assert!(options.max_products.is_none());
}

#[test]
fn fetch_outcome_into_result_surfaces_error() {
    let outcome = FetchOutcome {
        products: vec![json!({ "id": 1 })],
        requests: 2,
        stopped_early: false,
        error: Some(ScraperError::NotFound {
            url: "https://drinkcann.com/products.json".to_owned(),
        }),
    };
    assert!(!outcome.is_complete());
    assert!(matches!(
        outcome.into_result(),
        Err(ScraperError::NotFound { .. })
    ));
}
