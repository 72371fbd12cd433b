//! Integration tests for the Exa and Brave search adapters.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadscout_providers::{BraveSearchClient, ExaSearchClient, ProviderError, SearchProvider};

fn exa_client(base_url: &str) -> ExaSearchClient {
    ExaSearchClient::new("exa-test-key", base_url, "leadscout-test/0.1", 5)
        .expect("failed to build test ExaSearchClient")
}

fn brave_client(base_url: &str) -> BraveSearchClient {
    BraveSearchClient::new("brave-test-key", base_url, "leadscout-test/0.1", 5)
        .expect("failed to build test BraveSearchClient")
}

// ---------------------------------------------------------------------------
// Exa
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exa_search_maps_results_to_hits() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("x-api-key", "exa-test-key"))
        .and(body_partial_json(json!({"query": "SaaS mid-size", "numResults": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "url": "https://acme.io/news/series-b",
                    "title": "Acme raises Series B",
                    "publishedDate": "2026-09-01T00:00:00.000Z",
                    "text": "Acme raised $40M to expand its sales team."
                },
                {
                    "url": "https://globex.com",
                    "title": null
                }
            ]
        })))
        .mount(&server)
        .await;

    let hits = exa_client(&server.uri())
        .search("SaaS mid-size", 2)
        .await
        .expect("search should succeed");

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].url, "https://acme.io/news/series-b");
    assert_eq!(hits[0].title, "Acme raises Series B");
    assert!(hits[0].published_at.is_some());
    assert_eq!(hits[1].title, "");
    assert!(hits[1].published_at.is_none());
}

#[tokio::test]
async fn exa_search_truncates_to_limit() {
    let server = MockServer::start().await;
    let results: Vec<_> = (0..5)
        .map(|i| json!({"url": format!("https://c{i}.com"), "title": "t"}))
        .collect();

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": results})))
        .mount(&server)
        .await;

    let hits = exa_client(&server.uri()).search("q", 3).await.unwrap();
    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn exa_search_maps_401_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = exa_client(&server.uri()).search("q", 10).await;
    assert!(
        matches!(result, Err(ProviderError::Unauthorized { provider: "exa" })),
        "expected Unauthorized, got: {result:?}"
    );
}

#[tokio::test]
async fn exa_search_reports_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = exa_client(&server.uri()).search("q", 10).await;
    assert!(matches!(result, Err(ProviderError::Deserialize { .. })));
}

// ---------------------------------------------------------------------------
// Brave
// ---------------------------------------------------------------------------

#[tokio::test]
async fn brave_search_sends_token_and_strips_markup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .and(header("X-Subscription-Token", "brave-test-key"))
        .and(query_param("q", "fintech hiring"))
        .and(query_param("count", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "web": {
                "results": [{
                    "url": "https://initech.com/blog",
                    "title": "Initech <strong>expands</strong>",
                    "description": "Initech is <strong>hiring</strong> account executives",
                    "page_age": "2026-08-15T10:00:00"
                }]
            }
        })))
        .mount(&server)
        .await;

    let hits = brave_client(&server.uri())
        .search("fintech hiring", 10)
        .await
        .expect("search should succeed");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Initech expands");
    assert_eq!(hits[0].text, "Initech is hiring account executives");
    assert!(hits[0].published_at.is_some());
}

#[tokio::test]
async fn brave_search_without_web_section_returns_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "search"})))
        .mount(&server)
        .await;

    let hits = brave_client(&server.uri()).search("q", 5).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn brave_search_maps_429_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let result = brave_client(&server.uri()).search("q", 5).await;
    assert!(
        matches!(
            result,
            Err(ProviderError::RateLimited {
                provider: "brave",
                retry_after_secs: 7
            })
        ),
        "expected RateLimited, got: {result:?}"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = BraveSearchClient::new("k", "::not a url::", "ua", 5);
    assert!(matches!(result, Err(ProviderError::InvalidBaseUrl { .. })));
}
