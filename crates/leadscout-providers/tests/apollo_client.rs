//! Integration tests for `ApolloEnrichmentClient` using wiremock HTTP mocks.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadscout_providers::{ApolloEnrichmentClient, EnrichmentProvider, ProviderError};

const BUDGET: Duration = Duration::from_secs(5);

fn test_client(base_url: &str) -> ApolloEnrichmentClient {
    ApolloEnrichmentClient::new("apollo-test-key", base_url, "leadscout-test/0.1", 5)
        .expect("client construction should not fail")
}

fn titles() -> Vec<String> {
    vec!["VP Sales".to_string()]
}

async fn mount_organization(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/enrich"))
        .and(query_param("domain", "acme.io"))
        .and(header("X-Api-Key", "apollo-test-key"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "organization": {
                "name": "Acme",
                "estimated_num_employees": 220,
                "industry": "computer software",
                "annual_revenue_printed": "25M",
                "city": "Austin",
                "state": "Texas",
                "country": "United States",
                "short_description": "Acme builds revenue tooling."
            }
        })))
        .mount(server)
        .await;
}

async fn mount_people(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/api/v1/mixed_people/search"))
        .and(body_partial_json(json!({
            "q_organization_domains_list": ["acme.io"],
            "person_titles": ["VP Sales"]
        })))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "people": [
                {
                    "name": "Dana Reyes",
                    "title": "VP Sales",
                    "email": "dana@acme.io",
                    "linkedin_url": "https://linkedin.com/in/danareyes"
                }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn enrich_combines_organization_and_people() {
    let server = MockServer::start().await;
    mount_organization(&server, 200).await;
    mount_people(&server, 200).await;

    let enrichment = test_client(&server.uri())
        .enrich("Acme", "acme.io", BUDGET, &titles())
        .await
        .expect("enrichment should succeed");

    assert_eq!(enrichment.facts.employee_count, Some(220));
    assert_eq!(enrichment.facts.industry.as_deref(), Some("computer software"));
    assert_eq!(
        enrichment.facts.headquarters.as_deref(),
        Some("Austin, Texas, United States")
    );
    assert_eq!(enrichment.contacts.len(), 1);
    assert_eq!(enrichment.contacts[0].email.as_deref(), Some("dana@acme.io"));
}

#[tokio::test]
async fn enrich_keeps_facts_when_people_search_fails() {
    let server = MockServer::start().await;
    mount_organization(&server, 200).await;
    mount_people(&server, 500).await;

    let enrichment = test_client(&server.uri())
        .enrich("Acme", "acme.io", BUDGET, &titles())
        .await
        .expect("partial enrichment should succeed");

    assert_eq!(enrichment.facts.employee_count, Some(220));
    assert!(enrichment.contacts.is_empty());
}

#[tokio::test]
async fn enrich_keeps_contacts_when_organization_lookup_fails() {
    let server = MockServer::start().await;
    mount_organization(&server, 404).await;
    mount_people(&server, 200).await;

    let enrichment = test_client(&server.uri())
        .enrich("Acme", "acme.io", BUDGET, &titles())
        .await
        .expect("partial enrichment should succeed");

    assert!(enrichment.facts.employee_count.is_none());
    assert_eq!(enrichment.contacts.len(), 1);
}

#[tokio::test]
async fn enrich_fails_when_both_lookups_fail() {
    let server = MockServer::start().await;
    mount_organization(&server, 403).await;
    mount_people(&server, 403).await;

    let result = test_client(&server.uri())
        .enrich("Acme", "acme.io", BUDGET, &titles())
        .await;

    assert!(
        matches!(result, Err(ProviderError::Unauthorized { provider: "apollo" })),
        "expected Unauthorized, got: {result:?}"
    );
}

#[tokio::test]
async fn enrich_respects_request_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/enrich"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"organization": null}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/mixed_people/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"people": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let result = test_client(&server.uri())
        .enrich("Acme", "acme.io", Duration::from_millis(100), &titles())
        .await;

    assert!(matches!(result, Err(ProviderError::Http(_))));
}
