//! Brave web search adapter (`GET /res/v1/web/search`).

use async_trait::async_trait;
use leadscout_core::SearchHit;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::http::{
    build_client, check_status, normalize_base_url, parse_timestamp, read_json, strip_tags,
};
use crate::traits::SearchProvider;

const PROVIDER: &str = "brave";
/// Brave caps `count` at 20 per request.
const MAX_COUNT: usize = 20;

pub struct BraveSearchClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Debug, Deserialize)]
struct WebResult {
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    page_age: Option<String>,
}

impl BraveSearchClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        api_key: &str,
        base_url: &str,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(user_agent, timeout_secs)?,
            api_key: api_key.to_owned(),
            base_url: normalize_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl SearchProvider for BraveSearchClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
        let count = limit.clamp(1, MAX_COUNT).to_string();
        let response = self
            .client
            .get(format!("{}/res/v1/web/search", self.base_url))
            .header("X-Subscription-Token", &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await?;
        let response = check_status(PROVIDER, response)?;
        let parsed: SearchResponse =
            read_json(response, &format!("brave search({query})")).await?;

        let hits: Vec<SearchHit> = parsed
            .web
            .map(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .map(|r| SearchHit {
                url: r.url,
                title: strip_tags(&r.title),
                text: r.description.as_deref().map(strip_tags).unwrap_or_default(),
                published_at: r.page_age.as_deref().and_then(parse_timestamp),
            })
            .collect();

        tracing::debug!(provider = PROVIDER, query, count = hits.len(), "search complete");
        Ok(hits)
    }
}
