//! Exa neural search adapter (`POST /search`).

use async_trait::async_trait;
use leadscout_core::SearchHit;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::http::{build_client, check_status, normalize_base_url, parse_timestamp, read_json};
use crate::traits::SearchProvider;

const PROVIDER: &str = "exa";
const MAX_TEXT_CHARACTERS: usize = 1_000;

pub struct ExaSearchClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    num_results: usize,
    #[serde(rename = "type")]
    search_type: &'static str,
    contents: Contents,
}

#[derive(Debug, Serialize)]
struct Contents {
    text: TextOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextOptions {
    max_characters: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExaResult {
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    published_date: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl ExaSearchClient {
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
impl SearchProvider for ExaSearchClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
        let request = SearchRequest {
            query,
            num_results: limit,
            search_type: "auto",
            contents: Contents {
                text: TextOptions {
                    max_characters: MAX_TEXT_CHARACTERS,
                },
            },
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = check_status(PROVIDER, response)?;
        let parsed: SearchResponse = read_json(response, &format!("exa search({query})")).await?;

        let hits: Vec<SearchHit> = parsed
            .results
            .into_iter()
            .take(limit)
            .map(|r| SearchHit {
                url: r.url,
                title: r.title.unwrap_or_default(),
                text: r.text.unwrap_or_default(),
                published_at: r.published_date.as_deref().and_then(parse_timestamp),
            })
            .collect();

        tracing::debug!(provider = PROVIDER, query, count = hits.len(), "search complete");
        Ok(hits)
    }
}
