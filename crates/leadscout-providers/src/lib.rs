//! Search and enrichment provider interfaces and their HTTP adapters.

mod apollo;
mod brave;
pub mod domain;
mod error;
mod exa;
mod http;
mod traits;

use std::sync::Arc;

use leadscout_core::AppConfig;

pub use apollo::ApolloEnrichmentClient;
pub use brave::BraveSearchClient;
pub use domain::{normalize_domain, path_segments};
pub use error::ProviderError;
pub use exa::ExaSearchClient;
pub use traits::{EnrichmentProvider, NoopEnrichment, SearchProvider};

/// Build every search provider that has credentials configured.
///
/// An empty result is valid; the pipeline then fails discovery with an
/// exhaustion error.
///
/// # Errors
///
/// Returns [`ProviderError`] if a configured client cannot be constructed.
pub fn search_providers_from_config(
    config: &AppConfig,
) -> Result<Vec<Arc<dyn SearchProvider>>, ProviderError> {
    let mut providers: Vec<Arc<dyn SearchProvider>> = Vec::new();

    if let Some(key) = &config.exa_api_key {
        providers.push(Arc::new(ExaSearchClient::new(
            key,
            &config.exa_base_url,
            &config.user_agent,
            config.discovery_timeout_secs,
        )?));
    }
    if let Some(key) = &config.brave_api_key {
        providers.push(Arc::new(BraveSearchClient::new(
            key,
            &config.brave_base_url,
            &config.user_agent,
            config.discovery_timeout_secs,
        )?));
    }

    if providers.is_empty() {
        tracing::warn!("no search provider API keys configured (EXA_API_KEY, BRAVE_API_KEY)");
    }
    Ok(providers)
}

/// Build the enrichment provider, falling back to [`NoopEnrichment`] when no
/// Apollo key is configured.
///
/// # Errors
///
/// Returns [`ProviderError`] if the Apollo client cannot be constructed.
pub fn enrichment_provider_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn EnrichmentProvider>, ProviderError> {
    match &config.apollo_api_key {
        Some(key) => Ok(Arc::new(ApolloEnrichmentClient::new(
            key,
            &config.apollo_base_url,
            &config.user_agent,
            config.enrich_timeout_secs,
        )?)),
        None => {
            tracing::info!("APOLLO_API_KEY not set; enrichment disabled");
            Ok(Arc::new(NoopEnrichment))
        }
    }
}
