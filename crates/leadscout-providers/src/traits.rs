use std::time::Duration;

use async_trait::async_trait;
use leadscout_core::{Enrichment, SearchHit};

use crate::error::ProviderError;

/// A web search backend used for candidate discovery.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short stable name used in logs.
    fn name(&self) -> &'static str;

    /// Run one query, returning at most `limit` hits.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError>;
}

/// A best-effort source of company facts and contacts.
///
/// Implementations should honour `budget` per outbound request; callers also
/// enforce it with an outer timeout and treat any failure as "no enrichment".
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn enrich(
        &self,
        company_name: &str,
        domain: &str,
        budget: Duration,
        target_titles: &[String],
    ) -> Result<Enrichment, ProviderError>;
}

/// Enrichment provider used when no enrichment credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnrichment;

#[async_trait]
impl EnrichmentProvider for NoopEnrichment {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn enrich(
        &self,
        _company_name: &str,
        _domain: &str,
        _budget: Duration,
        _target_titles: &[String],
    ) -> Result<Enrichment, ProviderError> {
        Ok(Enrichment::default())
    }
}
