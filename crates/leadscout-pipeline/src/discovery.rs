//! Query construction and concurrent fan-out across search providers.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use leadscout_core::{SearchHit, TargetProfile};
use leadscout_providers::SearchProvider;

use crate::error::PipelineError;

/// One to three distinct queries for a profile, most specific first.
#[must_use]
pub fn build_queries(profile: &TargetProfile) -> Vec<String> {
    let industries: Vec<&str> = profile.industries().collect();
    let Some(first_industry) = industries.first().copied() else {
        return Vec::new();
    };

    let mut candidates = Vec::with_capacity(3);

    let mut primary = vec![first_industry];
    if let Some(band) = &profile.company_size {
        primary.push(band.search_term());
    }
    primary.push("companies");
    if let Some(geography) = profile.geography() {
        primary.push(geography);
    }
    candidates.push(primary.join(" "));

    if let Some(pain_point) = profile.pain_points().next() {
        candidates.push(format!("{first_industry} {pain_point}"));
    }

    if let Some(second_industry) = industries.get(1) {
        candidates.push(format!("{second_industry} companies"));
    } else if let Some(title) = profile.job_titles().next() {
        candidates.push(format!("{first_industry} companies hiring {title}"));
    }

    let mut queries: Vec<String> = Vec::with_capacity(candidates.len());
    for query in candidates {
        if !queries.iter().any(|q| q.eq_ignore_ascii_case(&query)) {
            queries.push(query);
        }
    }
    queries
}

/// Runs every `(query, provider)` pair concurrently, each under `timeout`.
///
/// Failed or timed-out calls are logged and skipped. Hits are returned in
/// query order, then provider order.
///
/// # Errors
///
/// Returns [`PipelineError::Exhausted`] when no call succeeded, including when
/// there was nothing to call.
pub async fn discover(
    providers: &[Arc<dyn SearchProvider>],
    queries: &[String],
    limit: usize,
    timeout: Duration,
) -> Result<Vec<SearchHit>, PipelineError> {
    let calls = queries.iter().flat_map(move |query| {
        providers.iter().map(move |provider| async move {
            let outcome = tokio::time::timeout(timeout, provider.search(query, limit)).await;
            match outcome {
                Ok(Ok(hits)) => {
                    tracing::debug!(
                        provider = provider.name(),
                        query = %query,
                        hits = hits.len(),
                        "search call succeeded"
                    );
                    Some(hits)
                }
                Ok(Err(error)) => {
                    tracing::warn!(
                        provider = provider.name(),
                        query = %query,
                        error = %error,
                        "search call failed"
                    );
                    None
                }
                Err(_) => {
                    tracing::warn!(
                        provider = provider.name(),
                        query = %query,
                        timeout_secs = timeout.as_secs(),
                        "search call timed out"
                    );
                    None
                }
            }
        })
    });

    let outcomes = join_all(calls).await;
    let attempted = outcomes.len();
    let succeeded: Vec<Vec<SearchHit>> = outcomes.into_iter().flatten().collect();

    if succeeded.is_empty() {
        return Err(PipelineError::Exhausted { attempted });
    }

    tracing::info!(
        attempted,
        succeeded = succeeded.len(),
        "discovery finished"
    );
    Ok(succeeded.into_iter().flatten().collect())
}
