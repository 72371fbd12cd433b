//! One discovery job end to end: discover, filter, enrich in batches, match,
//! decay, score, rank, persist.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use leadscout_core::{Candidate, DetectedSignal, JobError, ScoredLead, SignalCatalog, TargetProfile};
use leadscout_db::JobStore;
use leadscout_providers::{EnrichmentProvider, SearchProvider};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::decay::apply_time_decay;
use crate::discovery::{build_queries, discover};
use crate::error::PipelineError;
use crate::filter::Deduplicator;
use crate::matcher::SignalMatcher;
use crate::scoring::rank;

/// Runs discovery jobs against a fixed set of providers and a job store.
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<dyn JobStore>,
    search: Vec<Arc<dyn SearchProvider>>,
    enrichment: Arc<dyn EnrichmentProvider>,
    catalog: Option<Arc<SignalCatalog>>,
    deduplicator: Deduplicator,
    config: PipelineConfig,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        store: Arc<dyn JobStore>,
        search: Vec<Arc<dyn SearchProvider>>,
        enrichment: Arc<dyn EnrichmentProvider>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            search,
            enrichment,
            catalog: None,
            deduplicator: Deduplicator::default(),
            config,
        }
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: Option<Arc<SignalCatalog>>) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub fn with_deduplicator(mut self, deduplicator: Deduplicator) -> Self {
        self.deduplicator = deduplicator;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> Option<&SignalCatalog> {
        self.catalog.as_deref()
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Drive a `queued` job to `completed` or `failed`.
    ///
    /// Never returns an error: every failure is recorded on the job itself.
    /// If the job cannot be moved to `running` (unknown, or already picked
    /// up) nothing else happens.
    pub async fn run(&self, job_id: Uuid, profile: &TargetProfile) {
        if let Err(error) = self.store.mark_running(job_id, "Starting discovery").await {
            tracing::error!(job_id = %job_id, error = %error, "could not start job");
            return;
        }
        tracing::info!(job_id = %job_id, "job started");

        match self.execute(job_id, profile).await {
            Ok(leads) => {
                let message = format!("Found {} qualified leads", leads.len());
                if let Err(error) = self.store.complete(job_id, &leads, &message).await {
                    let failure = PipelineError::from(error);
                    self.fail_job_best_effort(job_id, &failure).await;
                    return;
                }
                tracing::info!(job_id = %job_id, leads = leads.len(), "job completed");
            }
            Err(failure) => self.fail_job_best_effort(job_id, &failure).await,
        }
    }

    async fn execute(
        &self,
        job_id: Uuid,
        profile: &TargetProfile,
    ) -> Result<Vec<ScoredLead>, PipelineError> {
        self.check_cancel(job_id).await?;

        let band = profile.company_size.ok_or_else(|| {
            PipelineError::Internal("profile has no company size band".to_string())
        })?;
        if profile.industries().next().is_none() {
            return Err(PipelineError::Internal(
                "profile has no industries".to_string(),
            ));
        }

        let matcher = SignalMatcher::new(self.catalog.as_deref(), profile);
        let queries = build_queries(profile);
        self.progress(
            job_id,
            &format!(
                "Searching {} providers with {} queries",
                self.search.len(),
                queries.len()
            ),
        )
        .await;

        let hits = discover(
            &self.search,
            &queries,
            self.config.results_per_query,
            self.config.discovery_timeout,
        )
        .await?;
        let hit_count = hits.len();
        let candidates = self.deduplicator.candidates(hits);
        let total = candidates.len();
        tracing::info!(job_id = %job_id, hits = hit_count, candidates = total, "candidates filtered");

        let run_at = Utc::now();
        let target_titles: Vec<String> = profile.job_titles().map(str::to_string).collect();
        let batch_size = self.config.enrich_batch_size.max(1);
        let cap = self.config.result_cap;

        let mut evaluated: Vec<(Candidate, Vec<DetectedSignal>)> = Vec::with_capacity(total);
        let mut qualifying = 0_usize;
        let mut processed = 0_usize;
        let mut pending = candidates.into_iter();

        while qualifying < cap {
            let batch: Vec<Candidate> = pending.by_ref().take(batch_size).collect();
            if batch.is_empty() {
                break;
            }
            self.check_cancel(job_id).await?;
            processed += batch.len();

            let enriched = join_all(
                batch
                    .into_iter()
                    .map(|candidate| self.enrich(candidate, &target_titles)),
            )
            .await;

            for candidate in enriched {
                if let Some(count) = candidate.enrichment.facts.employee_count {
                    if !band.admits(count) {
                        tracing::debug!(
                            job_id = %job_id,
                            domain = %candidate.domain,
                            employee_count = count,
                            "dropping candidate outside size band"
                        );
                        continue;
                    }
                }

                let signals = apply_time_decay(
                    matcher.detect(&candidate, run_at),
                    run_at,
                    self.config.decay_half_life_days,
                    self.config.min_signal_confidence,
                );
                if !signals.is_empty() {
                    qualifying += 1;
                }
                evaluated.push((candidate, signals));
            }

            self.progress(
                job_id,
                &format!("Enriched {processed} of {total} candidates ({qualifying} qualifying)"),
            )
            .await;
        }

        if processed < total {
            tracing::info!(
                job_id = %job_id,
                skipped = total - processed,
                "result cap reached; remaining candidates not enriched"
            );
        }

        self.progress(job_id, "Scoring leads").await;
        Ok(rank(evaluated, cap))
    }

    /// Enrich one candidate within the per-candidate budget. Any failure
    /// leaves the enrichment empty.
    async fn enrich(&self, mut candidate: Candidate, target_titles: &[String]) -> Candidate {
        let budget = self.config.enrich_timeout;
        let outcome = tokio::time::timeout(
            budget,
            self.enrichment
                .enrich(&candidate.name, &candidate.domain, budget, target_titles),
        )
        .await;

        match outcome {
            Ok(Ok(enrichment)) => candidate.enrichment = enrichment,
            Ok(Err(error)) => tracing::warn!(
                provider = self.enrichment.name(),
                domain = %candidate.domain,
                error = %error,
                "enrichment failed"
            ),
            Err(_) => tracing::warn!(
                provider = self.enrichment.name(),
                domain = %candidate.domain,
                budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                "enrichment timed out"
            ),
        }
        candidate
    }

    async fn check_cancel(&self, job_id: Uuid) -> Result<(), PipelineError> {
        if self.store.is_cancel_requested(job_id).await? {
            tracing::info!(job_id = %job_id, "cancellation observed");
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }

    async fn progress(&self, job_id: Uuid, message: &str) {
        tracing::info!(job_id = %job_id, status = message, "job progress");
        if let Err(error) = self.store.update_progress(job_id, message).await {
            tracing::warn!(job_id = %job_id, error = %error, "failed to record job progress");
        }
    }

    async fn fail_job_best_effort(&self, job_id: Uuid, failure: &PipelineError) {
        tracing::error!(
            job_id = %job_id,
            kind = failure.kind().as_str(),
            error = %failure,
            "job failed"
        );
        let error = JobError {
            kind: failure.kind(),
            message: failure.to_string(),
        };
        if let Err(store_error) = self.store.fail(job_id, &error).await {
            tracing::error!(
                job_id = %job_id,
                error = %store_error,
                "failed to record job failure"
            );
        }
    }
}
