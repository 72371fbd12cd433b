use std::time::Duration;

use leadscout_core::AppConfig;

/// Tunables for one orchestrator instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Outer timeout applied to each (query, provider) discovery call.
    pub discovery_timeout: Duration,
    /// Per-candidate enrichment budget.
    pub enrich_timeout: Duration,
    pub enrich_batch_size: usize,
    /// Maximum number of ranked leads; also stops further enrichment batches.
    pub result_cap: usize,
    pub results_per_query: usize,
    pub retention: chrono::Duration,
    /// Half-life applied to dated evidence.
    pub decay_half_life_days: f64,
    /// Decayed signals below this confidence are discarded as stale.
    pub min_signal_confidence: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            discovery_timeout: Duration::from_secs(40),
            enrich_timeout: Duration::from_secs(8),
            enrich_batch_size: 5,
            result_cap: 25,
            results_per_query: 20,
            retention: chrono::Duration::hours(24),
            decay_half_life_days: 90.0,
            min_signal_confidence: 20.0,
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            discovery_timeout: Duration::from_secs(config.discovery_timeout_secs),
            enrich_timeout: Duration::from_secs(config.enrich_timeout_secs),
            enrich_batch_size: config.enrich_batch_size.max(1),
            result_cap: config.result_cap.max(1),
            results_per_query: config.results_per_query.max(1),
            retention: i64::try_from(config.job_retention_hours)
                .ok()
                .and_then(chrono::Duration::try_hours)
                .unwrap_or(chrono::Duration::MAX),
            ..Self::default()
        }
    }
}
