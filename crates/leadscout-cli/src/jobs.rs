//! Job store maintenance and inspection commands. All of these require
//! `DATABASE_URL`; the in-memory store does not outlive a single process.

use std::sync::Arc;

use leadscout_core::AppConfig;
use leadscout_db::{JobStore, MemoryJobStore, PgJobStore};
use leadscout_pipeline::{JobManager, Orchestrator, PipelineConfig};
use leadscout_providers::NoopEnrichment;
use uuid::Uuid;

/// Postgres store when `DATABASE_URL` is set (migrations applied), otherwise
/// an in-memory store.
pub(crate) async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn JobStore>> {
    if config.database_url.is_none() {
        tracing::info!("DATABASE_URL not set; using in-memory job store");
        return Ok(Arc::new(MemoryJobStore::new()));
    }
    let pool = leadscout_db::connect_pool_from_config(config).await?;
    leadscout_db::run_migrations(&pool).await?;
    Ok(Arc::new(PgJobStore::new(pool)))
}

async fn persistent_manager(config: &AppConfig) -> anyhow::Result<JobManager> {
    let pool = leadscout_db::connect_pool_from_config(config).await?;
    let orchestrator = Orchestrator::new(
        Arc::new(PgJobStore::new(pool)),
        Vec::new(),
        Arc::new(NoopEnrichment),
        PipelineConfig::from_app_config(config),
    );
    Ok(JobManager::new(orchestrator))
}

/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or a migration fails.
pub(crate) async fn run_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = leadscout_db::connect_pool_from_config(config).await?;
    let applied = leadscout_db::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or the delete fails.
pub(crate) async fn run_purge(config: &AppConfig) -> anyhow::Result<()> {
    let manager = persistent_manager(config).await?;
    let purged = manager.purge_expired().await?;
    println!(
        "purged {purged} job(s) older than {}h",
        config.job_retention_hours
    );
    Ok(())
}

/// Print a stored job as pretty JSON.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset, the job is unknown or
/// expired, or the query fails.
pub(crate) async fn run_status(config: &AppConfig, job_id: Uuid) -> anyhow::Result<()> {
    let manager = persistent_manager(config).await?;
    let job = manager.status(job_id).await?;
    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}
