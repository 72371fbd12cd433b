//! Background job scheduler.
//!
//! Registers the recurring purge of discovery jobs older than the retention
//! window.

use leadscout_pipeline::JobManager;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the purge job cannot be registered (including an invalid cron
/// expression), or the scheduler fails to start.
pub async fn build_scheduler(
    manager: JobManager,
    purge_cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_purge_job(&scheduler, manager, purge_cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the expired-job purge; hourly by default (`0 0 * * * *`).
async fn register_purge_job(
    scheduler: &JobScheduler,
    manager: JobManager,
    purge_cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(purge_cron, move |_uuid, _lock| {
        let manager = manager.clone();

        Box::pin(async move {
            match manager.purge_expired().await {
                Ok(0) => tracing::debug!("scheduler: no expired jobs to purge"),
                Ok(purged) => tracing::info!(purged, "scheduler: purged expired jobs"),
                Err(e) => tracing::error!(error = %e, "scheduler: job purge failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = purge_cron, "scheduler: registered expired-job purge");
    Ok(())
}
