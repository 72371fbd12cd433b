//! The caller-facing job API: submit, poll, cancel, purge.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadscout_core::{Job, JobStatus, TargetProfile, ValidationError};
use leadscout_db::JobStore;
use uuid::Uuid;

use crate::error::ManagerError;
use crate::orchestrator::Orchestrator;

#[derive(Clone)]
pub struct JobManager {
    orchestrator: Orchestrator,
}

impl JobManager {
    #[must_use]
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    fn store(&self) -> &Arc<dyn JobStore> {
        self.orchestrator.store()
    }

    /// Profile validation plus, when a catalog is configured, a check that
    /// every selected pattern exists.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self, profile: &TargetProfile) -> Result<(), ValidationError> {
        profile.validate()?;
        if let Some(catalog) = self.orchestrator.catalog() {
            if let Some(unknown) = profile
                .signal_pattern_ids
                .iter()
                .find(|id| !catalog.contains_pattern(id))
            {
                return Err(ValidationError::UnknownSignalPattern(unknown.clone()));
            }
        }
        Ok(())
    }

    async fn enqueue(&self, profile: TargetProfile) -> Result<Job, ManagerError> {
        self.validate(&profile)?;
        let job = Job::queued(profile);
        self.store().insert(&job).await?;
        tracing::info!(job_id = %job.id, "job queued");
        Ok(job)
    }

    /// Validate, persist a `queued` job, and start it in the background.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Validation`] for a malformed profile, or
    /// [`ManagerError::Store`] if the job cannot be persisted.
    pub async fn submit(&self, profile: TargetProfile) -> Result<Uuid, ManagerError> {
        let job = self.enqueue(profile).await?;
        let job_id = job.id;
        let orchestrator = self.orchestrator.clone();
        tokio::spawn(async move {
            orchestrator.run(job_id, &job.profile).await;
        });
        Ok(job_id)
    }

    /// Like [`JobManager::submit`] but runs the job on the current task and
    /// returns its final state.
    ///
    /// # Errors
    ///
    /// Same as [`JobManager::submit`], plus store errors reading the result.
    pub async fn run_to_completion(&self, profile: TargetProfile) -> Result<Job, ManagerError> {
        let job = self.enqueue(profile).await?;
        self.orchestrator.run(job.id, &job.profile).await;
        Ok(self.store().get(job.id).await?)
    }

    /// Current state of a job.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NotFound`] if the job is unknown or older than
    /// the retention window, purged or not.
    pub async fn status(&self, job_id: Uuid) -> Result<Job, ManagerError> {
        let job = self.store().get(job_id).await?;
        if job.is_expired(Utc::now(), self.orchestrator.config().retention) {
            return Err(ManagerError::NotFound);
        }
        Ok(job)
    }

    /// Request cancellation; the running job observes it before its next
    /// stage. Returns the status at the time of the request.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NotFound`] for unknown or expired jobs and
    /// [`ManagerError::AlreadyFinished`] for terminal ones.
    pub async fn cancel(&self, job_id: Uuid) -> Result<JobStatus, ManagerError> {
        self.status(job_id).await?;
        let status = self.store().request_cancel(job_id).await?;
        if status.is_terminal() {
            return Err(ManagerError::AlreadyFinished(status));
        }
        tracing::info!(job_id = %job_id, status = %status, "cancellation requested");
        Ok(status)
    }

    /// Delete jobs older than the retention window.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] if the delete fails.
    pub async fn purge_expired(&self) -> Result<u64, ManagerError> {
        let cutoff = Utc::now()
            .checked_sub_signed(self.orchestrator.config().retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let purged = self.store().purge_created_before(cutoff).await?;
        tracing::info!(purged, cutoff = %cutoff, "purged expired jobs");
        Ok(purged)
    }

    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] if the job store is unreachable.
    pub async fn health_check(&self) -> Result<(), ManagerError> {
        Ok(self.store().health_check().await?)
    }
}
