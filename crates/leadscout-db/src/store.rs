//! Pluggable job persistence.
//!
//! [`PgJobStore`] delegates to the `discovery_jobs` queries; [`MemoryJobStore`]
//! keeps jobs in a process-local map with the same transition guards, for
//! tests, the CLI, and database-less development.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadscout_core::{Job, JobError, JobStatus, ScoredLead};
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{jobs, DbError};

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a freshly created `queued` job.
    async fn insert(&self, job: &Job) -> Result<(), DbError>;

    /// `queued -> running`.
    async fn mark_running(&self, id: Uuid, message: &str) -> Result<(), DbError>;

    /// Replace the status message of a `running` job.
    async fn update_progress(&self, id: Uuid, message: &str) -> Result<(), DbError>;

    /// `running -> completed`, storing the ranked result.
    async fn complete(&self, id: Uuid, leads: &[ScoredLead], message: &str)
        -> Result<(), DbError>;

    /// `running -> failed`.
    async fn fail(&self, id: Uuid, error: &JobError) -> Result<(), DbError>;

    async fn get(&self, id: Uuid) -> Result<Job, DbError>;

    /// Set the cancel flag if the job is not terminal; returns the status seen.
    async fn request_cancel(&self, id: Uuid) -> Result<JobStatus, DbError>;

    async fn is_cancel_requested(&self, id: Uuid) -> Result<bool, DbError>;

    /// Delete jobs created before `cutoff`; returns the number removed.
    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError>;

    async fn health_check(&self) -> Result<(), DbError>;
}

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn insert(&self, job: &Job) -> Result<(), DbError> {
        jobs::create_job(&self.pool, job).await
    }

    async fn mark_running(&self, id: Uuid, message: &str) -> Result<(), DbError> {
        jobs::mark_job_running(&self.pool, id, message).await
    }

    async fn update_progress(&self, id: Uuid, message: &str) -> Result<(), DbError> {
        jobs::update_job_progress(&self.pool, id, message).await
    }

    async fn complete(
        &self,
        id: Uuid,
        leads: &[ScoredLead],
        message: &str,
    ) -> Result<(), DbError> {
        jobs::complete_job(&self.pool, id, leads, message).await
    }

    async fn fail(&self, id: Uuid, error: &JobError) -> Result<(), DbError> {
        jobs::fail_job(&self.pool, id, error).await
    }

    async fn get(&self, id: Uuid) -> Result<Job, DbError> {
        jobs::get_job(&self.pool, id).await
    }

    async fn request_cancel(&self, id: Uuid) -> Result<JobStatus, DbError> {
        jobs::request_job_cancel(&self.pool, id).await
    }

    async fn is_cancel_requested(&self, id: Uuid) -> Result<bool, DbError> {
        jobs::is_cancel_requested(&self.pool, id).await
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        jobs::purge_jobs_created_before(&self.pool, cutoff).await
    }

    async fn health_check(&self) -> Result<(), DbError> {
        crate::health_check(&self.pool).await
    }
}

/// In-process store guarded by a single mutex.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<Uuid, Job>>,
}

impl MemoryJobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `update` to a job currently in `expected`, bumping `updated_at`.
    async fn transition<F>(
        &self,
        id: Uuid,
        expected: JobStatus,
        update: F,
    ) -> Result<(), DbError>
    where
        F: FnOnce(&mut Job) + Send,
    {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .get_mut(&id)
            .filter(|job| job.status == expected)
            .ok_or(DbError::InvalidJobTransition {
                id,
                expected_status: expected.as_str(),
            })?;
        update(job);
        job.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, job: &Job) -> Result<(), DbError> {
        self.jobs.lock().await.insert(job.id, job.clone());
        Ok(())
    }

    async fn mark_running(&self, id: Uuid, message: &str) -> Result<(), DbError> {
        self.transition(id, JobStatus::Queued, |job| {
            job.status = JobStatus::Running;
            message.clone_into(&mut job.status_message);
        })
        .await
    }

    async fn update_progress(&self, id: Uuid, message: &str) -> Result<(), DbError> {
        self.transition(id, JobStatus::Running, |job| {
            message.clone_into(&mut job.status_message);
        })
        .await
    }

    async fn complete(
        &self,
        id: Uuid,
        leads: &[ScoredLead],
        message: &str,
    ) -> Result<(), DbError> {
        self.transition(id, JobStatus::Running, |job| {
            job.status = JobStatus::Completed;
            message.clone_into(&mut job.status_message);
            job.result = Some(leads.to_vec());
        })
        .await
    }

    async fn fail(&self, id: Uuid, error: &JobError) -> Result<(), DbError> {
        self.transition(id, JobStatus::Running, |job| {
            job.status = JobStatus::Failed;
            job.status_message.clone_from(&error.message);
            job.error = Some(error.clone());
        })
        .await
    }

    async fn get(&self, id: Uuid) -> Result<Job, DbError> {
        self.jobs
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn request_cancel(&self, id: Uuid) -> Result<JobStatus, DbError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(&id).ok_or(DbError::NotFound)?;
        if !job.status.is_terminal() {
            job.cancel_requested = true;
            job.updated_at = Utc::now();
        }
        Ok(job.status)
    }

    async fn is_cancel_requested(&self, id: Uuid) -> Result<bool, DbError> {
        self.jobs
            .lock()
            .await
            .get(&id)
            .map(|job| job.cancel_requested)
            .ok_or(DbError::NotFound)
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        let mut jobs = self.jobs.lock().await;
        let before = jobs.len();
        jobs.retain(|_, job| job.created_at >= cutoff);
        Ok(u64::try_from(before - jobs.len()).unwrap_or(u64::MAX))
    }

    async fn health_check(&self) -> Result<(), DbError> {
        Ok(())
    }
}
