//! Database operations for `discovery_jobs`.
//!
//! Every state change is a single guarded `UPDATE ... WHERE status = ...`, so
//! a transition that does not start from the expected status affects no rows
//! and surfaces as [`DbError::InvalidJobTransition`].

use chrono::{DateTime, Utc};
use leadscout_core::{Job, JobError, JobErrorKind, JobStatus, ScoredLead, TargetProfile};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const JOB_COLUMNS: &str = "id, status, status_message, profile, result, error_kind, \
                           error_message, cancel_requested, created_at, updated_at";

/// A row from the `discovery_jobs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub status: String,
    pub status_message: String,
    pub profile: Json<TargetProfile>,
    pub result: Option<Json<Vec<ScoredLead>>>,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
    pub cancel_requested: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = DbError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = JobStatus::parse(&row.status).ok_or_else(|| DbError::CorruptRow {
            id: row.id,
            reason: format!("unknown status '{}'", row.status),
        })?;

        let error = match row.error_kind {
            Some(kind) => {
                let kind = JobErrorKind::parse(&kind).ok_or_else(|| DbError::CorruptRow {
                    id: row.id,
                    reason: format!("unknown error kind '{kind}'"),
                })?;
                Some(JobError {
                    kind,
                    message: row.error_message.unwrap_or_default(),
                })
            }
            None => None,
        };

        Ok(Job {
            id: row.id,
            status,
            status_message: row.status_message,
            profile: row.profile.0,
            result: row.result.map(|r| r.0),
            error,
            cancel_requested: row.cancel_requested,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Inserts a new job row. The job is expected to be `queued`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_job(pool: &PgPool, job: &Job) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO discovery_jobs \
             (id, status, status_message, profile, cancel_requested, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(job.id)
    .bind(job.status.as_str())
    .bind(&job.status_message)
    .bind(Json(&job.profile))
    .bind(job.cancel_requested)
    .bind(job.created_at)
    .bind(job.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Moves a job from `queued` to `running`.
///
/// # Errors
///
/// Returns [`DbError::InvalidJobTransition`] if the job is not `queued`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn mark_job_running(pool: &PgPool, id: Uuid, message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE discovery_jobs \
         SET status = 'running', status_message = $1, updated_at = NOW() \
         WHERE id = $2 AND status = 'queued'",
    )
    .bind(message)
    .bind(id)
    .execute(pool)
    .await?;

    guard(result.rows_affected(), id, "queued")
}

/// Replaces the progress message of a `running` job.
///
/// # Errors
///
/// Returns [`DbError::InvalidJobTransition`] if the job is not `running`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_job_progress(pool: &PgPool, id: Uuid, message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE discovery_jobs \
         SET status_message = $1, updated_at = NOW() \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(message)
    .bind(id)
    .execute(pool)
    .await?;

    guard(result.rows_affected(), id, "running")
}

/// Marks a `running` job `completed` and stores its ranked result.
///
/// # Errors
///
/// Returns [`DbError::InvalidJobTransition`] if the job is not `running`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn complete_job(
    pool: &PgPool,
    id: Uuid,
    leads: &[ScoredLead],
    message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE discovery_jobs \
         SET status = 'completed', status_message = $1, result = $2, updated_at = NOW() \
         WHERE id = $3 AND status = 'running'",
    )
    .bind(message)
    .bind(Json(leads))
    .bind(id)
    .execute(pool)
    .await?;

    guard(result.rows_affected(), id, "running")
}

/// Marks a `running` job `failed` with a typed error.
///
/// # Errors
///
/// Returns [`DbError::InvalidJobTransition`] if the job is not `running`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn fail_job(pool: &PgPool, id: Uuid, error: &JobError) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE discovery_jobs \
         SET status = 'failed', status_message = $1, error_kind = $2, error_message = $1, \
             updated_at = NOW() \
         WHERE id = $3 AND status = 'running'",
    )
    .bind(&error.message)
    .bind(error.kind.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    guard(result.rows_affected(), id, "running")
}

/// Fetches a single job by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, [`DbError::CorruptRow`] if
/// the stored status is unrecognized, or [`DbError::Sqlx`] if the query fails.
pub async fn get_job(pool: &PgPool, id: Uuid) -> Result<Job, DbError> {
    let row = sqlx::query_as::<_, JobRow>(&format!(
        "SELECT {JOB_COLUMNS} FROM discovery_jobs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Job::try_from(row)
}

/// Sets the durable cancel flag on a non-terminal job.
///
/// Returns the job's status at the time of the request. A terminal status
/// means the flag was not set.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if a
/// query fails.
pub async fn request_job_cancel(pool: &PgPool, id: Uuid) -> Result<JobStatus, DbError> {
    let updated = sqlx::query_scalar::<_, String>(
        "UPDATE discovery_jobs \
         SET cancel_requested = TRUE, updated_at = NOW() \
         WHERE id = $1 AND status IN ('queued', 'running') \
         RETURNING status",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let status = match updated {
        Some(status) => status,
        None => sqlx::query_scalar::<_, String>("SELECT status FROM discovery_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(DbError::NotFound)?,
    };

    JobStatus::parse(&status).ok_or_else(|| DbError::CorruptRow {
        id,
        reason: format!("unknown status '{status}'"),
    })
}

/// Reads the cancel flag for a job.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if the
/// query fails.
pub async fn is_cancel_requested(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    sqlx::query_scalar::<_, bool>("SELECT cancel_requested FROM discovery_jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Deletes every job created before `cutoff`, returning the number removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn purge_jobs_created_before(
    pool: &PgPool,
    cutoff: DateTime<Utc>,
) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM discovery_jobs WHERE created_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

fn guard(rows_affected: u64, id: Uuid, expected_status: &'static str) -> Result<(), DbError> {
    if rows_affected == 0 {
        return Err(DbError::InvalidJobTransition {
            id,
            expected_status,
        });
    }
    Ok(())
}
