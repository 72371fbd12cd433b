use leadscout_core::{JobErrorKind, JobStatus, ValidationError};
use leadscout_db::DbError;
use thiserror::Error;

/// Fatal orchestration errors. Each maps to the `JobErrorKind` persisted on
/// the failed job.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("all {attempted} discovery calls failed; no candidates available")]
    Exhausted { attempted: usize },

    #[error("job cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("job store error: {0}")]
    Store(#[from] DbError),
}

impl PipelineError {
    #[must_use]
    pub fn kind(&self) -> JobErrorKind {
        match self {
            PipelineError::Exhausted { .. } => JobErrorKind::PipelineExhaustion,
            PipelineError::Cancelled => JobErrorKind::Cancelled,
            PipelineError::Internal(_) | PipelineError::Store(_) => JobErrorKind::Internal,
        }
    }
}

/// Errors surfaced to callers of [`crate::JobManager`].
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("job not found")]
    NotFound,

    #[error("job already finished with status '{0}'")]
    AlreadyFinished(JobStatus),

    #[error("job store error: {0}")]
    Store(DbError),
}

impl From<DbError> for ManagerError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => ManagerError::NotFound,
            other => ManagerError::Store(other),
        }
    }
}
