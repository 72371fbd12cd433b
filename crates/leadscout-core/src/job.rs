use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lead::ScoredLead;
use crate::profile::TargetProfile;

/// Lifecycle state of a discovery job.
///
/// Transitions only move forward: `queued -> running -> completed | failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "queued" => Some(JobStatus::Queued),
            "running" => Some(JobStatus::Running),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    #[must_use]
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed | JobStatus::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobErrorKind {
    Validation,
    PipelineExhaustion,
    Cancelled,
    Internal,
}

impl JobErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobErrorKind::Validation => "validation",
            JobErrorKind::PipelineExhaustion => "pipeline_exhaustion",
            JobErrorKind::Cancelled => "cancelled",
            JobErrorKind::Internal => "internal",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "validation" => Some(JobErrorKind::Validation),
            "pipeline_exhaustion" => Some(JobErrorKind::PipelineExhaustion),
            "cancelled" => Some(JobErrorKind::Cancelled),
            "internal" => Some(JobErrorKind::Internal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    pub kind: JobErrorKind,
    pub message: String,
}

/// Persisted record for one asynchronous discovery run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub status_message: String,
    pub profile: TargetProfile,
    /// Present iff `status` is `completed`.
    pub result: Option<Vec<ScoredLead>>,
    pub error: Option<JobError>,
    pub cancel_requested: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// A fresh `queued` job for `profile`.
    #[must_use]
    pub fn queued(profile: TargetProfile) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Queued,
            status_message: "queued".to_string(),
            profile,
            result: None,
            error: None,
            cancel_requested: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        now - self.created_at > retention
    }
}
