//! Discovery job handlers: submit, poll, cancel.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use leadscout_core::{Job, JobError, JobStatus, ScoredLead, TargetProfile};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_manager_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct JobAccepted {
    job_id: Uuid,
    status: JobStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct JobView {
    job_id: Uuid,
    status: JobStatus,
    status_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Vec<ScoredLead>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JobError>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            status_message: job.status_message,
            result: job.result,
            error: job.error,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Unparseable ids cannot name a job, so they are reported as not found.
fn parse_job_id(req_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::new(req_id, "not_found", "job not found"))
}

/// POST /api/v1/jobs — validate a target profile and queue a discovery job.
pub(super) async fn submit_job(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<TargetProfile>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<JobAccepted>>), ApiError> {
    let Json(profile) =
        body.map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.body_text()))?;

    let job_id = state
        .manager
        .submit(profile)
        .await
        .map_err(|e| map_manager_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: JobAccepted {
                job_id,
                status: JobStatus::Queued,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/jobs/{job_id} — current status, and the ranked leads once
/// completed.
pub(super) async fn get_job(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(job_id): Path<String>,
) -> Result<Json<ApiResponse<JobView>>, ApiError> {
    let job_id = parse_job_id(&req_id.0, &job_id)?;
    let job = state
        .manager
        .status(job_id)
        .await
        .map_err(|e| map_manager_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: JobView::from(job),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/jobs/{job_id}/cancel — request cancellation of a live job.
pub(super) async fn cancel_job(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(job_id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<JobAccepted>>), ApiError> {
    let job_id = parse_job_id(&req_id.0, &job_id)?;
    let status = state
        .manager
        .cancel(job_id)
        .await
        .map_err(|e| map_manager_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: JobAccepted { job_id, status },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadscout_core::{JobErrorKind, SizeBand};

    fn job() -> Job {
        Job::queued(TargetProfile {
            industries: vec!["Fintech".to_string()],
            company_size: Some(SizeBand { min: 10, max: 100 }),
            ..TargetProfile::default()
        })
    }

    #[test]
    fn job_view_omits_result_and_error_while_running() {
        let json = serde_json::to_value(JobView::from(job())).expect("serialize");
        assert_eq!(json["status"], "queued");
        assert!(json.get("result").is_none());
        assert!(json.get("error").is_none());
        assert!(json["jobId"].is_string());
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn job_view_includes_error_for_failed_jobs() {
        let mut failed = job();
        failed.status = JobStatus::Failed;
        failed.error = Some(JobError {
            kind: JobErrorKind::PipelineExhaustion,
            message: "all 3 discovery calls failed".to_string(),
        });
        let json = serde_json::to_value(JobView::from(failed)).expect("serialize");
        assert_eq!(json["error"]["kind"], "pipeline_exhaustion");
    }

    #[test]
    fn malformed_job_id_is_not_found() {
        let err = parse_job_id("req-1", "not-a-uuid").unwrap_err();
        assert_eq!(err.error.code, "not_found");
    }
}
