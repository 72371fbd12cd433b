use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use leadscout_core::{Job, SearchHit};
use leadscout_db::{JobStore, MemoryJobStore};
use leadscout_pipeline::{Orchestrator, PipelineConfig};
use leadscout_providers::{NoopEnrichment, ProviderError, SearchProvider};
use tower::ServiceExt;

use super::*;

struct OneHitSearch;

#[async_trait]
impl SearchProvider for OneHitSearch {
    fn name(&self) -> &'static str {
        "one-hit"
    }

    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
        Ok(vec![SearchHit {
            url: "https://acme.io/news".to_string(),
            title: "Acme | Fintech ledger".to_string(),
            text: "Acme ends manual reconciliation".to_string(),
            published_at: None,
        }])
    }
}

const PROFILE: &str = r#"{
    "industries": ["Fintech"],
    "companySize": {"min": 10, "max": 500},
    "painPoints": ["manual reconciliation"]
}"#;

fn state(store: Arc<MemoryJobStore>) -> AppState {
    let search: Arc<dyn SearchProvider> = Arc::new(OneHitSearch);
    let orchestrator = Orchestrator::new(
        store,
        vec![search],
        Arc::new(NoopEnrichment),
        PipelineConfig::default(),
    );
    AppState {
        manager: JobManager::new(orchestrator),
    }
}

fn app(store: Arc<MemoryJobStore>) -> Router {
    build_app(state(store), AuthState::disabled(), default_rate_limit_state())
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn api_error_conflict_maps_to_409() {
    let response = ApiError::new("req-1", "conflict", "already finished").into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn health_reports_job_store_ok() {
    let response = app(Arc::new(MemoryJobStore::new()))
        .oneshot(get("/api/v1/health"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let json = json_body(response).await;
    assert_eq!(json["data"]["job_store"], "ok");
}

#[tokio::test]
async fn submitted_job_is_accepted_then_completes() {
    let app = app(Arc::new(MemoryJobStore::new()));

    let response = app
        .clone()
        .oneshot(post_json("/api/v1/jobs", PROFILE))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = json_body(response).await;
    assert_eq!(json["data"]["status"], "queued");
    assert!(json["meta"]["request_id"].is_string());
    let job_id = json["data"]["jobId"].as_str().expect("job id").to_string();

    let mut job = serde_json::Value::Null;
    for _ in 0..200 {
        let response = app
            .clone()
            .oneshot(get(&format!("/api/v1/jobs/{job_id}")))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        job = json_body(response).await;
        if job["data"]["status"] == "completed" {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert_eq!(job["data"]["status"], "completed");
    let leads = job["data"]["result"].as_array().expect("result array");
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["candidate"]["domain"], "acme.io");
    assert_eq!(leads[0]["score"], 50);
    assert_eq!(leads[0]["rank"], 1);
}

#[tokio::test]
async fn invalid_profile_is_rejected_with_validation_error() {
    let response = app(Arc::new(MemoryJobStore::new()))
        .oneshot(post_json(
            "/api/v1/jobs",
            r#"{"industries": [], "companySize": {"min": 1, "max": 10}}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn malformed_body_is_rejected_with_validation_error() {
    let response = app(Arc::new(MemoryJobStore::new()))
        .oneshot(post_json("/api/v1/jobs", "{not json"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn unknown_job_returns_404() {
    let app = app(Arc::new(MemoryJobStore::new()));

    for uri in [
        format!("/api/v1/jobs/{}", uuid::Uuid::new_v4()),
        "/api/v1/jobs/not-a-uuid".to_string(),
    ] {
        let response = app.clone().oneshot(get(&uri)).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "not_found");
    }
}

#[tokio::test]
async fn cancel_accepts_live_jobs_and_rejects_finished_ones() {
    let store = Arc::new(MemoryJobStore::new());
    let app = app(store.clone());

    let queued = Job::queued(serde_json::from_str(PROFILE).expect("profile"));
    store.insert(&queued).await.expect("insert");
    let response = app
        .clone()
        .oneshot(post_json(&format!("/api/v1/jobs/{}/cancel", queued.id), ""))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(store.get(queued.id).await.expect("job").cancel_requested);

    let finished = Job::queued(serde_json::from_str(PROFILE).expect("profile"));
    store.insert(&finished).await.expect("insert");
    store.mark_running(finished.id, "running").await.expect("running");
    store
        .complete(finished.id, &[], "done")
        .await
        .expect("complete");
    let response = app
        .clone()
        .oneshot(post_json(&format!("/api/v1/jobs/{}/cancel", finished.id), ""))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(post_json(
            &format!("/api/v1/jobs/{}/cancel", uuid::Uuid::new_v4()),
            "",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn protected_routes_require_bearer_token_when_enabled() {
    let auth = AuthState::from_keys("secret-token", false).expect("auth");
    let app = build_app(
        state(Arc::new(MemoryJobStore::new())),
        auth,
        default_rate_limit_state(),
    );

    let response = app
        .clone()
        .oneshot(get(&format!("/api/v1/jobs/{}", uuid::Uuid::new_v4())))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "unauthorized");
    assert!(body["meta"]["request_id"].as_str().is_some_and(|id| !id.is_empty()));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/jobs/{}", uuid::Uuid::new_v4()))
                .header("authorization", "Bearer secret-token")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // health stays public
    let response = app.oneshot(get("/api/v1/health")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rate_limit_rejects_requests_beyond_window_budget() {
    let app = build_app(
        state(Arc::new(MemoryJobStore::new())),
        AuthState::disabled(),
        RateLimitState::new(1, Duration::from_secs(60)),
    );
    let uri = format!("/api/v1/jobs/{}", uuid::Uuid::new_v4());

    let first = app.clone().oneshot(get(&uri)).await.expect("response");
    assert_eq!(first.status(), StatusCode::NOT_FOUND);
    let second = app
        .oneshot(
            Request::builder()
                .uri(&uri)
                .header("x-request-id", "req-limited")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = second
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .expect("retry-after header");
    assert!((1..=60).contains(&retry_after));

    let body = json_body(second).await;
    assert_eq!(body["error"]["code"], "rate_limited");
    assert_eq!(body["meta"]["request_id"], "req-limited");
}
