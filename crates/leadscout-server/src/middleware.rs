use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, RETRY_AFTER},
        HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tokio::{sync::Mutex, time::Instant};
use uuid::Uuid;

use crate::api::ApiError;

const API_KEYS_VAR: &str = "LEADSCOUT_API_KEYS";
const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer tokens accepted on job routes. Disabled only in development.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<Vec<String>>,
    pub enabled: bool,
}

impl AuthState {
    /// Reads `LEADSCOUT_API_KEYS`. An empty list disables auth in development
    /// and is a startup error elsewhere.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var(API_KEYS_VAR).unwrap_or_default();
        Self::from_keys(&raw, is_development)
    }

    /// # Errors
    ///
    /// Fails when `raw` holds no token and `is_development` is false.
    pub fn from_keys(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let mut keys: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        keys.sort();
        keys.dedup();

        if keys.is_empty() {
            if is_development {
                tracing::warn!("{API_KEYS_VAR} empty; job routes are unauthenticated");
                return Ok(Self::disabled());
            }

            anyhow::bail!("{API_KEYS_VAR} must list at least one bearer token outside development");
        }

        Ok(Self {
            api_keys: Arc::new(keys),
            enabled: true,
        })
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            api_keys: Arc::new(Vec::new()),
            enabled: false,
        }
    }

    /// Compares against every configured key without short-circuiting.
    fn allows(&self, token: &str) -> bool {
        self.api_keys
            .iter()
            .fold(0_u8, |found, key| {
                found | key.as_bytes().ct_eq(token.as_bytes()).unwrap_u8()
            })
            == 1
    }
}

#[derive(Debug)]
struct RateLimitWindow {
    opened_at: Instant,
    admitted: usize,
}

/// Per-process request budget for job routes: at most `max_requests` per
/// `window`, counted from the first request of each window.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    current: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            current: Arc::new(Mutex::new(RateLimitWindow {
                opened_at: Instant::now(),
                admitted: 0,
            })),
        }
    }

    /// Counts one request against the open window.
    ///
    /// Returns the time left until the window resets when the budget is spent.
    async fn try_admit(&self) -> Result<(), Duration> {
        let mut current = self.current.lock().await;
        let now = Instant::now();
        if now.duration_since(current.opened_at) >= self.window {
            current.opened_at = now;
            current.admitted = 0;
        }
        if current.admitted >= self.max_requests {
            return Err(self.window.saturating_sub(now.duration_since(current.opened_at)));
        }
        current.admitted += 1;
        Ok(())
    }
}

/// Reuses the caller's `x-request-id` when it is short printable ASCII,
/// otherwise mints a `UUIDv4`. The id is stored as a [`RequestId`] extension
/// and echoed on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    res
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map_or_else(String::new, |id| id.0.clone())
}

pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => ApiError::new(
            request_id_of(&req),
            "unauthorized",
            "missing or invalid bearer token",
        )
        .into_response(),
    }
}

/// Rejects over-budget requests with 429 and a whole-second `Retry-After`.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    match rate_limit.try_admit().await {
        Ok(()) => next.run(req).await,
        Err(retry_in) => {
            let retry_secs = retry_in.as_secs() + u64::from(retry_in.subsec_nanos() > 0);
            tracing::debug!(retry_secs, "job route rate limit exhausted");
            let mut res = ApiError::new(
                request_id_of(&req),
                "rate_limited",
                "too many job requests; retry later",
            )
            .into_response();
            res.headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_secs.max(1)));
            res
        }
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn extract_bearer_token_rejects_non_bearer_header() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
    }

    #[test]
    fn auth_state_disables_when_no_keys_in_dev() {
        let state = AuthState::from_keys("", true).expect("dev should allow missing keys");
        assert!(!state.enabled);
    }

    #[test]
    fn auth_state_requires_keys_outside_dev() {
        assert!(AuthState::from_keys(" , ", false).is_err());
    }

    #[test]
    fn auth_state_matches_only_configured_keys() {
        let state = AuthState::from_keys("alpha, beta ,", false).expect("keys");
        assert!(state.enabled);
        assert!(state.allows("alpha"));
        assert!(state.allows("beta"));
        assert!(!state.allows("alph"));
        assert!(!state.allows("gamma"));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_reports_time_until_window_resets() {
        let limit = RateLimitState::new(2, Duration::from_secs(60));
        assert!(limit.try_admit().await.is_ok());
        tokio::time::advance(Duration::from_secs(15)).await;
        assert!(limit.try_admit().await.is_ok());
        assert_eq!(limit.try_admit().await, Err(Duration::from_secs(45)));

        tokio::time::advance(Duration::from_secs(45)).await;
        assert!(limit.try_admit().await.is_ok());
    }
}
