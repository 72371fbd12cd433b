//! Shared HTTP plumbing for the provider adapters.

use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use reqwest::{Client, Response, StatusCode};

use crate::error::ProviderError;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

pub(crate) fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client, ProviderError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Validates and normalizes a base URL to have no trailing slash.
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String, ProviderError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    reqwest::Url::parse(trimmed).map_err(|e| ProviderError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(trimmed.to_string())
}

/// Maps non-2xx responses to typed errors.
pub(crate) fn check_status(
    provider: &'static str,
    response: Response,
) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ProviderError::Unauthorized { provider });
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ProviderError::RateLimited {
            provider,
            retry_after_secs,
        });
    }

    Err(ProviderError::UnexpectedStatus {
        provider,
        status: status.as_u16(),
    })
}

/// Reads the body and deserializes it, keeping `context` for error messages.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, ProviderError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

/// Parses provider timestamps: RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// (assumed UTC), or a bare date.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Removes inline HTML tags (search snippets carry `<strong>` highlights).
pub(crate) fn strip_tags(text: &str) -> String {
    HTML_TAG.replace_all(text, "").trim().to_string()
}
