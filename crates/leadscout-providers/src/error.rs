use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider} rejected the API key")]
    Unauthorized { provider: &'static str },

    #[error("rate limited by {provider} (retry after {retry_after_secs}s)")]
    RateLimited {
        provider: &'static str,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {provider}")]
    UnexpectedStatus { provider: &'static str, status: u16 },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
