use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// `None` selects the in-memory job store.
    pub database_url: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_path: Option<PathBuf>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub user_agent: String,
    pub exa_api_key: Option<String>,
    pub exa_base_url: String,
    pub brave_api_key: Option<String>,
    pub brave_base_url: String,
    pub apollo_api_key: Option<String>,
    pub apollo_base_url: String,
    pub discovery_timeout_secs: u64,
    pub enrich_timeout_secs: u64,
    pub enrich_batch_size: usize,
    pub result_cap: usize,
    pub results_per_query: usize,
    pub job_retention_hours: u64,
    pub purge_cron: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field("database_url", &redact(&self.database_url))
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("exa_api_key", &redact(&self.exa_api_key))
            .field("exa_base_url", &self.exa_base_url)
            .field("brave_api_key", &redact(&self.brave_api_key))
            .field("brave_base_url", &self.brave_base_url)
            .field("apollo_api_key", &redact(&self.apollo_api_key))
            .field("apollo_base_url", &self.apollo_base_url)
            .field("discovery_timeout_secs", &self.discovery_timeout_secs)
            .field("enrich_timeout_secs", &self.enrich_timeout_secs)
            .field("enrich_batch_size", &self.enrich_batch_size)
            .field("result_cap", &self.result_cap)
            .field("results_per_query", &self.results_per_query)
            .field("job_retention_hours", &self.job_retention_hours)
            .field("purge_cron", &self.purge_cron)
            .finish()
    }
}
