use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let database_url = optional("DATABASE_URL");
    let env = parse_environment(&or_default("LEADSCOUT_ENV", "development"));
    let bind_addr = parse_addr("LEADSCOUT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("LEADSCOUT_LOG_LEVEL", "info");
    let catalog_path = optional("LEADSCOUT_CATALOG_PATH").map(PathBuf::from);

    let db_max_connections = parse_u32("LEADSCOUT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("LEADSCOUT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("LEADSCOUT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let user_agent = or_default("LEADSCOUT_USER_AGENT", "leadscout/0.1 (lead-discovery)");
    let exa_api_key = optional("EXA_API_KEY");
    let exa_base_url = or_default("EXA_BASE_URL", "https://api.exa.ai");
    let brave_api_key = optional("BRAVE_API_KEY");
    let brave_base_url = or_default("BRAVE_BASE_URL", "https://api.search.brave.com");
    let apollo_api_key = optional("APOLLO_API_KEY");
    let apollo_base_url = or_default("APOLLO_BASE_URL", "https://api.apollo.io");

    let discovery_timeout_secs = parse_u64("LEADSCOUT_DISCOVERY_TIMEOUT_SECS", "40")?;
    let enrich_timeout_secs = parse_u64("LEADSCOUT_ENRICH_TIMEOUT_SECS", "8")?;
    let enrich_batch_size = parse_positive_usize("LEADSCOUT_ENRICH_BATCH_SIZE", "5")?;
    let result_cap = parse_positive_usize("LEADSCOUT_RESULT_CAP", "25")?;
    let results_per_query = parse_positive_usize("LEADSCOUT_RESULTS_PER_QUERY", "20")?;
    let job_retention_hours = parse_u64("LEADSCOUT_JOB_RETENTION_HOURS", "24")?;
    let purge_cron = or_default("LEADSCOUT_PURGE_CRON", "0 0 * * * *");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        catalog_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        user_agent,
        exa_api_key,
        exa_base_url,
        brave_api_key,
        brave_base_url,
        apollo_api_key,
        apollo_base_url,
        discovery_timeout_secs,
        enrich_timeout_secs,
        enrich_batch_size,
        result_cap,
        results_per_query,
        job_retention_hours,
        purge_cron,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
