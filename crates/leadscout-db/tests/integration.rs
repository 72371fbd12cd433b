//! Offline tests for leadscout-db pool configuration and the in-memory store.
//! These tests do not require a live database connection.

use std::sync::Arc;

use leadscout_core::{
    AppConfig, Environment, Job, JobError, JobErrorKind, JobStatus, SizeBand, TargetProfile,
};
use leadscout_db::{DbError, JobStore, MemoryJobStore, PoolConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: Some("postgres://example".to_string()),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        catalog_path: None,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        user_agent: "ua".to_string(),
        exa_api_key: None,
        exa_base_url: "https://api.exa.ai".to_string(),
        brave_api_key: None,
        brave_base_url: "https://api.search.brave.com".to_string(),
        apollo_api_key: None,
        apollo_base_url: "https://api.apollo.io".to_string(),
        discovery_timeout_secs: 40,
        enrich_timeout_secs: 8,
        enrich_batch_size: 5,
        result_cap: 25,
        results_per_query: 20,
        job_retention_hours: 24,
        purge_cron: "0 0 * * * *".to_string(),
    }
}

fn profile() -> TargetProfile {
    TargetProfile {
        industries: vec!["SaaS".to_string()],
        company_size: Some(SizeBand { min: 50, max: 500 }),
        ..TargetProfile::default()
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[tokio::test]
async fn connect_pool_from_config_requires_database_url() {
    let config = AppConfig {
        database_url: None,
        ..app_config()
    };
    let result = leadscout_db::connect_pool_from_config(&config).await;
    assert!(matches!(result, Err(DbError::MissingDatabaseUrl)));
}

#[tokio::test]
async fn memory_store_is_usable_as_trait_object() {
    let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
    let job = Job::queued(profile());
    store.insert(&job).await.unwrap();

    store.mark_running(job.id, "discovering").await.unwrap();
    store
        .fail(
            job.id,
            &JobError {
                kind: JobErrorKind::Cancelled,
                message: "job cancelled".to_string(),
            },
        )
        .await
        .unwrap();

    let stored = store.get(job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.profile, profile());
    assert_eq!(stored.status_message, "job cancelled");
    assert!(store.health_check().await.is_ok());
}
