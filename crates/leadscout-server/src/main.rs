mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use anyhow::Context;
use leadscout_core::AppConfig;
use leadscout_db::{JobStore, MemoryJobStore, PgJobStore};
use leadscout_pipeline::{JobManager, Orchestrator, PipelineConfig};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(leadscout_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let manager = build_manager(&config).await?;
    let _scheduler = scheduler::build_scheduler(manager.clone(), &config.purge_cron).await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        leadscout_core::Environment::Development
    ))?;
    let app = build_app(AppState { manager }, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "leadscout server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn build_manager(config: &AppConfig) -> anyhow::Result<JobManager> {
    let store: Arc<dyn JobStore> = if config.database_url.is_some() {
        let pool = leadscout_db::connect_pool_from_config(config).await?;
        leadscout_db::run_migrations(&pool).await?;
        Arc::new(PgJobStore::new(pool))
    } else {
        tracing::warn!("DATABASE_URL not set; jobs are kept in memory and lost on restart");
        Arc::new(MemoryJobStore::new())
    };

    let catalog = match &config.catalog_path {
        Some(path) => {
            let catalog = leadscout_core::load_catalog(path)
                .with_context(|| format!("failed to load signal catalog {}", path.display()))?;
            tracing::info!(
                patterns = catalog.patterns.len(),
                signals = catalog.signal_count(),
                "signal catalog loaded"
            );
            Some(Arc::new(catalog))
        }
        None => {
            tracing::info!("no signal catalog configured; matching on profile keywords");
            None
        }
    };

    let search = leadscout_providers::search_providers_from_config(config)?;
    let enrichment = leadscout_providers::enrichment_provider_from_config(config)?;
    let orchestrator = Orchestrator::new(
        store,
        search,
        enrichment,
        PipelineConfig::from_app_config(config),
    )
    .with_catalog(catalog);

    Ok(JobManager::new(orchestrator))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
