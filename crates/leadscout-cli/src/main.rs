mod catalog;
mod jobs;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "leadscout-cli")]
#[command(about = "Lead discovery and scoring command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a discovery job for a target profile and print the ranked leads
    Run {
        /// Path to a target profile JSON file
        #[arg(long)]
        profile: PathBuf,
        /// Signal catalog YAML; overrides LEADSCOUT_CATALOG_PATH
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Print the full job as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Validate a signal catalog file and summarize its patterns
    Catalog {
        /// Path to the catalog YAML file
        file: PathBuf,
    },
    /// Apply pending database migrations
    Migrate,
    /// Delete stored jobs older than the retention window
    Purge,
    /// Show a stored job by id
    Status {
        job_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = leadscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            profile,
            catalog,
            json,
        } => run::run_discovery(&config, &profile, catalog.as_deref(), json).await,
        Commands::Catalog { file } => catalog::run_catalog_check(&file),
        Commands::Migrate => jobs::run_migrate(&config).await,
        Commands::Purge => jobs::run_purge(&config).await,
        Commands::Status { job_id } => jobs::run_status(&config, job_id).await,
    }
}

#[cfg(test)]
mod tests;
