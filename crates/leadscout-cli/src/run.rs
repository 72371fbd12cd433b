//! Run a discovery job in the foreground.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use leadscout_core::{AppConfig, Job, JobStatus, ScoredLead, TargetProfile};
use leadscout_pipeline::{JobManager, Orchestrator, PipelineConfig};

use crate::jobs::build_store;

const MAX_SIGNAL_COLUMN_CHARS: usize = 60;

/// Load a profile, run the pipeline to completion, and print the result.
///
/// `catalog_override` takes precedence over `LEADSCOUT_CATALOG_PATH`.
///
/// # Errors
///
/// Returns an error if the profile or catalog cannot be loaded, the profile
/// is invalid, a provider client cannot be built, or the job fails.
pub(crate) async fn run_discovery(
    config: &AppConfig,
    profile_path: &Path,
    catalog_override: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let profile = load_profile(profile_path)?;

    let catalog = catalog_override
        .or(config.catalog_path.as_deref())
        .map(|path| {
            leadscout_core::load_catalog(path)
                .with_context(|| format!("failed to load signal catalog {}", path.display()))
        })
        .transpose()?
        .map(Arc::new);

    let store = build_store(config).await?;
    let search = leadscout_providers::search_providers_from_config(config)?;
    let enrichment = leadscout_providers::enrichment_provider_from_config(config)?;
    let manager = JobManager::new(
        Orchestrator::new(
            store,
            search,
            enrichment,
            PipelineConfig::from_app_config(config),
        )
        .with_catalog(catalog),
    );

    let job = manager.run_to_completion(profile).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&job)?);
    } else {
        print_job(&job);
    }

    if job.status == JobStatus::Failed {
        let message = job.error.map_or_else(
            || "unknown error".to_string(),
            |e| format!("{}: {}", e.kind.as_str(), e.message),
        );
        anyhow::bail!("job {} failed ({message})", job.id);
    }
    Ok(())
}

fn load_profile(path: &Path) -> anyhow::Result<TargetProfile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid profile JSON in {}", path.display()))
}

fn print_job(job: &Job) {
    println!("job {} {}: {}", job.id, job.status, job.status_message);
    let Some(leads) = &job.result else {
        return;
    };
    if leads.is_empty() {
        println!("no qualified leads found");
        return;
    }

    println!(
        "{:<6}{:<30}{:<28}{:<7}{:<8}SIGNALS",
        "RANK", "DOMAIN", "NAME", "SCORE", "DATA"
    );
    for lead in leads {
        println!(
            "{:<6}{:<30}{:<28}{:<7}{:<8}{}",
            lead.rank,
            lead.candidate.domain,
            lead.candidate.name,
            lead.score,
            lead.completeness.as_str(),
            signal_summary(lead)
        );
    }
}

fn signal_summary(lead: &ScoredLead) -> String {
    let summary = lead
        .signals
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if summary.chars().count() <= MAX_SIGNAL_COLUMN_CHARS {
        return summary;
    }
    let mut truncated: String = summary.chars().take(MAX_SIGNAL_COLUMN_CHARS - 1).collect();
    truncated.push('\u{2026}');
    truncated
}
