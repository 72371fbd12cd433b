//! Domain model, signal catalog, and configuration for leadscout.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod job;
pub mod lead;
pub mod profile;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{
    load_catalog, parse_catalog, CatalogError, ConfidenceTier, SignalCatalog, SignalDefinition,
    TriggerPattern,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use job::{Job, JobError, JobErrorKind, JobStatus};
pub use lead::{
    Candidate, CompanyFacts, Contact, DetectedSignal, Enrichment, EnrichmentTier, ScoredLead,
    SearchHit,
};
pub use profile::{SizeBand, TargetProfile, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
