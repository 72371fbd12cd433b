//! The discovery-and-scoring pipeline and the job manager that runs it.

mod config;
pub mod decay;
pub mod discovery;
mod error;
pub mod filter;
mod manager;
pub mod matcher;
mod orchestrator;
pub mod scoring;

pub use config::PipelineConfig;
pub use error::{ManagerError, PipelineError};
pub use filter::{company_name, Deduplicator, DEFAULT_EXCLUDED_DOMAINS};
pub use manager::JobManager;
pub use matcher::SignalMatcher;
pub use orchestrator::Orchestrator;
