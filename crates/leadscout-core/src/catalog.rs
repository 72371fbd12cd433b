//! Evidence signal catalog: trigger patterns and their signal definitions.
//!
//! The catalog is authored externally and loaded read-only from YAML. This
//! module only parses and validates it.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("catalog validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Per-match confidence declared by the tier.
    #[must_use]
    pub fn confidence(self) -> u8 {
        match self {
            ConfidenceTier::High => 75,
            ConfidenceTier::Medium => 60,
            ConfidenceTier::Low => 40,
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceTier::High => write!(f, "high"),
            ConfidenceTier::Medium => write!(f, "medium"),
            ConfidenceTier::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalDefinition {
    pub id: String,
    pub name: String,
    /// Filled from the owning pattern id when omitted in the file.
    #[serde(default)]
    pub category: String,
    pub tier: ConfidenceTier,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub source_hints: Vec<String>,
    /// Opaque outreach annotation; never read by scoring.
    #[serde(default)]
    pub messaging_angle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerPattern {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub signals: Vec<SignalDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SignalCatalog {
    pub patterns: Vec<TriggerPattern>,
}

impl SignalCatalog {
    #[must_use]
    pub fn contains_pattern(&self, pattern_id: &str) -> bool {
        self.patterns.iter().any(|p| p.id == pattern_id)
    }

    /// Definitions from the selected patterns, paired with their pattern id,
    /// in catalog order. An empty selection selects every pattern.
    #[must_use]
    pub fn select<'a>(&'a self, pattern_ids: &[String]) -> Vec<(&'a str, &'a SignalDefinition)> {
        self.patterns
            .iter()
            .filter(|p| pattern_ids.is_empty() || pattern_ids.iter().any(|id| id == &p.id))
            .flat_map(|p| p.signals.iter().map(move |s| (p.id.as_str(), s)))
            .collect()
    }

    #[must_use]
    pub fn signal_count(&self) -> usize {
        self.patterns.iter().map(|p| p.signals.len()).sum()
    }
}

/// Load and validate a catalog from a YAML file.
///
/// # Errors
///
/// Returns [`CatalogError`] if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<SignalCatalog, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_catalog(&content)
}

/// Parse and validate a catalog from YAML text.
///
/// # Errors
///
/// Returns [`CatalogError`] if the YAML is malformed or fails validation.
pub fn parse_catalog(yaml: &str) -> Result<SignalCatalog, CatalogError> {
    let mut catalog: SignalCatalog = serde_yaml::from_str(yaml)?;
    for pattern in &mut catalog.patterns {
        for signal in &mut pattern.signals {
            if signal.category.trim().is_empty() {
                signal.category.clone_from(&pattern.id);
            }
        }
    }
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &SignalCatalog) -> Result<(), CatalogError> {
    let mut seen_patterns = HashSet::new();
    let mut seen_signals = HashSet::new();

    for pattern in &catalog.patterns {
        if pattern.id.trim().is_empty() {
            return Err(CatalogError::Validation(
                "pattern id must be non-empty".to_string(),
            ));
        }
        if !seen_patterns.insert(pattern.id.as_str()) {
            return Err(CatalogError::Validation(format!(
                "duplicate pattern id: '{}'",
                pattern.id
            )));
        }
        if pattern.signals.is_empty() {
            return Err(CatalogError::Validation(format!(
                "pattern '{}' has no signals",
                pattern.id
            )));
        }

        for signal in &pattern.signals {
            if signal.id.trim().is_empty() || signal.name.trim().is_empty() {
                return Err(CatalogError::Validation(format!(
                    "pattern '{}' has a signal with an empty id or name",
                    pattern.id
                )));
            }
            if !seen_signals.insert(signal.id.as_str()) {
                return Err(CatalogError::Validation(format!(
                    "duplicate signal id: '{}'",
                    signal.id
                )));
            }
            if !signal.keywords.iter().any(|k| !k.trim().is_empty()) {
                return Err(CatalogError::Validation(format!(
                    "signal '{}' has no keywords",
                    signal.id
                )));
            }
        }
    }

    Ok(())
}
