//! Target profile submitted with each discovery job.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Slack applied above the band maximum. Oversized companies are tolerated
/// more than undersized ones.
pub const SIZE_BAND_UPPER_SLACK: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one target industry is required")]
    MissingIndustries,

    #[error("a company size band is required")]
    MissingSizeBand,

    #[error("invalid company size band {min}..{max}: {reason}")]
    InvalidSizeBand {
        min: u32,
        max: u32,
        reason: &'static str,
    },

    #[error("unknown signal pattern: '{0}'")]
    UnknownSignalPattern(String),
}

/// Inclusive employee-count band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBand {
    pub min: u32,
    pub max: u32,
}

impl SizeBand {
    /// Whether a known employee count is admissible: `min <= count <= max * 1.5`.
    #[must_use]
    pub fn admits(&self, employee_count: u32) -> bool {
        employee_count >= self.min
            && f64::from(employee_count) <= f64::from(self.max) * SIZE_BAND_UPPER_SLACK
    }

    /// Vocabulary used when phrasing discovery queries.
    #[must_use]
    pub fn search_term(&self) -> &'static str {
        match self.max {
            0..=50 => "startup",
            51..=500 => "mid-size",
            501..=5000 => "growth-stage",
            _ => "enterprise",
        }
    }

    fn validate(self) -> Result<(), ValidationError> {
        if self.max == 0 {
            return Err(ValidationError::InvalidSizeBand {
                min: self.min,
                max: self.max,
                reason: "max must be greater than zero",
            });
        }
        if self.min > self.max {
            return Err(ValidationError::InvalidSizeBand {
                min: self.min,
                max: self.max,
                reason: "min must not exceed max",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TargetProfile {
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub company_size: Option<SizeBand>,
    #[serde(default)]
    pub job_titles: Vec<String>,
    #[serde(default)]
    pub geography: Option<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    /// Empty selects every pattern in the catalog.
    #[serde(default)]
    pub signal_pattern_ids: Vec<String>,
}

impl TargetProfile {
    /// Basic structural validation performed synchronously at submission.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when industries are missing or the size band
    /// is absent or malformed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.industries().next().is_none() {
            return Err(ValidationError::MissingIndustries);
        }
        self.company_size
            .ok_or(ValidationError::MissingSizeBand)?
            .validate()
    }

    /// Non-blank industries, trimmed, in submission order.
    pub fn industries(&self) -> impl Iterator<Item = &str> {
        non_blank(&self.industries)
    }

    pub fn job_titles(&self) -> impl Iterator<Item = &str> {
        non_blank(&self.job_titles)
    }

    pub fn pain_points(&self) -> impl Iterator<Item = &str> {
        non_blank(&self.pain_points)
    }

    #[must_use]
    pub fn geography(&self) -> Option<&str> {
        self.geography
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }
}

fn non_blank(values: &[String]) -> impl Iterator<Item = &str> {
    values.iter().map(|v| v.trim()).filter(|v| !v.is_empty())
}
