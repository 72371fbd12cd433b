use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::ConfidenceTier;

/// A single result returned by a search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub text: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFacts {
    pub employee_count: Option<u32>,
    pub revenue_band: Option<String>,
    pub headquarters: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
}

/// Structured facts and contacts attached to a candidate. Starts empty and is
/// filled by at most one enrichment call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    pub facts: CompanyFacts,
    pub contacts: Vec<Contact>,
}

impl Enrichment {
    #[must_use]
    pub fn has_contact(&self) -> bool {
        !self.contacts.is_empty()
    }

    #[must_use]
    pub fn has_employee_count(&self) -> bool {
        self.facts.employee_count.is_some()
    }

    #[must_use]
    pub fn has_industry(&self) -> bool {
        self.facts
            .industry
            .as_deref()
            .is_some_and(|i| !i.trim().is_empty())
    }

    #[must_use]
    pub fn tier(&self) -> EnrichmentTier {
        let markers = [
            self.has_contact(),
            self.has_employee_count(),
            self.has_industry(),
        ]
        .into_iter()
        .filter(|m| *m)
        .count();

        match markers {
            3 => EnrichmentTier::High,
            1 | 2 => EnrichmentTier::Medium,
            _ => EnrichmentTier::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentTier {
    High,
    Medium,
    Low,
}

impl EnrichmentTier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EnrichmentTier::High => "high",
            EnrichmentTier::Medium => "medium",
            EnrichmentTier::Low => "low",
        }
    }
}

/// A deduplicated organization discovered for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub domain: String,
    pub name: String,
    pub source_url: String,
    pub title: String,
    pub snippet: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Position among all hits that survived dedup; breaks score ties.
    pub discovery_index: usize,
    #[serde(default)]
    pub enrichment: Enrichment,
}

impl Candidate {
    /// Concatenated text scanned by the signal matcher.
    #[must_use]
    pub fn evidence_text(&self) -> String {
        let mut text = String::with_capacity(self.title.len() + self.snippet.len() + 2);
        text.push_str(&self.title);
        text.push('\n');
        text.push_str(&self.snippet);
        if let Some(description) = &self.enrichment.facts.description {
            text.push('\n');
            text.push_str(description);
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedSignal {
    pub definition_id: String,
    pub pattern_id: String,
    pub name: String,
    pub category: String,
    pub tier: ConfidenceTier,
    pub confidence: u8,
    pub evidence: String,
    pub matched_keyword: String,
    pub detected_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredLead {
    pub rank: usize,
    pub candidate: Candidate,
    pub signals: Vec<DetectedSignal>,
    pub completeness: EnrichmentTier,
    pub score: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> Contact {
        Contact {
            name: "Dana Reyes".to_string(),
            title: Some("VP Sales".to_string()),
            email: None,
            linkedin_url: None,
        }
    }

    #[test]
    fn empty_enrichment_is_low_tier() {
        assert_eq!(Enrichment::default().tier(), EnrichmentTier::Low);
    }

    #[test]
    fn partial_enrichment_is_medium_tier() {
        let enrichment = Enrichment {
            facts: CompanyFacts {
                employee_count: Some(120),
                ..CompanyFacts::default()
            },
            contacts: Vec::new(),
        };
        assert_eq!(enrichment.tier(), EnrichmentTier::Medium);
    }

    #[test]
    fn full_enrichment_is_high_tier() {
        let enrichment = Enrichment {
            facts: CompanyFacts {
                employee_count: Some(120),
                industry: Some("Software".to_string()),
                ..CompanyFacts::default()
            },
            contacts: vec![contact()],
        };
        assert_eq!(enrichment.tier(), EnrichmentTier::High);
    }

    #[test]
    fn blank_industry_is_not_counted() {
        let enrichment = Enrichment {
            facts: CompanyFacts {
                industry: Some("  ".to_string()),
                ..CompanyFacts::default()
            },
            contacts: Vec::new(),
        };
        assert!(!enrichment.has_industry());
        assert_eq!(enrichment.tier(), EnrichmentTier::Low);
    }

    #[test]
    fn evidence_text_includes_description_when_present() {
        let mut candidate = Candidate {
            domain: "acme.io".to_string(),
            name: "Acme".to_string(),
            source_url: "https://acme.io/news".to_string(),
            title: "Acme raises Series B".to_string(),
            snippet: "Acme announced funding".to_string(),
            published_at: None,
            discovery_index: 0,
            enrichment: Enrichment::default(),
        };
        assert_eq!(
            candidate.evidence_text(),
            "Acme raises Series B\nAcme announced funding"
        );

        candidate.enrichment.facts.description = Some("Sales automation".to_string());
        assert!(candidate.evidence_text().ends_with("\nSales automation"));
    }
}
