//! Apollo enrichment adapter.
//!
//! Organization enrichment and people search run concurrently; either half
//! may fail on its own and the other half's data is still returned.

use std::time::Duration;

use async_trait::async_trait;
use leadscout_core::{CompanyFacts, Contact, Enrichment};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::http::{build_client, check_status, normalize_base_url, read_json};
use crate::traits::EnrichmentProvider;

const PROVIDER: &str = "apollo";
const CONTACTS_PER_COMPANY: usize = 5;

pub struct ApolloEnrichmentClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OrganizationResponse {
    #[serde(default)]
    organization: Option<Organization>,
}

#[derive(Debug, Deserialize)]
struct Organization {
    #[serde(default)]
    estimated_num_employees: Option<u32>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    annual_revenue_printed: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    short_description: Option<String>,
}

#[derive(Debug, Serialize)]
struct PeopleSearchRequest<'a> {
    q_organization_domains_list: [&'a str; 1],
    person_titles: &'a [String],
    page: u32,
    per_page: usize,
}

#[derive(Debug, Deserialize)]
struct PeopleSearchResponse {
    #[serde(default)]
    people: Vec<Person>,
}

#[derive(Debug, Deserialize)]
struct Person {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    linkedin_url: Option<String>,
}

impl ApolloEnrichmentClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        api_key: &str,
        base_url: &str,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(user_agent, timeout_secs)?,
            api_key: api_key.to_owned(),
            base_url: normalize_base_url(base_url)?,
        })
    }

    async fn fetch_organization(
        &self,
        domain: &str,
        budget: Duration,
    ) -> Result<CompanyFacts, ProviderError> {
        let response = self
            .client
            .get(format!("{}/api/v1/organizations/enrich", self.base_url))
            .header("X-Api-Key", &self.api_key)
            .query(&[("domain", domain)])
            .timeout(budget)
            .send()
            .await?;
        let response = check_status(PROVIDER, response)?;
        let parsed: OrganizationResponse =
            read_json(response, &format!("apollo organization({domain})")).await?;

        Ok(parsed
            .organization
            .map(company_facts)
            .unwrap_or_default())
    }

    async fn search_people(
        &self,
        domain: &str,
        target_titles: &[String],
        budget: Duration,
    ) -> Result<Vec<Contact>, ProviderError> {
        let request = PeopleSearchRequest {
            q_organization_domains_list: [domain],
            person_titles: target_titles,
            page: 1,
            per_page: CONTACTS_PER_COMPANY,
        };
        let response = self
            .client
            .post(format!("{}/api/v1/mixed_people/search", self.base_url))
            .header("X-Api-Key", &self.api_key)
            .json(&request)
            .timeout(budget)
            .send()
            .await?;
        let response = check_status(PROVIDER, response)?;
        let parsed: PeopleSearchResponse =
            read_json(response, &format!("apollo people({domain})")).await?;

        Ok(parsed
            .people
            .into_iter()
            .filter_map(contact)
            .take(CONTACTS_PER_COMPANY)
            .collect())
    }
}

#[async_trait]
impl EnrichmentProvider for ApolloEnrichmentClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn enrich(
        &self,
        company_name: &str,
        domain: &str,
        budget: Duration,
        target_titles: &[String],
    ) -> Result<Enrichment, ProviderError> {
        let (facts, contacts) = tokio::join!(
            self.fetch_organization(domain, budget),
            self.search_people(domain, target_titles, budget)
        );

        match (facts, contacts) {
            (Err(facts_err), Err(contacts_err)) => {
                tracing::warn!(
                    provider = PROVIDER,
                    domain,
                    company = company_name,
                    contacts_error = %contacts_err,
                    "organization and people lookups both failed"
                );
                Err(facts_err)
            }
            (facts, contacts) => {
                let facts = facts.unwrap_or_else(|e| {
                    tracing::warn!(provider = PROVIDER, domain, error = %e, "organization lookup failed");
                    CompanyFacts::default()
                });
                let contacts = contacts.unwrap_or_else(|e| {
                    tracing::warn!(provider = PROVIDER, domain, error = %e, "people search failed");
                    Vec::new()
                });
                Ok(Enrichment { facts, contacts })
            }
        }
    }
}

fn company_facts(org: Organization) -> CompanyFacts {
    let headquarters = [org.city, org.state, org.country]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    CompanyFacts {
        employee_count: org.estimated_num_employees,
        revenue_band: non_blank(org.annual_revenue_printed),
        headquarters: non_blank(Some(headquarters)),
        industry: non_blank(org.industry),
        description: non_blank(org.short_description),
    }
}

/// Apollo masks emails it has not unlocked with a placeholder address.
fn contact(person: Person) -> Option<Contact> {
    let name = non_blank(person.name).or_else(|| {
        let joined = [person.first_name, person.last_name]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        non_blank(Some(joined))
    })?;

    Some(Contact {
        name,
        title: non_blank(person.title),
        email: non_blank(person.email).filter(|e| !e.contains("not_unlocked")),
        linkedin_url: non_blank(person.linkedin_url),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
