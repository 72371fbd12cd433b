//! Candidate deduplication and noise filtering.
//!
//! Pure and stable: applying [`Deduplicator::filter_hits`] to its own output
//! returns the same hits in the same order.

use std::collections::HashSet;

use leadscout_core::{Candidate, Enrichment, SearchHit};
use leadscout_providers::{normalize_domain, path_segments};

/// Job boards, social networks, news aggregators, and data vendors. Matched
/// by domain suffix.
pub const DEFAULT_EXCLUDED_DOMAINS: &[&str] = &[
    // job boards
    "linkedin.com",
    "indeed.com",
    "glassdoor.com",
    "ziprecruiter.com",
    "monster.com",
    "wellfound.com",
    "angel.co",
    "builtin.com",
    "lever.co",
    "greenhouse.io",
    "workable.com",
    "simplyhired.com",
    // social
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "youtube.com",
    "tiktok.com",
    "reddit.com",
    "medium.com",
    // aggregators and news wires
    "news.google.com",
    "news.ycombinator.com",
    "yahoo.com",
    "bing.com",
    "wikipedia.org",
    "prnewswire.com",
    "businesswire.com",
    "globenewswire.com",
    // data vendors and review sites
    "crunchbase.com",
    "zoominfo.com",
    "pitchbook.com",
    "owler.com",
    "dnb.com",
    "apollo.io",
    "g2.com",
    "capterra.com",
];

const CAREER_PATH_SEGMENTS: &[&str] = &[
    "careers",
    "career",
    "jobs",
    "job",
    "join-us",
    "open-positions",
    "work-with-us",
];

const CAREER_HOST_PREFIXES: &[&str] = &["careers.", "jobs."];

const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " \u{2013} ", " \u{2014} ", ": "];

const GENERIC_TITLES: &[&str] = &["home", "homepage", "home page", "index", "untitled"];

const MAX_TITLE_NAME_CHARS: usize = 50;

#[derive(Debug, Clone)]
pub struct Deduplicator {
    excluded: Vec<String>,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::with_excluded(DEFAULT_EXCLUDED_DOMAINS.iter().copied())
    }
}

impl Deduplicator {
    pub fn with_excluded<'a>(domains: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            excluded: domains
                .into_iter()
                .filter_map(normalize_domain)
                .collect(),
        }
    }

    /// Whether `domain` equals or is a subdomain of an excluded domain.
    #[must_use]
    pub fn is_excluded(&self, domain: &str) -> bool {
        self.excluded.iter().any(|excluded| {
            domain == excluded
                || domain
                    .strip_suffix(excluded.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    /// Drops hits with no usable domain, excluded domains, careers pages, and
    /// repeat domains. First occurrence wins.
    #[must_use]
    pub fn filter_hits(&self, hits: Vec<SearchHit>) -> Vec<SearchHit> {
        let mut seen = HashSet::new();
        hits.into_iter()
            .filter(|hit| {
                let Some(domain) = normalize_domain(&hit.url) else {
                    tracing::debug!(url = %hit.url, "dropping hit without a usable domain");
                    return false;
                };
                if self.is_excluded(&domain) || is_careers_page(&hit.url, &domain) {
                    return false;
                }
                seen.insert(domain)
            })
            .collect()
    }

    /// Filters `hits` and turns the survivors into candidates, numbered in
    /// discovery order.
    #[must_use]
    pub fn candidates(&self, hits: Vec<SearchHit>) -> Vec<Candidate> {
        self.filter_hits(hits)
            .into_iter()
            .enumerate()
            .filter_map(|(discovery_index, hit)| {
                let domain = normalize_domain(&hit.url)?;
                Some(Candidate {
                    name: company_name(&hit.title, &domain),
                    domain,
                    source_url: hit.url,
                    title: hit.title,
                    snippet: hit.text,
                    published_at: hit.published_at,
                    discovery_index,
                    enrichment: Enrichment::default(),
                })
            })
            .collect()
    }
}

fn is_careers_page(url: &str, domain: &str) -> bool {
    CAREER_HOST_PREFIXES.iter().any(|p| domain.starts_with(p))
        || path_segments(url)
            .iter()
            .any(|segment| CAREER_PATH_SEGMENTS.contains(&segment.as_str()))
}

/// Display name from the page title, falling back to the domain's first label.
#[must_use]
pub fn company_name(title: &str, domain: &str) -> String {
    let first_segment = TITLE_SEPARATORS
        .iter()
        .filter_map(|sep| title.find(sep))
        .min()
        .map_or(title, |idx| &title[..idx])
        .trim();

    if !first_segment.is_empty()
        && first_segment.chars().count() < MAX_TITLE_NAME_CHARS
        && !is_generic_title(first_segment)
    {
        return first_segment.to_string();
    }

    name_from_domain(domain)
}

fn is_generic_title(segment: &str) -> bool {
    let lower = segment.to_lowercase();
    GENERIC_TITLES.contains(&lower.as_str()) || lower == "welcome" || lower.starts_with("welcome to")
}

fn name_from_domain(domain: &str) -> String {
    domain
        .split('.')
        .next()
        .unwrap_or(domain)
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
