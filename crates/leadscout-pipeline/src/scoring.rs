//! Composite lead scoring and ranking.
//!
//! `signal part = min(50 + 10 * (distinct definitions - 1), 100)`, plus
//! completeness bonuses, then a single convergence multiplier for signals
//! spanning several categories, clamped to `[0, 100]` and rounded half away
//! from zero.

use std::collections::HashSet;

use leadscout_core::{Candidate, DetectedSignal, Enrichment, ScoredLead};

const BASE_SIGNAL_SCORE: f64 = 50.0;
const PER_EXTRA_SIGNAL: f64 = 10.0;
const MAX_SIGNAL_SCORE: f64 = 100.0;
const CONTACT_BONUS: f64 = 5.0;
const EMPLOYEE_COUNT_BONUS: f64 = 3.0;
const INDUSTRY_BONUS: f64 = 2.0;
const TWO_CATEGORY_MULTIPLIER: f64 = 1.15;
const THREE_CATEGORY_MULTIPLIER: f64 = 1.3;

/// Score in `[0, 100]`, or `None` when there is no signal to score.
#[must_use]
pub fn score(signals: &[DetectedSignal], enrichment: &Enrichment) -> Option<u8> {
    let distinct: HashSet<&str> = signals.iter().map(|s| s.definition_id.as_str()).collect();
    if distinct.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let extra = (distinct.len() - 1) as f64;
    let mut subtotal = (BASE_SIGNAL_SCORE + PER_EXTRA_SIGNAL * extra).min(MAX_SIGNAL_SCORE);

    if enrichment.has_contact() {
        subtotal += CONTACT_BONUS;
    }
    if enrichment.has_employee_count() {
        subtotal += EMPLOYEE_COUNT_BONUS;
    }
    if enrichment.has_industry() {
        subtotal += INDUSTRY_BONUS;
    }

    let categories: HashSet<&str> = signals.iter().map(|s| s.category.as_str()).collect();
    let multiplier = match categories.len() {
        n if n >= 3 => THREE_CATEGORY_MULTIPLIER,
        2 => TWO_CATEGORY_MULTIPLIER,
        _ => 1.0,
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = (subtotal * multiplier).clamp(0.0, 100.0).round() as u8;
    Some(score)
}

/// Drops unscored candidates, sorts by score descending (ties keep discovery
/// order), truncates to `cap`, and assigns ranks from 1.
#[must_use]
pub fn rank(evaluated: Vec<(Candidate, Vec<DetectedSignal>)>, cap: usize) -> Vec<ScoredLead> {
    let mut scored: Vec<ScoredLead> = evaluated
        .into_iter()
        .filter_map(|(candidate, signals)| {
            let score = score(&signals, &candidate.enrichment)?;
            Some(ScoredLead {
                rank: 0,
                completeness: candidate.enrichment.tier(),
                candidate,
                signals,
                score,
            })
        })
        .collect();

    scored.sort_by_key(|lead| lead.candidate.discovery_index);
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(cap);

    for (idx, lead) in scored.iter_mut().enumerate() {
        lead.rank = idx + 1;
    }
    scored
}
