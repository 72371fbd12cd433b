//! Keyword evidence matching against the signal catalog.

use chrono::{DateTime, Utc};
use leadscout_core::{
    Candidate, ConfidenceTier, DetectedSignal, SignalCatalog, SignalDefinition, TargetProfile,
};

/// Evidence beyond this many characters is ignored.
pub const MAX_EVIDENCE_CHARS: usize = 2_000;
/// Characters of context kept on each side of a keyword hit.
const EXCERPT_CONTEXT_CHARS: usize = 80;

pub const PROFILE_PATTERN_ID: &str = "profile-keywords";

#[derive(Debug, Clone)]
struct ActiveDefinition {
    pattern_id: String,
    definition: SignalDefinition,
    /// Lowercased, non-blank keywords in catalog order.
    keywords: Vec<String>,
}

/// Matches candidate evidence against a fixed set of signal definitions.
#[derive(Debug, Clone)]
pub struct SignalMatcher {
    definitions: Vec<ActiveDefinition>,
}

impl SignalMatcher {
    /// Definitions from the profile's selected patterns, or a single low-tier
    /// definition built from the profile's own terms when no catalog exists.
    #[must_use]
    pub fn new(catalog: Option<&SignalCatalog>, profile: &TargetProfile) -> Self {
        let definitions = match catalog {
            Some(catalog) => catalog
                .select(&profile.signal_pattern_ids)
                .into_iter()
                .map(|(pattern_id, definition)| {
                    ActiveDefinition::new(pattern_id.to_string(), definition.clone())
                })
                .collect(),
            None => vec![ActiveDefinition::new(
                PROFILE_PATTERN_ID.to_string(),
                profile_definition(profile),
            )],
        };
        Self { definitions }
    }

    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// At most one signal per definition, in catalog order.
    #[must_use]
    pub fn detect(&self, candidate: &Candidate, detected_at: DateTime<Utc>) -> Vec<DetectedSignal> {
        let evidence = truncate_chars(&candidate.evidence_text(), MAX_EVIDENCE_CHARS);
        let folded = FoldedText::new(&evidence);

        self.definitions
            .iter()
            .filter(|active| !active.keywords.is_empty())
            .filter_map(|active| {
                active.keywords.iter().find_map(|keyword| {
                    folded.find(keyword).map(|(start, end)| DetectedSignal {
                        definition_id: active.definition.id.clone(),
                        pattern_id: active.pattern_id.clone(),
                        name: active.definition.name.clone(),
                        category: active.definition.category.clone(),
                        tier: active.definition.tier,
                        confidence: active.definition.tier.confidence(),
                        evidence: excerpt(&evidence, start, end),
                        matched_keyword: keyword.clone(),
                        detected_at,
                        published_at: candidate.published_at,
                    })
                })
            })
            .collect()
    }
}

impl ActiveDefinition {
    fn new(pattern_id: String, definition: SignalDefinition) -> Self {
        let keywords = definition
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            pattern_id,
            definition,
            keywords,
        }
    }
}

fn profile_definition(profile: &TargetProfile) -> SignalDefinition {
    SignalDefinition {
        id: PROFILE_PATTERN_ID.to_string(),
        name: "Profile keyword match".to_string(),
        category: "profile".to_string(),
        tier: ConfidenceTier::Low,
        keywords: profile
            .pain_points()
            .chain(profile.industries())
            .map(str::to_string)
            .collect(),
        source_hints: Vec::new(),
        messaging_angle: None,
    }
}

/// Lowercased text with a byte-offset map back into the original string.
struct FoldedText {
    lowered: String,
    /// `origin[i]` is the byte offset in the original text of the character
    /// that produced lowered byte `i`; the final entry is the original length.
    origin: Vec<usize>,
}

impl FoldedText {
    fn new(text: &str) -> Self {
        let mut lowered = String::with_capacity(text.len());
        let mut origin = Vec::with_capacity(text.len() + 1);
        for (offset, ch) in text.char_indices() {
            for lower in ch.to_lowercase() {
                let before = lowered.len();
                lowered.push(lower);
                origin.extend(std::iter::repeat_n(offset, lowered.len() - before));
            }
        }
        origin.push(text.len());
        Self { lowered, origin }
    }

    /// Original byte range of the first occurrence of `needle` (already lowercase).
    fn find(&self, needle: &str) -> Option<(usize, usize)> {
        let start = self.lowered.find(needle)?;
        let end = start + needle.len();
        Some((self.origin[start], self.origin[end]))
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn excerpt(text: &str, start: usize, end: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(EXCERPT_CONTEXT_CHARS - 1)
        .map_or(0, |(idx, _)| idx);
    let to = text[end..]
        .char_indices()
        .nth(EXCERPT_CONTEXT_CHARS)
        .map_or(text.len(), |(idx, _)| end + idx);

    text[from..to].split_whitespace().collect::<Vec<_>>().join(" ")
}
