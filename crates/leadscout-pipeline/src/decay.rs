//! Time decay for dated evidence.

use chrono::{DateTime, Utc};
use leadscout_core::DetectedSignal;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// `confidence * 0.5^(age_days / half_life_days)`. Future dates count as age 0.
#[must_use]
pub fn decayed_confidence(
    confidence: u8,
    published_at: DateTime<Utc>,
    now: DateTime<Utc>,
    half_life_days: f64,
) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let age_days = ((now - published_at).num_seconds().max(0) as f64) / SECONDS_PER_DAY;
    f64::from(confidence) * 0.5_f64.powf(age_days / half_life_days)
}

/// Applies decay to dated signals, discarding those that fall below
/// `min_confidence`. Undated signals pass through unchanged.
#[must_use]
pub fn apply_time_decay(
    signals: Vec<DetectedSignal>,
    now: DateTime<Utc>,
    half_life_days: f64,
    min_confidence: f64,
) -> Vec<DetectedSignal> {
    signals
        .into_iter()
        .filter_map(|mut signal| {
            let Some(published_at) = signal.published_at else {
                return Some(signal);
            };
            let decayed = decayed_confidence(signal.confidence, published_at, now, half_life_days);
            if decayed < min_confidence {
                tracing::debug!(
                    definition = %signal.definition_id,
                    decayed,
                    "discarding stale signal"
                );
                return None;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                signal.confidence = decayed.round().clamp(0.0, 100.0) as u8;
            }
            Some(signal)
        })
        .collect()
}
