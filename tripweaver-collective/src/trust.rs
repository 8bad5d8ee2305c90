//! Trust signals attached to collaborative recommendations.

use crate::blend::CollectiveCandidate;

/// Ordered trust signals for `candidate`.
///
/// The rules are total: a candidate that matches none yields an empty list,
/// and consumers fall back to
/// [`DEFAULT_TRUST_SIGNAL`](tripweaver_core::DEFAULT_TRUST_SIGNAL).
#[must_use]
pub fn trust_signals(candidate: &CollectiveCandidate) -> Vec<String> {
    let mut signals = Vec::new();

    let rating = candidate.average_rating.unwrap_or_default();
    if rating >= 4.5 {
        signals.push("Excellent rating".to_owned());
    } else if rating >= 4.0 {
        signals.push("Highly rated".to_owned());
    }

    let count = candidate.rating_count.unwrap_or_default();
    if count >= 100 {
        signals.push("Very popular".to_owned());
    } else if count >= 50 {
        signals.push("Popular choice".to_owned());
    }

    if let Some(signal) = candidate.signal.as_deref().filter(|s| !s.is_empty()) {
        signals.push(signal.to_owned());
    }

    if candidate.trend_score.unwrap_or_default() > 0.7 {
        signals.push("Trending now".to_owned());
    }

    match candidate.price_level {
        Some(1) => signals.push("Great value".to_owned()),
        Some(4) => signals.push("Premium experience".to_owned()),
        _ => {}
    }

    signals
}
