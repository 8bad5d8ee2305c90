//! Cosine-similarity ranking with preference boosts.

use std::sync::Arc;

use thiserror::Error;
use tripweaver_core::{
    Activity, ExplanationFactors, FallbackRanker, Pace, Ranker, RecommendationScore, ScoreSource,
    UserProfile, sort_and_truncate,
};

use crate::pipeline::{Embedding, EmbeddingPipeline};

/// Interest keywords mapped to the numeric column they switch on.
pub const INTEREST_COLUMNS: [(&str, &str); 5] = [
    ("food", "is_food"),
    ("culture", "is_cultural"),
    ("outdoors", "is_outdoor"),
    ("entertainment", "is_entertainment"),
    ("shopping", "is_shopping"),
];

const INTEREST_BOOST: f64 = 1.3;
const OVER_BUDGET_PENALTY: f64 = 0.7;
const UNDER_BUDGET_PENALTY: f64 = 0.9;
const PACE_PENALTY: f64 = 0.8;

/// Failures inside the similarity path. They never reach callers of
/// [`Ranker::rank`]; the ranker falls back to the heuristic instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimilarityError {
    /// An embedding did not have the pipeline's width.
    #[error("embedding width {found} does not match pipeline width {expected}")]
    WidthMismatch {
        /// Pipeline width.
        expected: usize,
        /// Width encountered.
        found: usize,
    },
    /// A score was NaN or infinite.
    #[error("non-finite similarity for candidate {index}")]
    NonFinite {
        /// Candidate position.
        index: usize,
    },
}

/// Map `profile` into the embedding space of `pipeline`.
///
/// Each recognised interest sets its column to one and the vector is then
/// L2-normalised. With no recognised interests the vector is all zeros.
#[must_use]
pub fn preference_vector(pipeline: &EmbeddingPipeline, profile: &UserProfile) -> Embedding {
    let mut vector = vec![0.0; pipeline.width()];
    for interest in &profile.interests {
        let column = INTEREST_COLUMNS
            .iter()
            .find(|(keyword, _)| interest.eq_ignore_ascii_case(keyword))
            .and_then(|(_, column)| pipeline.numeric_component(column));
        if let Some(slot) = column.and_then(|idx| vector.get_mut(idx)) {
            *slot = 1.0;
        }
    }
    let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

/// Cosine similarity; zero when either vector has zero length.
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Profile interests that occur, ignoring case, inside any activity tag.
///
/// Each distinct interest is reported once, in profile order.
#[must_use]
pub fn matched_interests(activity: &Activity, profile: &UserProfile) -> Vec<String> {
    let tags: Vec<String> = activity.types.iter().map(|t| t.to_lowercase()).collect();
    let mut matched: Vec<String> = Vec::new();
    for interest in &profile.interests {
        let needle = interest.to_lowercase();
        if matched.iter().any(|m| m.to_lowercase() == needle) {
            continue;
        }
        if tags.iter().any(|tag| tag.contains(&needle)) {
            matched.push(interest.clone());
        }
    }
    matched
}

/// Combined multiplier applied to a base similarity.
///
/// Boosts apply in a fixed order: interest matches, then budget fit, then
/// pace fit. The result is always positive, so a penalty below one pulls a
/// negative similarity towards zero rather than further down.
#[must_use]
pub fn preference_multiplier(activity: &Activity, profile: &UserProfile) -> f64 {
    let mut multiplier = 1.0;
    for _ in matched_interests(activity, profile) {
        multiplier *= INTEREST_BOOST;
    }

    let price = activity.price_level;
    if profile.budget < price {
        multiplier *= OVER_BUDGET_PENALTY;
    } else if profile.budget > price.saturating_add(1) {
        multiplier *= UNDER_BUDGET_PENALTY;
    }

    match profile.pace {
        Pace::Fast if activity.has_type("park") => multiplier *= PACE_PENALTY,
        Pace::Relaxed if activity.has_type("amusement_park") => multiplier *= PACE_PENALTY,
        _ => {}
    }
    multiplier
}

/// Content-based ranker over a published pipeline snapshot.
///
/// Without a snapshot, or when the similarity path fails, it ranks with
/// [`FallbackRanker`].
#[derive(Debug, Clone, Default)]
pub struct SimilarityRanker {
    pipeline: Option<Arc<EmbeddingPipeline>>,
}

impl SimilarityRanker {
    /// Rank against `pipeline`, or fall back when it is `None`.
    #[must_use]
    pub const fn new(pipeline: Option<Arc<EmbeddingPipeline>>) -> Self {
        Self { pipeline }
    }

    /// Report whether a trained pipeline backs this ranker.
    #[must_use]
    pub const fn is_trained(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Score every candidate by boosted cosine similarity, in input order.
    ///
    /// Profile and embeddings live in z-scored space, so scores may be
    /// negative. The multiplier from [`preference_multiplier`] scales them
    /// as is: a penalised negative score rises towards zero and can outrank
    /// an unpenalised one with a larger magnitude.
    ///
    /// # Errors
    /// Returns [`SimilarityError`] when an embedding has the wrong width or
    /// a score is not finite.
    pub fn score_candidates(
        pipeline: &EmbeddingPipeline,
        profile: &UserProfile,
        candidates: &[Activity],
    ) -> Result<Vec<RecommendationScore>, SimilarityError> {
        let preference = preference_vector(pipeline, profile);
        let embeddings = pipeline.transform(candidates);
        candidates
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (activity, embedding))| {
                if embedding.len() != preference.len() {
                    return Err(SimilarityError::WidthMismatch {
                        expected: preference.len(),
                        found: embedding.len(),
                    });
                }
                let base = cosine_similarity(&preference, &embedding);
                let score = base * preference_multiplier(activity, profile);
                if !score.is_finite() {
                    return Err(SimilarityError::NonFinite { index });
                }
                let mut scored =
                    RecommendationScore::new(activity.clone(), score, ScoreSource::Similarity);
                scored.factors = Some(ExplanationFactors {
                    base_similarity: Some(base),
                    matched_interests: matched_interests(activity, profile),
                    ..ExplanationFactors::default()
                });
                Ok(scored)
            })
            .collect()
    }
}

impl Ranker for SimilarityRanker {
    fn rank(
        &self,
        profile: &UserProfile,
        candidates: &[Activity],
        top_n: usize,
    ) -> Vec<RecommendationScore> {
        let Some(pipeline) = self.pipeline.as_deref() else {
            log::warn!("embedding pipeline not trained; using fallback ranking");
            return FallbackRanker.rank(profile, candidates, top_n);
        };
        match Self::score_candidates(pipeline, profile, candidates) {
            Ok(mut scores) => {
                sort_and_truncate(&mut scores, top_n);
                log::debug!(
                    "ranked {} candidates by similarity, returning {}",
                    candidates.len(),
                    scores.len()
                );
                scores
            }
            Err(err) => {
                log::warn!("similarity ranking failed ({err}); using fallback ranking");
                FallbackRanker.rank(profile, candidates, top_n)
            }
        }
    }
}
