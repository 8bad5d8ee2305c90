//! Rank candidate activities for a traveller.
//!
//! The [`Ranker`] trait is the seam between the content-based similarity
//! ranker and the heuristic [`FallbackRanker`] used when no trained pipeline
//! is available.

use serde::{Deserialize, Serialize};

use crate::{Activity, UserProfile};

/// Literal used when no trust signal applies.
pub const DEFAULT_TRUST_SIGNAL: &str = "Recommended";

/// Where a recommendation score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Cosine similarity against a trained embedding pipeline.
    Similarity,
    /// Rating and popularity heuristic.
    Fallback,
    /// Anonymised collaborative aggregates only.
    Collective,
    /// Content-based score only.
    Content,
    /// Collaborative and content-based scores combined.
    Blended,
}

/// Inputs that explain how a score was reached.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplanationFactors {
    /// Cosine similarity before boosts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_similarity: Option<f64>,
    /// Profile interests found in the activity's tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched_interests: Vec<String>,
    /// Collaborative score before any content merge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collective_score: Option<f64>,
    /// Content-based score merged into the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_score: Option<f64>,
    /// Segments whose top lists contributed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<String>,
}

/// A scored recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationScore {
    /// The recommended activity.
    pub activity: Activity,
    /// Final score; higher is better. Similarity scores can be negative,
    /// and boosts below one move those towards zero.
    pub score: f64,
    /// Which ranking path produced the score.
    pub source: ScoreSource,
    /// Explanation inputs, when the ranker records them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factors: Option<ExplanationFactors>,
    /// Human-readable badges in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trust_signals: Vec<String>,
}

impl RecommendationScore {
    /// Create a score without factors or signals.
    #[must_use]
    pub const fn new(activity: Activity, score: f64, source: ScoreSource) -> Self {
        Self {
            activity,
            score,
            source,
            factors: None,
            trust_signals: Vec::new(),
        }
    }

    /// First trust signal, or [`DEFAULT_TRUST_SIGNAL`].
    #[must_use]
    pub fn primary_trust_signal(&self) -> &str {
        self.trust_signals
            .first()
            .map_or(DEFAULT_TRUST_SIGNAL, String::as_str)
    }
}

/// Order candidate activities for a profile.
///
/// Implementations must be deterministic and must keep the input order for
/// equal scores. They are `Send + Sync` so a single ranker can serve
/// concurrent requests.
///
/// # Examples
/// ```
/// use tripweaver_core::{Activity, FallbackRanker, Ranker, UserProfile};
///
/// let candidates = vec![
///     Activity::new("Quiet Cafe").with_rating(3.0),
///     Activity::new("Famous Bistro").with_rating(4.8).with_review_count(900),
/// ];
/// let ranked = FallbackRanker.rank(&UserProfile::default(), &candidates, 1);
/// assert_eq!(ranked[0].activity.name, "Famous Bistro");
/// ```
pub trait Ranker: Send + Sync {
    /// Return at most `top_n` scored candidates, best first.
    fn rank(
        &self,
        profile: &UserProfile,
        candidates: &[Activity],
        top_n: usize,
    ) -> Vec<RecommendationScore>;
}

/// Sort descending by score, keeping input order for ties, and truncate.
pub fn sort_and_truncate(scores: &mut Vec<RecommendationScore>, top_n: usize) {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores.truncate(top_n);
}

/// Heuristic ranker based on rating, review volume and tag breadth.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackRanker;

impl FallbackRanker {
    /// Heuristic score for one activity.
    #[must_use]
    pub fn score(activity: &Activity) -> f64 {
        let mut score = activity.rating * 0.3;
        if activity.review_count > 100 {
            score += 0.2;
        }
        if activity.types.len() > 1 {
            score += 0.1;
        }
        score
    }
}

impl Ranker for FallbackRanker {
    fn rank(
        &self,
        _profile: &UserProfile,
        candidates: &[Activity],
        top_n: usize,
    ) -> Vec<RecommendationScore> {
        let mut scores: Vec<_> = candidates
            .iter()
            .map(|a| RecommendationScore::new(a.clone(), Self::score(a), ScoreSource::Fallback))
            .collect();
        sort_and_truncate(&mut scores, top_n);
        scores
    }
}
