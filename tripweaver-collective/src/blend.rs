//! Weighted merge of the collaborative sources and the content merge.

use std::collections::HashMap;

use tripweaver_core::{
    Activity, ExplanationFactors, RecommendationScore, ScoreSource, sort_and_truncate,
};

use crate::trust::trust_signals;

/// Which aggregate produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectiveSource {
    /// Ratings by similar cohorts.
    SimilarProfiles,
    /// Destination trend list.
    Trending,
    /// Segment top lists.
    Segment,
}

impl CollectiveSource {
    /// Name used in log records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SimilarProfiles => "similar_profiles",
            Self::Trending => "trending",
            Self::Segment => "segment",
        }
    }
}

/// One candidate from one aggregate source.
///
/// Optional fields are only known to some sources: trending rows carry no
/// rating, and segment rows carry no popularity or price.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectiveCandidate {
    /// Activity identifier.
    pub activity_id: String,
    /// Display name.
    pub activity_name: String,
    /// Primary category tag.
    pub activity_category: String,
    /// Mean rating, when known.
    pub average_rating: Option<f64>,
    /// Number of ratings, when known.
    pub rating_count: Option<u32>,
    /// Popularity in `0..=1`, when known.
    pub popularity_score: Option<f64>,
    /// Price tier, when known.
    pub price_level: Option<u8>,
    /// Trend strength, when known.
    pub trend_score: Option<f64>,
    /// Source-specific score before weighting.
    pub collective_score: f64,
    /// Badge contributed by the source.
    pub signal: Option<String>,
    /// Segment whose top list produced the candidate.
    pub segment: Option<String>,
}

/// Per-source blend weights. They are applied as given and never
/// renormalised, so an activity found by a single source keeps that
/// source's weighted score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    /// Weight of the similar-profile score.
    pub similar_profiles: f64,
    /// Weight of the trend score.
    pub trending: f64,
    /// Weight of the segment score.
    pub segment: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            similar_profiles: 0.5,
            trending: 0.3,
            segment: 0.2,
        }
    }
}

impl BlendWeights {
    /// Weight for `source`.
    #[must_use]
    pub const fn weight(&self, source: CollectiveSource) -> f64 {
        match source {
            CollectiveSource::SimilarProfiles => self.similar_profiles,
            CollectiveSource::Trending => self.trending,
            CollectiveSource::Segment => self.segment,
        }
    }
}

/// Weights for merging collaborative and content-based scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentWeights {
    /// Weight of the blended collaborative score.
    pub collective: f64,
    /// Weight of the content similarity.
    pub content: f64,
}

impl Default for ContentWeights {
    fn default() -> Self {
        Self {
            collective: 0.7,
            content: 0.3,
        }
    }
}

/// A candidate after blending.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendedCandidate {
    /// Metadata from the first source that returned the activity.
    pub candidate: CollectiveCandidate,
    /// Sum of weighted source scores.
    pub final_score: f64,
    /// Segments that contributed, in order.
    pub segments: Vec<String>,
}

impl BlendedCandidate {
    /// Convert into a scored recommendation with trust signals attached.
    #[must_use]
    pub fn into_score(self) -> RecommendationScore {
        let signals = trust_signals(&self.candidate);
        let c = self.candidate;
        let mut activity = Activity::new(c.activity_name)
            .with_id(c.activity_id)
            .with_rating(c.average_rating.unwrap_or_default())
            .with_price_level(c.price_level.unwrap_or_default())
            .with_review_count(c.rating_count.unwrap_or_default());
        if !c.activity_category.is_empty() {
            activity = activity.with_types([c.activity_category]);
        }
        let mut score = RecommendationScore::new(activity, self.final_score, ScoreSource::Collective);
        score.factors = Some(ExplanationFactors {
            collective_score: Some(self.final_score),
            segments: self.segments,
            ..ExplanationFactors::default()
        });
        score.trust_signals = signals;
        score
    }
}

/// Merge the three source lists by activity id.
///
/// The first record seen for an id supplies the metadata; every occurrence
/// adds its weighted score. The result is sorted by final score, highest
/// first, keeping first-seen order for ties.
#[must_use]
pub fn blend_sources(
    sources: [(CollectiveSource, Vec<CollectiveCandidate>); 3],
    weights: &BlendWeights,
) -> Vec<BlendedCandidate> {
    let mut merged: Vec<BlendedCandidate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (source, candidates) in sources {
        let weight = weights.weight(source);
        for candidate in candidates {
            let contribution = candidate.collective_score * weight;
            let segment = candidate.segment.clone();
            let next = merged.len();
            let slot = *index
                .entry(candidate.activity_id.clone())
                .or_insert(next);
            if slot == next {
                merged.push(BlendedCandidate {
                    candidate,
                    final_score: 0.0,
                    segments: Vec::new(),
                });
            }
            if let Some(entry) = merged.get_mut(slot) {
                entry.final_score += contribution;
                if let Some(segment) = segment
                    && !entry.segments.contains(&segment)
                {
                    entry.segments.push(segment);
                }
            }
        }
    }
    merged.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    merged
}

fn merge_key(score: &RecommendationScore) -> &str {
    score
        .activity
        .id
        .as_deref()
        .unwrap_or(score.activity.name.as_str())
}

/// Merge collaborative recommendations with content-based ones.
///
/// Collaborative scores are scaled by `weights.collective`. A content score
/// for the same activity adds `weights.content` times its value and marks
/// the entry [`ScoreSource::Blended`]; content-only entries get the scaled
/// content score alone. Activities are matched by id, or by name when the
/// id is missing.
#[must_use]
pub fn merge_with_content(
    collective: Vec<RecommendationScore>,
    content: &[RecommendationScore],
    weights: ContentWeights,
    limit: usize,
) -> Vec<RecommendationScore> {
    let mut merged: Vec<RecommendationScore> = Vec::with_capacity(collective.len() + content.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for mut rec in collective {
        let factors = rec.factors.get_or_insert_with(ExplanationFactors::default);
        factors.collective_score.get_or_insert(rec.score);
        rec.score *= weights.collective;
        rec.source = ScoreSource::Collective;
        let key = merge_key(&rec).to_owned();
        if let Some(&slot) = index.get(&key) {
            if let Some(existing) = merged.get_mut(slot) {
                *existing = rec;
            }
        } else {
            index.insert(key, merged.len());
            merged.push(rec);
        }
    }

    for rec in content {
        let contribution = rec.score * weights.content;
        if let Some(existing) = index.get(merge_key(rec)).and_then(|&slot| merged.get_mut(slot)) {
            existing.score += contribution;
            existing.source = ScoreSource::Blended;
            existing
                .factors
                .get_or_insert_with(ExplanationFactors::default)
                .content_score = Some(rec.score);
        } else {
            let mut entry = rec.clone();
            entry.score = contribution;
            entry.source = ScoreSource::Content;
            entry
                .factors
                .get_or_insert_with(ExplanationFactors::default)
                .content_score = Some(rec.score);
            index.insert(merge_key(&entry).to_owned(), merged.len());
            merged.push(entry);
        }
    }

    sort_and_truncate(&mut merged, limit);
    merged
}
