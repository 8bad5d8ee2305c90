//! Concurrent source fetches and the collaborative recommendation entry
//! points.

use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use tripweaver_core::{RecommendationScore, UserProfile};

use crate::{
    blend::{
        BlendWeights, BlendedCandidate, CollectiveCandidate, CollectiveSource, ContentWeights,
        blend_sources, merge_with_content,
    },
    explain::{UNAVAILABLE_EXPLANATION, collective_explanation},
    hash::CoarseProfile,
    segments::user_segments,
    store::{AggregateStore, ProfileQuery, StoreError},
};

const LOG_TARGET: &str = "tripweaver::collective";
const CORRELATION_SIGNAL: &str = "Often enjoyed together";

/// Tunables for [`CollectiveBlender`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectiveConfig {
    /// Upper bound on each store fetch.
    pub fetch_timeout: Duration,
    /// Maximum number of similar cohorts consulted.
    pub profile_pool: usize,
    /// Per-source blend weights.
    pub weights: BlendWeights,
    /// Weights for the content merge.
    pub content_weights: ContentWeights,
}

impl Default for CollectiveConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(2),
            profile_pool: 50,
            weights: BlendWeights::default(),
            content_weights: ContentWeights::default(),
        }
    }
}

/// An activity often found in the same itineraries as another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedActivity {
    /// Identifier of the paired activity.
    pub activity_id: String,
    /// Display name.
    pub activity_name: String,
    /// Primary category tag.
    pub activity_category: String,
    /// Correlation strength.
    pub correlation_score: f64,
    /// Number of itineraries containing both.
    pub co_occurrence_count: u32,
    /// Badge for display.
    pub trust_signal: String,
}

/// Recommends activities from anonymised aggregates.
///
/// Each source fetch is bounded by [`CollectiveConfig::fetch_timeout`]; a
/// failed or late source contributes nothing and the others still count.
#[derive(Debug, Clone)]
pub struct CollectiveBlender<S> {
    store: S,
    config: CollectiveConfig,
}

impl<S: AggregateStore> CollectiveBlender<S> {
    /// Blender with default configuration.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_config(store, CollectiveConfig::default())
    }

    /// Blender with explicit configuration.
    #[must_use]
    pub const fn with_config(store: S, config: CollectiveConfig) -> Self {
        Self { store, config }
    }

    /// Underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CollectiveConfig {
        &self.config
    }

    /// Up to `limit` collaborative recommendations for `profile` at
    /// `destination`, best first, with trust signals attached.
    pub async fn recommend(
        &self,
        profile: &UserProfile,
        destination: &str,
        limit: usize,
    ) -> Vec<RecommendationScore> {
        let coarse = CoarseProfile::from_profile(profile);
        let profile_hash = match coarse.digest() {
            Ok(hash) => hash,
            Err(err) => {
                log::warn!(target: LOG_TARGET, "cannot hash profile: {err}");
                return Vec::new();
            }
        };
        let query = ProfileQuery {
            profile_hash,
            travel_style: coarse.travel_style,
            budget_level: coarse.budget_level,
            pace: coarse.pace,
        };
        let half = limit / 2;
        let timeout = self.config.fetch_timeout;

        let (similar, trending, segment) = tokio::join!(
            guarded(
                CollectiveSource::SimilarProfiles.as_str(),
                timeout,
                self.similar_profile_candidates(&query, destination, limit),
            ),
            guarded(
                CollectiveSource::Trending.as_str(),
                timeout,
                self.trending_candidates(destination, half),
            ),
            guarded(
                CollectiveSource::Segment.as_str(),
                timeout,
                self.segment_candidates(profile, destination, half),
            ),
        );
        log::debug!(
            target: LOG_TARGET,
            destination = destination;
            "fetched {} similar, {} trending and {} segment candidates",
            similar.len(),
            trending.len(),
            segment.len()
        );

        let mut recommendations: Vec<_> = blend_sources(
            [
                (CollectiveSource::SimilarProfiles, similar),
                (CollectiveSource::Trending, trending),
                (CollectiveSource::Segment, segment),
            ],
            &self.config.weights,
        )
        .into_iter()
        .map(BlendedCandidate::into_score)
        .collect();
        recommendations.truncate(limit);
        recommendations
    }

    /// Collaborative recommendations merged with content-based scores.
    ///
    /// See [`merge_with_content`] for the weighting.
    pub async fn recommend_with_content(
        &self,
        profile: &UserProfile,
        destination: &str,
        content: &[RecommendationScore],
        limit: usize,
    ) -> Vec<RecommendationScore> {
        let collective = self.recommend(profile, destination, limit).await;
        merge_with_content(collective, content, self.config.content_weights, limit)
    }

    /// Activities often enjoyed together with `activity_id`, strongest first.
    pub async fn correlated(
        &self,
        activity_id: &str,
        destination: &str,
        limit: usize,
    ) -> Vec<CorrelatedActivity> {
        let fetch = async {
            let rows = self
                .store
                .correlations(activity_id, destination, limit)
                .await?;
            let mut correlated = Vec::with_capacity(rows.len());
            for row in rows {
                let Some(partner) = row.partner_of(activity_id) else {
                    continue;
                };
                if let Some(details) = self.store.activity_rating(partner, destination).await? {
                    correlated.push(CorrelatedActivity {
                        activity_id: partner.to_owned(),
                        activity_name: details.activity_name,
                        activity_category: details.activity_category,
                        correlation_score: row.correlation_score,
                        co_occurrence_count: row.co_occurrence_count,
                        trust_signal: CORRELATION_SIGNAL.to_owned(),
                    });
                }
            }
            Ok::<_, StoreError>(correlated)
        };
        guarded("correlations", self.config.fetch_timeout, fetch).await
    }

    /// Human-readable reason for recommending `activity_id`.
    pub async fn explain(
        &self,
        activity_id: &str,
        profile: &UserProfile,
        destination: &str,
    ) -> String {
        let lookup = tokio::time::timeout(
            self.config.fetch_timeout,
            self.store.activity_rating(activity_id, destination),
        )
        .await;
        match lookup {
            Ok(Ok(rating)) => collective_explanation(rating.as_ref(), profile),
            Ok(Err(err)) => {
                log::warn!(target: LOG_TARGET, "explanation lookup failed: {err}");
                UNAVAILABLE_EXPLANATION.to_owned()
            }
            Err(_) => {
                log::warn!(target: LOG_TARGET, "explanation lookup timed out");
                UNAVAILABLE_EXPLANATION.to_owned()
            }
        }
    }

    async fn similar_profile_candidates(
        &self,
        query: &ProfileQuery,
        destination: &str,
        limit: usize,
    ) -> Result<Vec<CollectiveCandidate>, StoreError> {
        let hashes = self
            .store
            .similar_profiles(query, self.config.profile_pool)
            .await?;
        if hashes.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self
            .store
            .ratings_by_profiles(&hashes, destination, limit.saturating_mul(2))
            .await?;

        // Per activity: mean of rating * 0.6 + popularity * 0.4.
        let mut candidates: Vec<(CollectiveCandidate, f64, u32)> = Vec::new();
        for row in rows {
            let contribution = row.average_rating * 0.6 + row.popularity_score * 0.4;
            if let Some((_, total, count)) = candidates
                .iter_mut()
                .find(|(c, _, _)| c.activity_id == row.activity_id)
            {
                *total += contribution;
                *count += 1;
                continue;
            }
            candidates.push((
                CollectiveCandidate {
                    activity_id: row.activity_id,
                    activity_name: row.activity_name,
                    activity_category: row.activity_category,
                    average_rating: Some(row.average_rating),
                    rating_count: Some(row.rating_count),
                    popularity_score: Some(row.popularity_score),
                    price_level: Some(row.price_level),
                    ..CollectiveCandidate::default()
                },
                contribution,
                1,
            ));
        }
        let mut candidates: Vec<_> = candidates
            .into_iter()
            .map(|(mut candidate, total, count)| {
                candidate.collective_score = total / f64::from(count);
                candidate
            })
            .collect();
        candidates.sort_by(|a, b| b.collective_score.total_cmp(&a.collective_score));
        candidates.truncate(limit);
        Ok(candidates)
    }

    async fn trending_candidates(
        &self,
        destination: &str,
        limit: usize,
    ) -> Result<Vec<CollectiveCandidate>, StoreError> {
        let rows = self.store.trending(destination, limit).await?;
        Ok(rows
            .into_iter()
            .map(|row| CollectiveCandidate {
                signal: Some(format!(
                    "Trending #{} in {destination}",
                    row.popularity_rank
                )),
                activity_id: row.activity_id,
                activity_name: row.activity_name,
                activity_category: row.activity_category,
                trend_score: Some(row.trend_score),
                collective_score: row.trend_score,
                ..CollectiveCandidate::default()
            })
            .collect())
    }

    async fn segment_candidates(
        &self,
        profile: &UserProfile,
        destination: &str,
        limit: usize,
    ) -> Result<Vec<CollectiveCandidate>, StoreError> {
        let segments = user_segments(profile);
        if segments.is_empty() {
            return Ok(Vec::new());
        }
        let per_segment = limit / segments.len();
        let lists = self.store.segment_lists(&segments, destination).await?;
        let mut candidates = Vec::new();
        for list in lists {
            for activity_id in list.top_activities.iter().take(per_segment) {
                let Some(details) = self.store.activity_rating(activity_id, destination).await?
                else {
                    continue;
                };
                candidates.push(CollectiveCandidate {
                    activity_id: activity_id.clone(),
                    activity_name: details.activity_name,
                    activity_category: details.activity_category,
                    average_rating: Some(details.average_rating),
                    rating_count: Some(details.rating_count),
                    collective_score: details.average_rating,
                    signal: Some(format!("Highly rated by {}", list.segment_name)),
                    segment: Some(list.segment_name.clone()),
                    ..CollectiveCandidate::default()
                });
            }
        }
        Ok(candidates)
    }
}

/// Run `fetch` under `timeout`; failures and timeouts yield an empty list.
async fn guarded<T, F>(source: &'static str, timeout: Duration, fetch: F) -> Vec<T>
where
    F: Future<Output = Result<Vec<T>, StoreError>>,
{
    match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(rows)) => rows,
        Ok(Err(err)) => {
            log::warn!(target: LOG_TARGET, source = source; "aggregate fetch failed: {err}");
            Vec::new()
        }
        Err(_) => {
            log::warn!(
                target: LOG_TARGET,
                source = source;
                "aggregate fetch exceeded {} ms",
                timeout.as_millis()
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{
        ActivityCorrelation, ActivityRating, AnonymousProfile, MemoryAggregateStore,
        SegmentTopList, TrendingActivity,
    };
    use crate::profile_hash;
    use async_trait::async_trait;
    use rstest::{fixture, rstest};
    use tripweaver_core::{Activity, ScoreSource};

    fn rating(hash: &str, id: &str, avg: f64, count: u32, popularity: f64) -> ActivityRating {
        ActivityRating {
            profile_hash: hash.into(),
            activity_id: id.into(),
            activity_name: id.to_uppercase(),
            activity_category: "museum".into(),
            destination: "Lisbon".into(),
            average_rating: avg,
            rating_count: count,
            popularity_score: popularity,
            price_level: 2,
        }
    }

    fn trend(id: &str, score: f64, rank: u32) -> TrendingActivity {
        TrendingActivity {
            activity_id: id.into(),
            activity_name: id.to_uppercase(),
            activity_category: "landmark".into(),
            destination: "Lisbon".into(),
            trend_score: score,
            growth_rate: 0.1,
            popularity_rank: rank,
            seasonality: None,
        }
    }

    #[fixture]
    fn profile() -> UserProfile {
        UserProfile::new().with_interests(["food"]).with_budget(2)
    }

    #[fixture]
    fn store(profile: UserProfile) -> MemoryAggregateStore {
        let own = profile_hash(&profile).expect("profile hash");
        MemoryAggregateStore::new()
            .with_profile(AnonymousProfile {
                profile_hash: own.clone(),
                travel_style: "unknown".into(),
                budget_level: "medium".into(),
                pace: "moderate".into(),
            })
            .with_profile(AnonymousProfile {
                profile_hash: "cousin".into(),
                travel_style: "unknown".into(),
                budget_level: "medium".into(),
                pace: "moderate".into(),
            })
            .with_profile(AnonymousProfile {
                profile_hash: "stranger".into(),
                travel_style: "luxury".into(),
                budget_level: "high".into(),
                pace: "fast".into(),
            })
            .with_rating(rating(&own, "tile_museum", 4.8, 120, 0.9))
            .with_rating(rating("cousin", "tile_museum", 4.4, 80, 0.7))
            .with_rating(rating("cousin", "tasca", 4.6, 60, 0.5))
            .with_rating(rating("stranger", "palace", 5.0, 500, 1.0))
            .with_trending(trend("tram_28", 0.9, 1))
            .with_trending(trend("castle", 0.6, 2))
            .with_segment(SegmentTopList {
                segment_name: "Foodies".into(),
                destination: "global".into(),
                top_activities: vec!["tasca".into(), "missing".into()],
            })
            .with_correlation(ActivityCorrelation {
                activity_id_1: "tasca".into(),
                activity_id_2: "tile_museum".into(),
                destination: "Lisbon".into(),
                correlation_score: 0.6,
                co_occurrence_count: 14,
            })
    }

    #[rstest]
    #[tokio::test]
    async fn blends_all_three_sources(store: MemoryAggregateStore, profile: UserProfile) {
        let blender = CollectiveBlender::new(store);
        let recs = blender.recommend(&profile, "Lisbon", 4).await;
        let ids: Vec<_> = recs
            .iter()
            .map(|r| r.activity.id.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(ids, ["tasca", "tile_museum", "tram_28", "castle"]);

        // tile_museum: mean(4.8*0.6+0.9*0.4, 4.4*0.6+0.7*0.4) * 0.5
        let museum = &recs[1];
        assert!((museum.score - ((3.24 + 2.92) / 2.0) * 0.5).abs() < 1e-9);
        // tasca: similar (4.6*0.6+0.5*0.4)*0.5 plus segment 4.6*0.2
        let tasca = &recs[0];
        assert!((tasca.score - (2.96 * 0.5 + 4.6 * 0.2)).abs() < 1e-9);
        assert_eq!(tasca.trust_signals, ["Excellent rating", "Popular choice"]);
        assert_eq!(
            tasca.factors.as_ref().map(|f| f.segments.clone()),
            Some(vec!["Foodies".to_owned()])
        );
        assert_eq!(recs[2].trust_signals, ["Trending #1 in Lisbon", "Trending now"]);
        assert!(recs.iter().all(|r| r.source == ScoreSource::Collective));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_destination_is_empty(store: MemoryAggregateStore, profile: UserProfile) {
        let blender = CollectiveBlender::new(store);
        assert!(blender.recommend(&profile, "Oslo", 10).await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn merges_content_scores(store: MemoryAggregateStore, profile: UserProfile) {
        let blender = CollectiveBlender::new(store);
        let content = [RecommendationScore::new(
            Activity::new("Tram 28").with_id("tram_28"),
            0.5,
            ScoreSource::Similarity,
        )];
        let recs = blender
            .recommend_with_content(&profile, "Lisbon", &content, 4)
            .await;
        let tram = recs
            .iter()
            .find(|r| r.activity.id.as_deref() == Some("tram_28"))
            .expect("tram present");
        assert_eq!(tram.source, ScoreSource::Blended);
        assert!((tram.score - (0.27 * 0.7 + 0.15)).abs() < 1e-9);
    }

    #[rstest]
    #[tokio::test]
    async fn resolves_correlated_partner(store: MemoryAggregateStore) {
        let blender = CollectiveBlender::new(store);
        let correlated = blender.correlated("tile_museum", "Lisbon", 5).await;
        assert_eq!(correlated.len(), 1);
        assert_eq!(correlated[0].activity_id, "tasca");
        assert_eq!(correlated[0].co_occurrence_count, 14);
        assert_eq!(correlated[0].trust_signal, "Often enjoyed together");
    }

    #[rstest]
    #[tokio::test]
    async fn explains_known_activity(store: MemoryAggregateStore, profile: UserProfile) {
        let blender = CollectiveBlender::new(store);
        let text = blender.explain("tile_museum", &profile, "Lisbon").await;
        assert_eq!(
            text,
            "Rated 4.8/5 by travellers like you • Loved by 120 travellers • Popular with Foodies"
        );
    }

    /// Store whose trending lookup never answers in time and whose segment
    /// lookup always fails.
    struct FlakyStore {
        inner: MemoryAggregateStore,
    }

    #[async_trait]
    impl AggregateStore for FlakyStore {
        async fn similar_profiles(
            &self,
            query: &ProfileQuery,
            limit: usize,
        ) -> Result<Vec<String>, StoreError> {
            self.inner.similar_profiles(query, limit).await
        }

        async fn ratings_by_profiles(
            &self,
            profile_hashes: &[String],
            destination: &str,
            limit: usize,
        ) -> Result<Vec<ActivityRating>, StoreError> {
            self.inner
                .ratings_by_profiles(profile_hashes, destination, limit)
                .await
        }

        async fn activity_rating(
            &self,
            activity_id: &str,
            destination: &str,
        ) -> Result<Option<ActivityRating>, StoreError> {
            self.inner.activity_rating(activity_id, destination).await
        }

        async fn trending(
            &self,
            destination: &str,
            limit: usize,
        ) -> Result<Vec<TrendingActivity>, StoreError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            self.inner.trending(destination, limit).await
        }

        async fn segment_lists(
            &self,
            _segments: &[String],
            _destination: &str,
        ) -> Result<Vec<SegmentTopList>, StoreError> {
            Err(StoreError::Unavailable {
                reason: "segment table offline".into(),
            })
        }

        async fn correlations(
            &self,
            _activity_id: &str,
            _destination: &str,
            _limit: usize,
        ) -> Result<Vec<ActivityCorrelation>, StoreError> {
            Err(StoreError::Unavailable {
                reason: "correlation table offline".into(),
            })
        }
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn late_and_failing_sources_degrade(store: MemoryAggregateStore, profile: UserProfile) {
        let blender = CollectiveBlender::new(FlakyStore { inner: store });
        let recs = blender.recommend(&profile, "Lisbon", 4).await;
        let ids: Vec<_> = recs
            .iter()
            .map(|r| r.activity.id.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(ids, ["tile_museum", "tasca"]);
        assert!((recs[1].score - 2.96 * 0.5).abs() < 1e-9);
        assert!(blender.correlated("tasca", "Lisbon", 5).await.is_empty());
    }
}
