//! In-memory aggregate store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    ActivityCorrelation, ActivityRating, AggregateStore, AnonymousProfile, GLOBAL_DESTINATION,
    ProfileQuery, SegmentTopList, StoreError, TrendingActivity,
};

/// Aggregate tables held in vectors.
///
/// Rows keep insertion order, which stands in for table order. The struct
/// deserialises from a JSON object with one array per table, so a snapshot
/// can be loaded from a fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryAggregateStore {
    /// `anonymous_user_profiles`.
    pub profiles: Vec<AnonymousProfile>,
    /// `anonymous_activity_ratings`.
    pub ratings: Vec<ActivityRating>,
    /// `anonymous_trending_activities`.
    pub trending: Vec<TrendingActivity>,
    /// `anonymous_user_segments`.
    pub segments: Vec<SegmentTopList>,
    /// `anonymous_activity_correlations`.
    pub correlations: Vec<ActivityCorrelation>,
}

impl MemoryAggregateStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a profile row.
    #[must_use]
    pub fn with_profile(mut self, profile: AnonymousProfile) -> Self {
        self.profiles.push(profile);
        self
    }

    /// Add a rating row.
    #[must_use]
    pub fn with_rating(mut self, rating: ActivityRating) -> Self {
        self.ratings.push(rating);
        self
    }

    /// Add a trending row.
    #[must_use]
    pub fn with_trending(mut self, trending: TrendingActivity) -> Self {
        self.trending.push(trending);
        self
    }

    /// Add a segment list.
    #[must_use]
    pub fn with_segment(mut self, segment: SegmentTopList) -> Self {
        self.segments.push(segment);
        self
    }

    /// Add a correlation row.
    #[must_use]
    pub fn with_correlation(mut self, correlation: ActivityCorrelation) -> Self {
        self.correlations.push(correlation);
        self
    }
}

#[async_trait]
impl AggregateStore for MemoryAggregateStore {
    async fn similar_profiles(
        &self,
        query: &ProfileQuery,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| {
                p.profile_hash == query.profile_hash
                    || (p.travel_style == query.travel_style
                        && p.budget_level == query.budget_level
                        && p.pace == query.pace)
            })
            .take(limit)
            .map(|p| p.profile_hash.clone())
            .collect())
    }

    async fn ratings_by_profiles(
        &self,
        profile_hashes: &[String],
        destination: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRating>, StoreError> {
        let mut rows: Vec<_> = self
            .ratings
            .iter()
            .filter(|r| r.destination == destination && profile_hashes.contains(&r.profile_hash))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.average_rating
                .total_cmp(&a.average_rating)
                .then_with(|| b.popularity_score.total_cmp(&a.popularity_score))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    async fn activity_rating(
        &self,
        activity_id: &str,
        destination: &str,
    ) -> Result<Option<ActivityRating>, StoreError> {
        Ok(self
            .ratings
            .iter()
            .find(|r| r.activity_id == activity_id && r.destination == destination)
            .cloned())
    }

    async fn trending(
        &self,
        destination: &str,
        limit: usize,
    ) -> Result<Vec<TrendingActivity>, StoreError> {
        let mut rows: Vec<_> = self
            .trending
            .iter()
            .filter(|t| t.destination == destination)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.trend_score
                .total_cmp(&a.trend_score)
                .then_with(|| a.popularity_rank.cmp(&b.popularity_rank))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    async fn segment_lists(
        &self,
        segments: &[String],
        destination: &str,
    ) -> Result<Vec<SegmentTopList>, StoreError> {
        Ok(self
            .segments
            .iter()
            .filter(|s| {
                segments.contains(&s.segment_name)
                    && (s.destination == destination || s.destination == GLOBAL_DESTINATION)
            })
            .cloned()
            .collect())
    }

    async fn correlations(
        &self,
        activity_id: &str,
        destination: &str,
        limit: usize,
    ) -> Result<Vec<ActivityCorrelation>, StoreError> {
        let mut rows: Vec<_> = self
            .correlations
            .iter()
            .filter(|c| c.destination == destination && c.partner_of(activity_id).is_some())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.correlation_score.total_cmp(&a.correlation_score));
        rows.truncate(limit);
        Ok(rows)
    }
}
