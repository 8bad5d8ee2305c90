//! Read-only access to the anonymised aggregate tables.
//!
//! The tables are produced out-of-band by a nightly aggregation job; the
//! engine only reads them. [`AggregateStore`] is the seam, with an in-memory
//! adapter for embedding and tests and a `SQLite` adapter behind the
//! `store-sqlite` feature.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod memory;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::MemoryAggregateStore;
#[cfg(feature = "store-sqlite")]
pub use sqlite::SqliteAggregateStore;

/// Destination value shared by segment lists that apply everywhere.
pub const GLOBAL_DESTINATION: &str = "global";

/// One anonymised profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousProfile {
    /// Hash produced by [`crate::profile_hash`].
    pub profile_hash: String,
    /// Travel style label.
    pub travel_style: String,
    /// Budget label.
    pub budget_level: String,
    /// Pace label.
    pub pace: String,
}

/// Cohort lookup key: the caller's hash plus the attributes shared by
/// similar cohorts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileQuery {
    /// The caller's anonymised hash.
    pub profile_hash: String,
    /// Travel style label.
    pub travel_style: String,
    /// Budget label.
    pub budget_level: String,
    /// Pace label.
    pub pace: String,
}

/// Aggregated rating of one activity by one cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRating {
    /// Cohort hash.
    pub profile_hash: String,
    /// Activity identifier.
    pub activity_id: String,
    /// Display name.
    pub activity_name: String,
    /// Primary category tag.
    pub activity_category: String,
    /// Destination the rating applies to.
    pub destination: String,
    /// Mean rating on the 0–5 scale.
    pub average_rating: f64,
    /// Number of ratings aggregated.
    pub rating_count: u32,
    /// Popularity in `0..=1`.
    pub popularity_score: f64,
    /// Price tier 0–4.
    pub price_level: u8,
}

/// A trending activity at a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingActivity {
    /// Activity identifier.
    pub activity_id: String,
    /// Display name.
    pub activity_name: String,
    /// Primary category tag.
    pub activity_category: String,
    /// Destination.
    pub destination: String,
    /// Trend strength in `0..=1`.
    pub trend_score: f64,
    /// Recent growth ratio.
    #[serde(default)]
    pub growth_rate: f64,
    /// One-based rank at the destination.
    pub popularity_rank: u32,
    /// Season label, when the trend is seasonal.
    #[serde(default)]
    pub seasonality: Option<String>,
}

/// Top activities for a traveller segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentTopList {
    /// Segment name, e.g. `"Foodies"`.
    pub segment_name: String,
    /// Destination, or [`GLOBAL_DESTINATION`].
    pub destination: String,
    /// Activity identifiers, best first.
    pub top_activities: Vec<String>,
}

/// Co-occurrence of two activities in anonymised itineraries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityCorrelation {
    /// First activity identifier.
    pub activity_id_1: String,
    /// Second activity identifier.
    pub activity_id_2: String,
    /// Destination.
    pub destination: String,
    /// Correlation strength.
    pub correlation_score: f64,
    /// Number of itineraries containing both.
    pub co_occurrence_count: u32,
}

impl ActivityCorrelation {
    /// The activity paired with `activity_id`, if this row contains it.
    #[must_use]
    pub fn partner_of(&self, activity_id: &str) -> Option<&str> {
        if self.activity_id_1 == activity_id {
            Some(&self.activity_id_2)
        } else if self.activity_id_2 == activity_id {
            Some(&self.activity_id_1)
        } else {
            None
        }
    }
}

/// Errors raised by aggregate store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening the `SQLite` database failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to open aggregate database at {path}: {source}")]
    OpenDatabase {
        /// Location of the database.
        path: String,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A query failed.
    #[cfg(feature = "store-sqlite")]
    #[error("aggregate query `{operation}` failed: {source}")]
    Query {
        /// Which lookup was running.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A stored JSON column could not be decoded.
    #[error("failed to decode {column}: {source}")]
    Decode {
        /// Column holding the payload.
        column: &'static str,
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// The store cannot serve requests.
    #[error("aggregate store unavailable: {reason}")]
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
}

/// Read-only queries over the anonymised aggregates.
///
/// Every method returns rows in the order documented on it; callers rely on
/// that order for tie-breaking.
#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// Hashes equal to the caller's or sharing its travel style, budget
    /// level and pace, in store order, at most `limit`.
    async fn similar_profiles(
        &self,
        query: &ProfileQuery,
        limit: usize,
    ) -> Result<Vec<String>, StoreError>;

    /// Ratings by any of `profile_hashes` at `destination`, ordered by
    /// rating then popularity, both descending, at most `limit`.
    async fn ratings_by_profiles(
        &self,
        profile_hashes: &[String],
        destination: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRating>, StoreError>;

    /// First rating row for `activity_id` at `destination`.
    async fn activity_rating(
        &self,
        activity_id: &str,
        destination: &str,
    ) -> Result<Option<ActivityRating>, StoreError>;

    /// Trending rows at `destination` ordered by trend score descending,
    /// then rank ascending, at most `limit`.
    async fn trending(
        &self,
        destination: &str,
        limit: usize,
    ) -> Result<Vec<TrendingActivity>, StoreError>;

    /// Segment lists named in `segments` for `destination` or
    /// [`GLOBAL_DESTINATION`], in store order.
    async fn segment_lists(
        &self,
        segments: &[String],
        destination: &str,
    ) -> Result<Vec<SegmentTopList>, StoreError>;

    /// Correlations involving `activity_id` at `destination`, strongest
    /// first, at most `limit`.
    async fn correlations(
        &self,
        activity_id: &str,
        destination: &str,
        limit: usize,
    ) -> Result<Vec<ActivityCorrelation>, StoreError>;
}
