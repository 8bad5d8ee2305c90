//! Collaborative recommendations from anonymised aggregates.
//!
//! A traveller is reduced to a [`profile_hash`] over six coarse attributes.
//! [`CollectiveBlender`] then reads three sources from an
//! [`AggregateStore`] concurrently (ratings by similar cohorts, destination
//! trends and segment top lists), blends them with fixed weights, and
//! attaches trust signals. Results can be merged with content-based scores.
//!
//! ```no_run
//! use tripweaver_collective::{CollectiveBlender, MemoryAggregateStore};
//! use tripweaver_core::UserProfile;
//!
//! # async fn demo() {
//! let blender = CollectiveBlender::new(MemoryAggregateStore::new());
//! let recs = blender.recommend(&UserProfile::default(), "Lisbon", 10).await;
//! assert!(recs.is_empty());
//! # }
//! ```
#![forbid(unsafe_code)]

mod blend;
mod blender;
mod explain;
mod hash;
mod segments;
pub mod store;
mod trust;

pub use blend::{
    BlendWeights, BlendedCandidate, CollectiveCandidate, CollectiveSource, ContentWeights,
    blend_sources, merge_with_content,
};
pub use blender::{CollectiveBlender, CollectiveConfig, CorrelatedActivity};
pub use explain::{
    DEFAULT_COLLECTIVE_EXPLANATION, UNAVAILABLE_EXPLANATION, UNKNOWN_ACTIVITY_EXPLANATION,
    collective_explanation,
};
pub use hash::{CoarseProfile, profile_hash};
pub use segments::{
    ADVENTURE_SEEKERS, BUDGET_BACKPACKERS, CULTURAL_EXPLORERS, FOODIES, LUXURY_TRAVELERS,
    user_segments,
};
#[cfg(feature = "store-sqlite")]
pub use store::SqliteAggregateStore;
pub use store::{AggregateStore, MemoryAggregateStore, StoreError};
pub use trust::trust_signals;
