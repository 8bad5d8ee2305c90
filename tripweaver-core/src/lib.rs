//! Core domain types for the TripWeaver personalisation engine.
//!
//! The crate holds the typed records exchanged between components
//! (activities, profiles, itineraries, recommendation scores), the pure
//! feature extractor, and the [`Ranker`] seam with its heuristic fallback.
//! Nothing here performs I/O.

mod activity;
mod features;
mod itinerary;
mod profile;
mod ranker;

pub use activity::Activity;
pub use features::{
    CULTURAL_TYPES, ENTERTAINMENT_TYPES, FOOD_TYPES, FeatureVector, NUMERIC_FEATURES,
    OUTDOOR_TYPES, SHOPPING_TYPES,
};
pub use itinerary::{ActivityInstance, DEFAULT_VISIT_HOURS, Day, Itinerary, VisitDuration};
pub use profile::{MAX_BUDGET_TIER, MIN_BUDGET_TIER, Pace, ProfileError, UserProfile};
pub use ranker::{
    DEFAULT_TRUST_SIGNAL, ExplanationFactors, FallbackRanker, Ranker, RecommendationScore,
    ScoreSource, sort_and_truncate,
};

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
