//! Facade crate for the TripWeaver personalisation engine.
//!
//! This crate re-exports the core domain types and exposes the scorer,
//! collaborative blender and itinerary planner behind feature flags.

#![forbid(unsafe_code)]

pub use tripweaver_core::{
    Activity, ActivityInstance, Day, ExplanationFactors, FallbackRanker, FeatureVector, Itinerary,
    Pace, ProfileError, Ranker, RecommendationScore, ScoreSource, UserProfile, VisitDuration,
};

#[cfg(feature = "scorer")]
pub use tripweaver_scorer::{
    EmbeddingPipeline, ItinerarySummary, ModelInfo, PipelineError, PipelineHandle, ScorerConfig,
    SimilarityRanker, TrainOutcome, TrainStatus, explain_recommendation, summarize_itinerary,
};

#[cfg(feature = "collective")]
pub use tripweaver_collective::{
    AggregateStore, CollectiveBlender, CollectiveConfig, CorrelatedActivity,
    MemoryAggregateStore, StoreError, profile_hash,
};

#[cfg(feature = "store-sqlite")]
pub use tripweaver_collective::SqliteAggregateStore;

#[cfg(feature = "planner")]
pub use tripweaver_planner::{
    AutoOptimizer, HealthScore, HealthStatus, OptimizationResult, OptimizerConfig, Tip, TipAction,
    WeatherForecast, apply_tip, assess_health, proactive_tips,
};

#[cfg(feature = "test-support")]
pub use tripweaver_core::test_support;
