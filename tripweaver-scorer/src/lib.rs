//! Content-based scoring for TripWeaver activities.
//!
//! The crate provides three capabilities:
//! - **Embedding pipeline** fitting, persistence and freshness checks. A
//!   fitted [`EmbeddingPipeline`] maps activities to fixed-width embeddings
//!   (one-hot category, z-scored numeric features, TF-IDF tag weights) and is
//!   saved as a `bincode` blob with a JSON metadata sidecar.
//! - **Similarity ranking** of candidates against a traveller's preference
//!   vector with deterministic multiplicative boosts. [`SimilarityRanker`]
//!   implements [`Ranker`](tripweaver_core::Ranker) and falls back to the
//!   heuristic ranker whenever no pipeline is published or scoring fails.
//! - **Explanations** and itinerary summaries in plain language.
//!
//! # Examples
//!
//! ```no_run
//! use tripweaver_core::{Ranker, test_support::{culture_food_profile, museum_restaurant_park}};
//! use tripweaver_scorer::{PipelineHandle, ScorerConfig};
//!
//! let handle = PipelineHandle::new(ScorerConfig::default());
//! let corpus = museum_restaurant_park();
//! handle.train(&corpus, false).expect("train pipeline");
//! let ranked = handle.ranker().rank(&culture_food_profile(), &corpus, 2);
//! assert_eq!(ranked.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod explain;
mod handle;
pub mod pipeline;
mod similarity;

pub use error::PipelineError;
pub use explain::{
    ItinerarySummary, explain_recommendation, group_thousands, summarize_itinerary, title_case,
};
pub use handle::{ModelInfo, PipelineHandle, ScorerConfig, TrainOutcome, TrainStatus};
pub use pipeline::{ArtifactMetadata, Embedding, EmbeddingPipeline};
pub use similarity::{
    INTEREST_COLUMNS, SimilarityError, SimilarityRanker, cosine_similarity, matched_interests,
    preference_multiplier, preference_vector,
};

#[cfg(test)]
mod tests;
