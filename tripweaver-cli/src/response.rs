//! JSON response envelope.

use serde::Serialize;
use tripweaver_core::{Itinerary, RecommendationScore};
use tripweaver_planner::{HealthScore, OptimizationResult, Tip};
use tripweaver_scorer::{ItinerarySummary, ModelInfo};

/// Message attached to a successful `train` response that fitted a pipeline.
pub const TRAINED_MESSAGE: &str = "Model trained successfully";
/// Message attached to a `train` response that reused a saved pipeline.
pub const REUSED_MESSAGE: &str = "Model loaded from a recent save";

/// Envelope written for every request.
///
/// Serialises as `{"status": "success", ...}` with the operation's fields
/// inlined, or `{"status": "error", "message": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// The operation completed.
    Success(Outcome),
    /// The request was rejected or the operation failed.
    Error {
        /// What went wrong.
        message: String,
    },
}

impl Response {
    /// Error response carrying `message`.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Operation-specific body of a successful response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// Result of `train`.
    Trained {
        /// Whether a pipeline was fitted or reused.
        message: &'static str,
        /// Published model status.
        model_info: ModelInfo,
    },
    /// Result of `recommend`.
    Recommendations {
        /// Ranked activities, best first.
        recommendations: Vec<RecommendationScore>,
    },
    /// Result of `explain`.
    Explanation {
        /// Content-based explanation.
        explanation: String,
        /// Explanation from collaborative aggregates, when configured.
        #[serde(skip_serializing_if = "Option::is_none")]
        collective_explanation: Option<String>,
    },
    /// Result of `summary`.
    Summary {
        /// Itinerary summary.
        summary: ItinerarySummary,
    },
    /// Result of `health_score`.
    Health {
        /// Itinerary health.
        health_score: HealthScore,
    },
    /// Result of `auto_optimize`.
    Optimized {
        /// Improved itinerary and the swaps made.
        optimization_result: OptimizationResult,
    },
    /// Result of `proactive_tips`.
    Tips {
        /// Tips in detection order.
        proactive_tips: Vec<Tip>,
    },
    /// Result of `apply_tip`.
    TipApplied {
        /// Annotated copy of the itinerary.
        modified_itinerary: Itinerary,
        /// The tip that was applied.
        applied_tip: Tip,
    },
    /// Result of `info`.
    Info {
        /// Published model status.
        model_info: ModelInfo,
    },
}
