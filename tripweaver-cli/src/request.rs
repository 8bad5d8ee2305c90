//! JSON request envelope.
//!
//! A request is one JSON object naming exactly one operation as a key (its
//! value is ignored) with the operation's fields alongside it:
//!
//! ```json
//! {"health_score": true, "itinerary": {"days": []}, "user_profile": {}}
//! ```

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tripweaver_core::{Activity, Itinerary, UserProfile};
use tripweaver_planner::{Tip, WeatherForecast};

/// Message returned when no operation key is present.
pub const INVALID_REQUEST: &str = "Invalid request. Use \"train\", \"recommend\", \"explain\", \
     \"summary\", \"health_score\", \"auto_optimize\", \"proactive_tips\", \"apply_tip\", or \"info\"";

const OPERATIONS: [&str; 9] = [
    "train",
    "recommend",
    "explain",
    "summary",
    "health_score",
    "auto_optimize",
    "proactive_tips",
    "apply_tip",
    "info",
];

const DEFAULT_TOP_N: usize = 5;

/// Problems with the request envelope or its payload.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request was not a JSON object or named no operation.
    #[error("{}", INVALID_REQUEST)]
    NoOperation,
    /// More than one operation key was present.
    #[error("request names several operations: {}", .0.join(", "))]
    Ambiguous(Vec<&'static str>),
    /// Payload fields were missing or malformed.
    #[error("invalid {operation} request: {source}")]
    Payload {
        /// Operation being decoded.
        operation: &'static str,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
}

/// Fields of a `train` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainRequest {
    /// Training corpus.
    pub activities: Vec<Activity>,
    /// Fit even when a fresh artefact exists.
    #[serde(default)]
    pub force_retrain: bool,
}

/// Fields of a `recommend` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecommendRequest {
    /// Traveller preferences.
    pub user_profile: UserProfile,
    /// Candidates to rank.
    pub activities: Vec<Activity>,
    /// Maximum number of results.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Destination for collaborative blending, when aggregates are configured.
    #[serde(default)]
    pub destination: Option<String>,
}

/// Model scores attached to an explanation request.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DecisionFactors {
    /// Relevance reported by the ranker.
    pub ml_score: Option<f64>,
}

/// Fields of an `explain` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExplainRequest {
    /// Activity to explain.
    pub activity: Activity,
    /// Traveller preferences.
    pub user_profile: UserProfile,
    /// Optional model scores.
    #[serde(default)]
    pub decision_factors: DecisionFactors,
    /// Destination for a collaborative explanation.
    #[serde(default)]
    pub destination: Option<String>,
}

/// Fields of a `summary` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryRequest {
    /// Traveller preferences.
    pub user_profile: UserProfile,
    /// Destination name.
    pub destination: String,
    /// Number of scheduled activities.
    pub total_activities: usize,
    /// Number of data points behind the recommendations.
    #[serde(default)]
    pub data_points: Option<u64>,
}

/// Fields of a `health_score` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthRequest {
    /// Itinerary to grade.
    pub itinerary: Itinerary,
    /// Traveller preferences.
    pub user_profile: UserProfile,
}

/// Fields of an `auto_optimize` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptimizeRequest {
    /// Itinerary to improve.
    pub itinerary: Itinerary,
    /// Traveller preferences.
    pub user_profile: UserProfile,
    /// Replacement pool.
    pub available_activities: Vec<Activity>,
    /// Override for the number of swap attempts.
    #[serde(default)]
    pub max_iterations: Option<usize>,
}

/// Fields of a `proactive_tips` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TipsRequest {
    /// Itinerary to scan.
    pub itinerary: Itinerary,
    /// Traveller preferences.
    pub user_profile: UserProfile,
    /// Per-day forecast keyed by date.
    #[serde(default)]
    pub weather_forecast: Option<WeatherForecast>,
}

/// Fields of an `apply_tip` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApplyTipRequest {
    /// Itinerary to annotate.
    pub itinerary: Itinerary,
    /// Traveller preferences.
    pub user_profile: UserProfile,
    /// Tip to apply.
    pub tip: Tip,
}

/// A decoded request.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Fit or reuse the embedding pipeline.
    Train(TrainRequest),
    /// Rank candidates.
    Recommend(RecommendRequest),
    /// Explain one recommendation.
    Explain(ExplainRequest),
    /// Summarise an itinerary.
    Summary(SummaryRequest),
    /// Grade an itinerary.
    HealthScore(HealthRequest),
    /// Improve an itinerary.
    AutoOptimize(OptimizeRequest),
    /// Scan an itinerary for tips.
    ProactiveTips(TipsRequest),
    /// Apply a tip.
    ApplyTip(ApplyTipRequest),
    /// Report model status.
    Info,
}

const fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn payload<T: DeserializeOwned>(operation: &'static str, fields: Map<String, Value>) -> Result<T, RequestError> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|source| RequestError::Payload { operation, source })
}

impl Request {
    /// Decode a request envelope.
    ///
    /// # Errors
    /// Returns [`RequestError::NoOperation`] when `value` is not an object or
    /// names no operation, [`RequestError::Ambiguous`] when it names several,
    /// and [`RequestError::Payload`] when the operation's fields are invalid.
    pub fn from_value(value: Value) -> Result<Self, RequestError> {
        let Value::Object(fields) = value else {
            return Err(RequestError::NoOperation);
        };
        let named: Vec<&'static str> = OPERATIONS
            .into_iter()
            .filter(|op| fields.contains_key(*op))
            .collect();
        let operation = match named.as_slice() {
            [] => return Err(RequestError::NoOperation),
            [only] => *only,
            _ => return Err(RequestError::Ambiguous(named)),
        };
        Ok(match operation {
            "train" => Self::Train(payload(operation, fields)?),
            "recommend" => Self::Recommend(payload(operation, fields)?),
            "explain" => Self::Explain(payload(operation, fields)?),
            "summary" => Self::Summary(payload(operation, fields)?),
            "health_score" => Self::HealthScore(payload(operation, fields)?),
            "auto_optimize" => Self::AutoOptimize(payload(operation, fields)?),
            "proactive_tips" => Self::ProactiveTips(payload(operation, fields)?),
            "apply_tip" => Self::ApplyTip(payload(operation, fields)?),
            _ => Self::Info,
        })
    }

    /// Operation key of this request.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Train(_) => "train",
            Self::Recommend(_) => "recommend",
            Self::Explain(_) => "explain",
            Self::Summary(_) => "summary",
            Self::HealthScore(_) => "health_score",
            Self::AutoOptimize(_) => "auto_optimize",
            Self::ProactiveTips(_) => "proactive_tips",
            Self::ApplyTip(_) => "apply_tip",
            Self::Info => "info",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn missing_operation_uses_usage_message() {
        let err = Request::from_value(json!({"itinerary": {}})).expect_err("no operation");
        assert_eq!(err.to_string(), INVALID_REQUEST);
    }

    #[rstest]
    fn non_object_is_rejected() {
        let err = Request::from_value(json!([1, 2])).expect_err("not an object");
        assert!(matches!(err, RequestError::NoOperation));
    }

    #[rstest]
    fn two_operations_are_ambiguous() {
        let err = Request::from_value(json!({"info": true, "train": true, "activities": []}))
            .expect_err("ambiguous");
        assert_eq!(
            err.to_string(),
            "request names several operations: train, info"
        );
    }

    #[rstest]
    fn recommend_defaults_top_n() {
        let request = Request::from_value(json!({
            "recommend": true,
            "user_profile": {"interests": ["food"]},
            "activities": [{"name": "Tasca"}]
        }))
        .expect("valid request");
        let Request::Recommend(recommend) = request else {
            panic!("expected recommend");
        };
        assert_eq!(recommend.top_n, 5);
        assert!(recommend.destination.is_none());
    }

    #[rstest]
    fn missing_payload_field_names_operation() {
        let err = Request::from_value(json!({"health_score": true, "user_profile": {}}))
            .expect_err("itinerary missing");
        assert!(matches!(
            err,
            RequestError::Payload {
                operation: "health_score",
                ..
            }
        ));
    }

    #[rstest]
    #[case(json!({"info": null}), "info")]
    #[case(json!({"train": 1, "activities": [], "force_retrain": true}), "train")]
    fn operation_round_trips(#[case] wire: Value, #[case] expected: &str) {
        let request = Request::from_value(wire).expect("valid request");
        assert_eq!(request.operation(), expected);
    }
}
