//! Request dispatch over the scorer, collective and planner crates.

use serde_json::Value;
use tripweaver_collective::{AggregateStore, CollectiveBlender, MemoryAggregateStore};
use tripweaver_core::{Ranker, RecommendationScore};
use tripweaver_planner::{AutoOptimizer, OptimizerConfig, apply_tip, assess_health, proactive_tips};
use tripweaver_scorer::{PipelineHandle, TrainStatus, explain_recommendation, summarize_itinerary};

use crate::request::{ExplainRequest, RecommendRequest, Request};
use crate::response::{Outcome, REUSED_MESSAGE, Response, TRAINED_MESSAGE};

const LOG_TARGET: &str = "tripweaver::engine";

/// Answers decoded requests.
///
/// Collaborative blending is only attempted when a blender is attached and
/// the request names a destination.
#[derive(Debug)]
pub struct Engine<S = MemoryAggregateStore> {
    pipeline: PipelineHandle,
    collective: Option<CollectiveBlender<S>>,
}

impl<S: AggregateStore> Engine<S> {
    /// Engine with content-based scoring only.
    #[must_use]
    pub const fn new(pipeline: PipelineHandle) -> Self {
        Self {
            pipeline,
            collective: None,
        }
    }

    /// Attach a collaborative blender.
    #[must_use]
    pub fn with_collective(mut self, blender: CollectiveBlender<S>) -> Self {
        self.collective = Some(blender);
        self
    }

    /// Decode and answer a raw JSON request.
    ///
    /// Malformed requests are answered with an error response.
    pub async fn handle_value(&self, value: Value) -> Response {
        match Request::from_value(value) {
            Ok(request) => self.handle(request).await,
            Err(err) => {
                log::warn!(target: LOG_TARGET, "rejected request: {err}");
                Response::error(err.to_string())
            }
        }
    }

    /// Answer a decoded request.
    pub async fn handle(&self, request: Request) -> Response {
        log::info!(target: LOG_TARGET, operation = request.operation(); "handling request");
        let outcome = match request {
            Request::Train(train) => {
                match self.pipeline.train(&train.activities, train.force_retrain) {
                    Ok(outcome) => Outcome::Trained {
                        message: match outcome.status {
                            TrainStatus::Trained => TRAINED_MESSAGE,
                            TrainStatus::Reused => REUSED_MESSAGE,
                        },
                        model_info: self.pipeline.info(),
                    },
                    Err(err) => {
                        log::warn!(target: LOG_TARGET, "training failed: {err}");
                        return Response::error(err.to_string());
                    }
                }
            }
            Request::Recommend(recommend) => Outcome::Recommendations {
                recommendations: self.recommend(&recommend).await,
            },
            Request::Explain(explain) => self.explain(&explain).await,
            Request::Summary(summary) => Outcome::Summary {
                summary: summarize_itinerary(
                    &summary.user_profile,
                    &summary.destination,
                    summary.total_activities,
                    summary.data_points,
                ),
            },
            Request::HealthScore(health) => Outcome::Health {
                health_score: assess_health(&health.itinerary, &health.user_profile),
            },
            Request::AutoOptimize(optimize) => {
                let defaults = OptimizerConfig::default();
                let optimizer = AutoOptimizer::new(OptimizerConfig {
                    max_iterations: optimize.max_iterations.unwrap_or(defaults.max_iterations),
                    ..defaults
                });
                Outcome::Optimized {
                    optimization_result: optimizer.optimize(
                        &optimize.itinerary,
                        &optimize.user_profile,
                        &optimize.available_activities,
                    ),
                }
            }
            Request::ProactiveTips(tips) => Outcome::Tips {
                proactive_tips: proactive_tips(
                    &tips.itinerary,
                    &tips.user_profile,
                    tips.weather_forecast.as_ref(),
                ),
            },
            Request::ApplyTip(apply) => Outcome::TipApplied {
                modified_itinerary: apply_tip(&apply.itinerary, &apply.tip, &apply.user_profile),
                applied_tip: apply.tip,
            },
            Request::Info => Outcome::Info {
                model_info: self.pipeline.info(),
            },
        };
        Response::Success(outcome)
    }

    async fn recommend(&self, request: &RecommendRequest) -> Vec<RecommendationScore> {
        let content =
            self.pipeline
                .ranker()
                .rank(&request.user_profile, &request.activities, request.top_n);
        match (&self.collective, request.destination.as_deref()) {
            (Some(blender), Some(destination)) => {
                blender
                    .recommend_with_content(
                        &request.user_profile,
                        destination,
                        &content,
                        request.top_n,
                    )
                    .await
            }
            _ => content,
        }
    }

    async fn explain(&self, request: &ExplainRequest) -> Outcome {
        let explanation = explain_recommendation(
            &request.activity,
            &request.user_profile,
            request.decision_factors.ml_score,
        );
        let collective_explanation = match (&self.collective, request.destination.as_deref()) {
            (Some(blender), Some(destination)) => {
                let activity_id = request
                    .activity
                    .id
                    .as_deref()
                    .unwrap_or(request.activity.name.as_str());
                Some(
                    blender
                        .explain(activity_id, &request.user_profile, destination)
                        .await,
                )
            }
            _ => None,
        };
        Outcome::Explanation {
            explanation,
            collective_explanation,
        }
    }
}
