//! Itinerary quality tooling.
//!
//! - [`assess_health`] grades an itinerary on pacing, budget, cohesion,
//!   diversity and rating quality.
//! - [`AutoOptimizer`] swaps weak activities for better ones from a pool
//!   while the grade improves.
//! - [`proactive_tips`] flags weather, timing, budget, popularity and
//!   accessibility issues, and [`apply_tip`] writes a tip into a copy of
//!   the itinerary.
//!
//! Everything here is synchronous and pure; inputs are never modified.
#![forbid(unsafe_code)]

mod health;
mod optimizer;
mod tips;

pub use health::{
    Budget, CategoryDetails, CategoryScore, Cohesion, Diversity, HealthBreakdown, HealthCategory,
    HealthScore, HealthStatus, NO_ACTIVITIES, Pacing, RatingFloor, assess_health,
    target_price_tier,
};
pub use optimizer::{AppliedChange, AutoOptimizer, OptimizationResult, OptimizerConfig};
pub use tips::{
    BudgetOverrun, DayForecast, IndoorSuggestion, PopularActivity, Severity, TightConnection, Tip,
    TipAction, TipKind, UnsuitableActivity, WeatherForecast, WeatherReschedule, apply_tip,
    exceeds_daily_budget, proactive_tips,
};

/// Convert a count for averaging.
pub(crate) fn count_as_f64(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}

/// Render a measurement without a trailing `.0`.
pub(crate) fn plain_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
