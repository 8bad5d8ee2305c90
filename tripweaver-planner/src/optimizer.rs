//! Greedy hill-climbing over single activity swaps.
//!
//! Each iteration finds the weakest scheduled activity, shortlists
//! replacements from a candidate pool, and tries the best one. A swap is
//! kept only when the health score strictly improves; the first
//! non-improving trial ends the search.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tripweaver_core::{Activity, Itinerary, UserProfile};

use crate::health::{HealthScore, assess_health, round1, target_price_tier};

const LOG_TARGET: &str = "tripweaver::optimizer";

/// Tuning for [`AutoOptimizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Swap attempts before giving up.
    pub max_iterations: usize,
    /// Overall score at which the itinerary is good enough.
    pub target_score: f64,
    /// Number of replacement candidates retained per attempt.
    pub shortlist: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            target_score: 80.0,
            shortlist: 5,
        }
    }
}

/// A swap that was accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedChange {
    /// Name of the activity taken out.
    pub replaced: String,
    /// Name of the activity put in.
    pub replacement: String,
    /// Overall score after the swap.
    pub score: f64,
}

/// Outcome of [`AutoOptimizer::optimize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Final itinerary. Equal to the input when nothing was accepted.
    pub itinerary: Itinerary,
    /// Health of the final itinerary.
    pub health_score: HealthScore,
    /// Number of accepted swaps.
    pub optimizations_applied: usize,
    /// Final minus original overall score, one decimal place.
    pub improvement: f64,
    /// Overall score before optimisation.
    pub original_score: f64,
    /// Accepted swaps in order.
    pub changes: Vec<AppliedChange>,
}

/// Replaces weak activities until the itinerary is healthy enough.
#[derive(Debug, Clone, Default)]
pub struct AutoOptimizer {
    config: OptimizerConfig,
}

fn alignment_points(gap: f64, tiers: [f64; 3]) -> f64 {
    if gap <= 0.5 {
        tiers[0]
    } else if gap <= 1.0 {
        tiers[1]
    } else if gap <= 1.5 {
        tiers[2]
    } else {
        0.0
    }
}

fn popularity_points(reviews: u32) -> f64 {
    match reviews {
        r if r >= 1000 => 30.0,
        r if r >= 500 => 20.0,
        r if r >= 100 => 10.0,
        _ => 0.0,
    }
}

fn price_gap(activity: &Activity, target: u8) -> f64 {
    (f64::from(activity.price_level) - f64::from(target)).abs()
}

/// Quality of a scheduled activity for `target` tier; lower is weaker.
fn strength(activity: &Activity, target: u8) -> f64 {
    (activity.rating * 8.0).min(40.0)
        + alignment_points(price_gap(activity, target), [30.0, 20.0, 10.0])
        + popularity_points(activity.review_count)
}

/// Appeal of `candidate` as a replacement for `weak`.
fn replacement_appeal(weak: &Activity, candidate: &Activity, target: u8) -> f64 {
    let rating_gain = (candidate.rating - weak.rating).max(0.0) * 20.0;
    let budget_gain = (price_gap(weak, target) - price_gap(candidate, target)).max(0.0) * 15.0;
    let mut shared: Vec<&String> = weak
        .types
        .iter()
        .filter(|tag| candidate.types.contains(tag))
        .collect();
    shared.sort_unstable();
    shared.dedup();
    rating_gain + budget_gain + crate::count_as_f64(shared.len()) * 5.0
}

impl AutoOptimizer {
    /// Create an optimiser with explicit tuning.
    #[must_use]
    pub const fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Current tuning.
    #[must_use]
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Weakest scheduled activity, first in itinerary order on ties.
    #[must_use]
    pub fn weakest<'a>(&self, itinerary: &'a Itinerary, profile: &UserProfile) -> Option<&'a Activity> {
        let target = target_price_tier(profile);
        itinerary
            .activities()
            .map(|activity| (activity, strength(activity, target)))
            .fold(None, |best: Option<(&Activity, f64)>, (activity, score)| match best {
                Some((_, lowest)) if lowest <= score => best,
                _ => Some((activity, score)),
            })
            .map(|(activity, _)| activity)
    }

    /// Best replacements for `weak` from `pool`, in descending appeal.
    ///
    /// Activities named like `weak` are excluded. Ties keep pool order.
    #[must_use]
    pub fn shortlist<'a>(
        &self,
        weak: &Activity,
        pool: &'a [Activity],
        profile: &UserProfile,
    ) -> Vec<&'a Activity> {
        let target = target_price_tier(profile);
        let mut scored: Vec<(&Activity, f64)> = pool
            .par_iter()
            .filter(|candidate| candidate.name != weak.name)
            .map(|candidate| (candidate, replacement_appeal(weak, candidate, target)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
            .into_iter()
            .take(self.config.shortlist)
            .map(|(candidate, _)| candidate)
            .collect()
    }

    /// Improve `itinerary` using activities from `pool`.
    ///
    /// The input is never modified. Identical inputs give identical results.
    ///
    /// # Examples
    /// ```
    /// use tripweaver_core::{Itinerary, UserProfile};
    /// use tripweaver_planner::AutoOptimizer;
    ///
    /// let result = AutoOptimizer::default().optimize(&Itinerary::default(), &UserProfile::default(), &[]);
    /// assert_eq!(result.optimizations_applied, 0);
    /// ```
    #[must_use]
    pub fn optimize(
        &self,
        itinerary: &Itinerary,
        profile: &UserProfile,
        pool: &[Activity],
    ) -> OptimizationResult {
        let initial = assess_health(itinerary, profile);
        let original_score = initial.overall_score;
        log::info!(target: LOG_TARGET, score = original_score; "initial health");
        if original_score >= self.config.target_score {
            return OptimizationResult {
                itinerary: itinerary.clone(),
                health_score: initial,
                optimizations_applied: 0,
                improvement: 0.0,
                original_score,
                changes: Vec::new(),
            };
        }

        let mut current = itinerary.clone();
        let mut health = initial;
        let mut changes = Vec::new();
        for iteration in 1..=self.config.max_iterations {
            let Some(weak) = self.weakest(&current, profile) else {
                log::info!(target: LOG_TARGET, "no activities to replace");
                break;
            };
            let Some(best) = self.shortlist(weak, pool, profile).first().copied() else {
                log::info!(target: LOG_TARGET, "no alternatives in pool");
                break;
            };
            let replaced = weak.name.clone();
            let mut trial = current.clone();
            if let Some(slot) = trial.first_named_mut(&replaced) {
                *slot = slot.replaced_with(best.clone());
            }
            let trial_health = assess_health(&trial, profile);
            log::debug!(
                target: LOG_TARGET,
                iteration = iteration, score = trial_health.overall_score;
                "trial swap"
            );
            if trial_health.overall_score <= health.overall_score {
                log::info!(target: LOG_TARGET, "no improvement, stopping");
                break;
            }
            changes.push(AppliedChange {
                replaced,
                replacement: best.name.clone(),
                score: trial_health.overall_score,
            });
            current = trial;
            health = trial_health;
            if health.overall_score >= self.config.target_score {
                break;
            }
        }

        let improvement = round1(health.overall_score - original_score);
        log::info!(
            target: LOG_TARGET,
            changes = changes.len(), improvement = improvement;
            "optimisation complete"
        );
        OptimizationResult {
            itinerary: current,
            health_score: health,
            optimizations_applied: changes.len(),
            improvement,
            original_score,
            changes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tripweaver_core::test_support::{culture_food_profile, excellent_itinerary, single_day};

    fn spot(name: &str, tag: &str, rating: f64, price: u8) -> Activity {
        Activity::new(name)
            .with_types([tag])
            .with_rating(rating)
            .with_price_level(price)
    }

    #[fixture]
    fn weak_trip() -> Itinerary {
        Itinerary::new(vec![single_day(
            "2024-06-01",
            vec![
                spot("Dusty Shed", "museum", 3.1, 4),
                spot("Fine Cafe", "cafe", 4.4, 2),
                spot("Okay Park", "park", 3.9, 2),
            ],
        )])
    }

    #[fixture]
    fn pool() -> Vec<Activity> {
        vec![
            spot("Grand Museum", "museum", 4.9, 2),
            spot("Rooftop", "bar", 4.8, 2),
            spot("Botanic Garden", "park", 4.8, 1),
            spot("Bistro", "restaurant", 4.7, 2),
        ]
    }

    #[rstest]
    fn weakest_breaks_ties_by_position() {
        let itinerary = Itinerary::new(vec![single_day(
            "d",
            vec![spot("First", "a", 4.0, 2), spot("Second", "b", 4.0, 2)],
        )]);
        let weak = AutoOptimizer::default()
            .weakest(&itinerary, &UserProfile::default())
            .map(|a| a.name.as_str());
        assert_eq!(weak, Some("First"));
    }

    #[rstest]
    fn shortlist_prefers_rating_gain_and_shared_tags(pool: Vec<Activity>) {
        let weak = spot("Dusty Shed", "museum", 3.1, 4);
        let names: Vec<_> = AutoOptimizer::default()
            .shortlist(&weak, &pool, &UserProfile::new().with_budget(2))
            .into_iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names.first(), Some(&"Grand Museum"));
        assert_eq!(names.len(), 4);
    }

    #[rstest]
    fn shortlist_skips_same_name() {
        let weak = spot("Twin", "museum", 3.0, 2);
        let pool = [spot("Twin", "museum", 5.0, 2)];
        let shortlist = AutoOptimizer::default().shortlist(&weak, &pool, &UserProfile::default());
        assert!(shortlist.is_empty());
    }

    #[rstest]
    fn healthy_itinerary_is_left_alone(pool: Vec<Activity>) {
        let itinerary = excellent_itinerary();
        let result = AutoOptimizer::default().optimize(&itinerary, &culture_food_profile(), &pool);
        assert_eq!(result.optimizations_applied, 0);
        assert_eq!(result.itinerary, itinerary);
        assert!(result.changes.is_empty());
    }

    #[rstest]
    fn weak_trip_improves_without_touching_input(weak_trip: Itinerary, pool: Vec<Activity>) {
        let before = weak_trip.clone();
        let result =
            AutoOptimizer::default().optimize(&weak_trip, &UserProfile::new().with_budget(2), &pool);
        assert_eq!(weak_trip, before);
        assert!(result.optimizations_applied >= 1);
        assert!(result.health_score.overall_score > result.original_score);
        assert_eq!(
            result.changes.first().map(|c| c.replaced.as_str()),
            Some("Dusty Shed")
        );
        let slot = &result.itinerary.days[0].activities[0];
        assert_eq!(slot.start_time.as_deref(), Some("09:00"));
    }

    #[rstest]
    fn empty_pool_changes_nothing(weak_trip: Itinerary) {
        let result = AutoOptimizer::default().optimize(&weak_trip, &UserProfile::default(), &[]);
        assert_eq!(result.optimizations_applied, 0);
        assert!((result.improvement).abs() < f64::EPSILON);
        assert_eq!(result.itinerary, weak_trip);
    }
}
