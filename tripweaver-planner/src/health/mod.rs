//! Itinerary health scoring.
//!
//! Five independent [`HealthCategory`] scorers each grade one aspect of an
//! itinerary; [`assess_health`] sums them into a 0–100 score with a status
//! band. Scoring is a pure function of its inputs.

use serde::{Deserialize, Serialize};
use tripweaver_core::{Itinerary, MAX_BUDGET_TIER, MIN_BUDGET_TIER, UserProfile};

mod categories;

pub use categories::{Budget, Cohesion, Diversity, Pacing, RatingFloor};

/// Issue recorded on every category of an empty itinerary.
pub const NO_ACTIVITIES: &str = "No activities found";

const DEFAULT_TARGET_TIER: u8 = 2;

/// Quality band for an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// 90 and above.
    Excellent,
    /// 80 to below 90.
    Good,
    /// 70 to below 80.
    Fair,
    /// 60 to below 70.
    Poor,
    /// Below 60.
    Critical,
}

impl HealthStatus {
    /// Band for `overall`.
    #[must_use]
    pub fn from_score(overall: f64) -> Self {
        if overall >= 90.0 {
            Self::Excellent
        } else if overall >= 80.0 {
            Self::Good
        } else if overall >= 70.0 {
            Self::Fair
        } else if overall >= 60.0 {
            Self::Poor
        } else {
            Self::Critical
        }
    }
}

/// Findings behind a category score.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryDetails {
    /// Problems found.
    pub issues: Vec<String>,
    /// Things done well.
    pub strengths: Vec<String>,
}

/// One category's score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Points awarded.
    pub score: u32,
    /// Points available.
    pub max_score: u32,
    /// Issues and strengths.
    pub details: CategoryDetails,
}

impl CategoryScore {
    fn empty(max_score: u32) -> Self {
        Self {
            score: 0,
            max_score,
            details: CategoryDetails {
                issues: vec![NO_ACTIVITIES.to_owned()],
                strengths: Vec::new(),
            },
        }
    }
}

/// Per-category scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthBreakdown {
    /// Day lengths and energy.
    pub pacing: CategoryScore,
    /// Price alignment.
    pub budget: CategoryScore,
    /// Variety and flow within days.
    pub cohesion: CategoryScore,
    /// Variety across the trip.
    pub diversity: CategoryScore,
    /// Rating quality.
    pub rating_quality: CategoryScore,
}

impl HealthBreakdown {
    fn categories(&self) -> [&CategoryScore; 5] {
        [
            &self.pacing,
            &self.budget,
            &self.cohesion,
            &self.diversity,
            &self.rating_quality,
        ]
    }
}

/// Overall itinerary health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// Percentage of available points, one decimal place.
    pub overall_score: f64,
    /// Band for [`Self::overall_score`].
    pub health_status: HealthStatus,
    /// Category scores.
    pub breakdown: HealthBreakdown,
    /// Sum of category scores.
    pub total_score: u32,
    /// Sum of category maxima.
    pub max_score: u32,
}

/// A single health dimension.
pub trait HealthCategory: Send + Sync {
    /// Key used in the breakdown.
    fn name(&self) -> &'static str;

    /// Points available.
    fn max_score(&self) -> u32;

    /// Grade `itinerary`. The returned score never exceeds
    /// [`Self::max_score`].
    fn assess(&self, itinerary: &Itinerary, profile: &UserProfile) -> CategoryScore;
}

/// Price tier the traveller aims for.
///
/// The profile's budget tier is used directly; out-of-range tiers fall back
/// to the moderate tier.
#[must_use]
pub fn target_price_tier(profile: &UserProfile) -> u8 {
    if (MIN_BUDGET_TIER..=MAX_BUDGET_TIER).contains(&profile.budget) {
        profile.budget
    } else {
        DEFAULT_TARGET_TIER
    }
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Score `itinerary` for `profile`.
///
/// An itinerary with no scheduled visits scores 0 (Critical) with a
/// [`NO_ACTIVITIES`] issue in every category.
///
/// # Examples
/// ```
/// use tripweaver_core::{Itinerary, UserProfile};
/// use tripweaver_planner::{HealthStatus, assess_health};
///
/// let health = assess_health(&Itinerary::default(), &UserProfile::default());
/// assert_eq!(health.overall_score, 0.0);
/// assert_eq!(health.health_status, HealthStatus::Critical);
/// ```
#[must_use]
pub fn assess_health(itinerary: &Itinerary, profile: &UserProfile) -> HealthScore {
    let breakdown = if itinerary.is_empty() {
        HealthBreakdown {
            pacing: CategoryScore::empty(Pacing.max_score()),
            budget: CategoryScore::empty(Budget.max_score()),
            cohesion: CategoryScore::empty(Cohesion.max_score()),
            diversity: CategoryScore::empty(Diversity.max_score()),
            rating_quality: CategoryScore::empty(RatingFloor.max_score()),
        }
    } else {
        HealthBreakdown {
            pacing: Pacing.assess(itinerary, profile),
            budget: Budget.assess(itinerary, profile),
            cohesion: Cohesion.assess(itinerary, profile),
            diversity: Diversity.assess(itinerary, profile),
            rating_quality: RatingFloor.assess(itinerary, profile),
        }
    };
    let total_score: u32 = breakdown.categories().iter().map(|c| c.score).sum();
    let max_score: u32 = breakdown.categories().iter().map(|c| c.max_score).sum();
    let overall_score = if max_score == 0 {
        0.0
    } else {
        round1(f64::from(total_score) / f64::from(max_score) * 100.0)
    };
    let health_status = HealthStatus::from_score(overall_score);
    log::debug!(
        target: "tripweaver::health",
        "health {overall_score}/100 ({health_status:?})"
    );
    HealthScore {
        overall_score,
        health_status,
        breakdown,
        total_score,
        max_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tripweaver_core::test_support::{culture_food_profile, excellent_itinerary};

    #[rstest]
    #[case(95.0, HealthStatus::Excellent)]
    #[case(90.0, HealthStatus::Excellent)]
    #[case(89.9, HealthStatus::Good)]
    #[case(70.0, HealthStatus::Fair)]
    #[case(60.0, HealthStatus::Poor)]
    #[case(59.9, HealthStatus::Critical)]
    fn status_bands(#[case] overall: f64, #[case] expected: HealthStatus) {
        assert_eq!(HealthStatus::from_score(overall), expected);
    }

    #[rstest]
    fn empty_itinerary_flags_every_category() {
        let health = assess_health(&Itinerary::default(), &UserProfile::default());
        assert_eq!(health.total_score, 0);
        assert_eq!(health.max_score, 100);
        for category in health.breakdown.categories() {
            assert_eq!(category.details.issues, [NO_ACTIVITIES]);
        }
    }

    #[rstest]
    fn varied_well_rated_trip_is_excellent() {
        let health = assess_health(&excellent_itinerary(), &culture_food_profile());
        assert_eq!(health.health_status, HealthStatus::Excellent);
        assert!((health.overall_score - 100.0).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(0, 2)]
    #[case(1, 1)]
    #[case(4, 4)]
    #[case(9, 2)]
    fn target_tier_follows_budget(#[case] budget: u8, #[case] expected: u8) {
        assert_eq!(target_price_tier(&UserProfile::new().with_budget(budget)), expected);
    }

    #[rstest]
    fn category_names_match_breakdown_keys() {
        let health = assess_health(&excellent_itinerary(), &culture_food_profile());
        let json = serde_json::to_value(&health.breakdown).expect("serialise");
        let categories: [&dyn HealthCategory; 5] =
            [&Pacing, &Budget, &Cohesion, &Diversity, &RatingFloor];
        for category in categories {
            assert_eq!(json[category.name()]["max_score"], category.max_score());
        }
    }

    #[rstest]
    fn serialises_with_wire_names() {
        let health = assess_health(&excellent_itinerary(), &culture_food_profile());
        let json = serde_json::to_value(&health).expect("serialise");
        assert_eq!(json["health_status"], "Excellent");
        assert_eq!(json["breakdown"]["rating_quality"]["max_score"], 15);
    }
}
