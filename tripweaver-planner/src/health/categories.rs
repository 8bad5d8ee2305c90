//! The five health dimensions.

use std::collections::{HashMap, HashSet};

use tripweaver_core::{Day, Itinerary, UserProfile};

use super::{CategoryDetails, CategoryScore, HealthCategory, target_price_tier};
use crate::{count_as_f64, plain_number};

const HIGH_ENERGY_TYPES: &[&str] = &["amusement_park", "stadium", "gym", "park"];
const MAX_CONSECUTIVE_HIGH_ENERGY: u32 = 2;
const OVER_SCHEDULED_HOURS: f64 = 12.0;
const UNDER_SCHEDULED_HOURS: f64 = 4.0;
const FLOW_TYPES: &[&str] = &["museum", "park"];
const DOMINANT_SHARE: f64 = 0.4;
const LOW_RATING: f64 = 4.0;

fn capped(score: u32, max_score: u32, details: CategoryDetails) -> CategoryScore {
    CategoryScore {
        score: score.min(max_score),
        max_score,
        details,
    }
}

/// Day lengths between four and twelve hours, without long runs of
/// high-energy visits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pacing;

impl Pacing {
    fn has_energy_run(day: &Day) -> bool {
        let mut run = 0;
        day.activities.iter().any(|instance| {
            if instance.activity.has_any_type(HIGH_ENERGY_TYPES) {
                run += 1;
            } else {
                run = 0;
            }
            run > MAX_CONSECUTIVE_HIGH_ENERGY
        })
    }
}

impl HealthCategory for Pacing {
    fn name(&self) -> &'static str {
        "pacing"
    }

    fn max_score(&self) -> u32 {
        25
    }

    fn assess(&self, itinerary: &Itinerary, _profile: &UserProfile) -> CategoryScore {
        let mut score = 0;
        let mut details = CategoryDetails::default();
        for day in itinerary.days.iter().filter(|d| !d.activities.is_empty()) {
            let label = day.label();
            if Self::has_energy_run(day) {
                details.issues.push(format!(
                    "Too many consecutive high-energy activities on day {label}"
                ));
            }
            let hours: f64 = day.activities.iter().map(|a| a.duration_hours()).sum();
            let shown = format!("{}h", plain_number(hours));
            if hours > OVER_SCHEDULED_HOURS {
                details
                    .issues
                    .push(format!("Day {label} is over-scheduled ({shown})"));
            } else if hours < UNDER_SCHEDULED_HOURS {
                details
                    .issues
                    .push(format!("Day {label} is under-scheduled ({shown})"));
            } else {
                details
                    .strengths
                    .push(format!("Good pacing on day {label} ({shown})"));
                score += 5;
            }
        }
        if details.issues.is_empty() {
            details.strengths.push("Excellent pacing throughout".to_owned());
        }
        capped(score, self.max_score(), details)
    }
}

/// Average price tier close to the traveller's budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct Budget;

impl HealthCategory for Budget {
    fn name(&self) -> &'static str {
        "budget"
    }

    fn max_score(&self) -> u32 {
        20
    }

    fn assess(&self, itinerary: &Itinerary, profile: &UserProfile) -> CategoryScore {
        let target = target_price_tier(profile);
        let mut details = CategoryDetails::default();
        let mut total = 0u32;
        let mut over_budget = 0u32;
        for activity in itinerary.activities() {
            total += u32::from(activity.price_level);
            if activity.price_level > target.saturating_add(1) {
                over_budget += 1;
                details
                    .issues
                    .push(format!("Activity '{}' exceeds budget level", activity.name));
            }
        }
        let count = itinerary.activity_count().max(1);
        let gap = (f64::from(total) / count_as_f64(count) - f64::from(target)).abs();
        let base: u32 = if gap <= 0.5 {
            details.strengths.push("Excellent budget alignment".to_owned());
            20
        } else if gap <= 1.0 {
            details.strengths.push("Good budget alignment".to_owned());
            15
        } else if gap <= 1.5 {
            details.strengths.push("Acceptable budget alignment".to_owned());
            10
        } else {
            details.issues.push("Poor budget alignment".to_owned());
            5
        };
        capped(
            base.saturating_sub(over_budget.saturating_mul(2)),
            self.max_score(),
            details,
        )
    }
}

/// Thematic variety within each day and a sensible mix of food and sights.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cohesion;

impl HealthCategory for Cohesion {
    fn name(&self) -> &'static str {
        "cohesion"
    }

    fn max_score(&self) -> u32 {
        20
    }

    fn assess(&self, itinerary: &Itinerary, _profile: &UserProfile) -> CategoryScore {
        let mut score = 0;
        let mut details = CategoryDetails::default();
        for day in itinerary.days.iter().filter(|d| d.activities.len() >= 2) {
            let label = day.label();
            let primaries: HashSet<&str> = day
                .activities
                .iter()
                .map(|a| a.activity.primary_type())
                .collect();
            match primaries.len() {
                n if n >= 3 => {
                    score += 5;
                    details
                        .strengths
                        .push(format!("Good thematic variety on day {label}"));
                }
                2 => score += 3,
                _ => details
                    .issues
                    .push(format!("Limited thematic variety on day {label}")),
            }
            let has_food = day.activities.iter().any(|a| a.activity.has_type("restaurant"));
            let has_sight = day
                .activities
                .iter()
                .any(|a| a.activity.has_any_type(FLOW_TYPES));
            if has_food && has_sight {
                score += 5;
                details
                    .strengths
                    .push(format!("Good activity flow on day {label}"));
            }
        }
        capped(score, self.max_score(), details)
    }
}

/// Many distinct category tags with none dominating.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diversity;

impl HealthCategory for Diversity {
    fn name(&self) -> &'static str {
        "diversity"
    }

    fn max_score(&self) -> u32 {
        20
    }

    fn assess(&self, itinerary: &Itinerary, _profile: &UserProfile) -> CategoryScore {
        let mut details = CategoryDetails::default();
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tag in itinerary.activities().flat_map(|a| a.types.iter()) {
            let count = counts.entry(tag.as_str()).or_insert_with(|| {
                order.push(tag.as_str());
                0
            });
            *count += 1;
        }
        let mut score: u32 = match order.len() {
            n if n >= 8 => {
                details.strengths.push("Excellent activity diversity".to_owned());
                20
            }
            n if n >= 6 => {
                details.strengths.push("Good activity diversity".to_owned());
                15
            }
            n if n >= 4 => {
                details.strengths.push("Moderate activity diversity".to_owned());
                10
            }
            _ => {
                details.issues.push("Limited activity diversity".to_owned());
                5
            }
        };
        let total = itinerary.activity_count();
        let threshold = count_as_f64(total) * DOMINANT_SHARE;
        for tag in order {
            let count = counts.get(tag).copied().unwrap_or_default();
            if count_as_f64(count) > threshold {
                details
                    .issues
                    .push(format!("Too many {tag} activities ({count}/{total})"));
                score = score.saturating_sub(5);
            }
        }
        capped(score, self.max_score(), details)
    }
}

/// Highly rated visits with few below 4.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingFloor;

impl HealthCategory for RatingFloor {
    fn name(&self) -> &'static str {
        "rating_quality"
    }

    fn max_score(&self) -> u32 {
        15
    }

    fn assess(&self, itinerary: &Itinerary, _profile: &UserProfile) -> CategoryScore {
        let mut details = CategoryDetails::default();
        let count = itinerary.activity_count().max(1);
        let average = itinerary.activities().map(|a| a.rating).sum::<f64>() / count_as_f64(count);
        let base: u32 = if average >= 4.5 {
            details
                .strengths
                .push(format!("Excellent average rating: {average:.1}"));
            15
        } else if average >= 4.2 {
            details
                .strengths
                .push(format!("Good average rating: {average:.1}"));
            12
        } else if average >= LOW_RATING {
            details
                .strengths
                .push(format!("Acceptable average rating: {average:.1}"));
            8
        } else {
            details
                .issues
                .push(format!("Low average rating: {average:.1}"));
            5
        };
        let low = u32::try_from(
            itinerary
                .activities()
                .filter(|a| a.rating < LOW_RATING)
                .count(),
        )
        .unwrap_or(u32::MAX);
        let mut score = base;
        if low > 0 {
            score = score.saturating_sub(low.saturating_mul(2));
            details
                .issues
                .push(format!("{low} activities rated below 4.0"));
        }
        capped(score, self.max_score(), details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tripweaver_core::test_support::single_day;
    use tripweaver_core::{Activity, ActivityInstance, VisitDuration};

    fn tagged(name: &str, tag: &str) -> Activity {
        Activity::new(name)
            .with_types([tag])
            .with_rating(4.6)
            .with_price_level(2)
    }

    fn one_day(activities: Vec<Activity>) -> Itinerary {
        Itinerary::new(vec![single_day("2024-06-01", activities)])
    }

    #[rstest]
    fn three_parks_in_a_row_are_flagged() {
        let itinerary = one_day(vec![
            tagged("A", "park"),
            tagged("B", "gym"),
            tagged("C", "stadium"),
        ]);
        let result = Pacing.assess(&itinerary, &UserProfile::default());
        assert!(result.details.issues.contains(
            &"Too many consecutive high-energy activities on day 2024-06-01".to_owned()
        ));
        assert_eq!(result.score, 5);
    }

    #[rstest]
    #[case(1, "Day 2024-06-01 is under-scheduled (2h)", 0)]
    #[case(7, "Day 2024-06-01 is over-scheduled (14h)", 0)]
    fn day_length_outside_band(#[case] visits: usize, #[case] issue: &str, #[case] score: u32) {
        let itinerary = one_day((0..visits).map(|i| tagged(&format!("S{i}"), "museum")).collect());
        let result = Pacing.assess(&itinerary, &UserProfile::default());
        assert_eq!(result.details.issues, [issue]);
        assert_eq!(result.score, score);
    }

    #[rstest]
    fn numeric_durations_are_summed() {
        let day = Day::new(
            "d1",
            vec![
                ActivityInstance::new(tagged("A", "museum")).with_duration(VisitDuration::Hours(2.5)),
                ActivityInstance::new(tagged("B", "cafe")).with_duration(VisitDuration::Hours(2.0)),
            ],
        );
        let result = Pacing.assess(&Itinerary::new(vec![day]), &UserProfile::default());
        assert_eq!(result.details.strengths[0], "Good pacing on day d1 (4.5h)");
    }

    #[rstest]
    fn expensive_visits_cost_points() {
        let mut pricey = tagged("Caviar Bar", "bar");
        pricey.price_level = 4;
        let itinerary = one_day(vec![pricey, tagged("B", "museum"), tagged("C", "park")]);
        let result = Budget.assess(&itinerary, &UserProfile::new().with_budget(2));
        assert_eq!(result.details.issues, ["Activity 'Caviar Bar' exceeds budget level"]);
        // average 2.67 is within one tier of 2
        assert_eq!(result.score, 13);
    }

    #[rstest]
    fn single_theme_day_lacks_variety() {
        let itinerary = one_day(vec![tagged("A", "museum"), tagged("B", "museum")]);
        let result = Cohesion.assess(&itinerary, &UserProfile::default());
        assert_eq!(result.details.issues, ["Limited thematic variety on day 2024-06-01"]);
        assert_eq!(result.score, 0);
    }

    #[rstest]
    fn dominant_tag_is_penalised() {
        let itinerary = one_day(vec![
            tagged("A", "museum"),
            tagged("B", "museum"),
            tagged("C", "park"),
        ]);
        let result = Diversity.assess(&itinerary, &UserProfile::default());
        assert_eq!(
            result.details.issues,
            [
                "Limited activity diversity",
                "Too many museum activities (2/3)"
            ]
        );
        assert_eq!(result.score, 0);
    }

    #[rstest]
    fn low_ratings_are_counted() {
        let mut dull = tagged("Dull", "museum");
        dull.rating = 3.0;
        let itinerary = one_day(vec![dull, tagged("B", "park")]);
        let result = RatingFloor.assess(&itinerary, &UserProfile::default());
        assert_eq!(
            result.details.issues,
            ["Low average rating: 3.8", "1 activities rated below 4.0"]
        );
        assert_eq!(result.score, 3);
    }
}
