//! Property tests for health bounds and optimiser monotonicity.

use proptest::prelude::*;
use tripweaver_core::{Activity, ActivityInstance, Day, Itinerary, UserProfile, VisitDuration};
use tripweaver_planner::{AutoOptimizer, assess_health, proactive_tips};

const TAGS: [&str; 10] = [
    "museum",
    "restaurant",
    "park",
    "cafe",
    "amusement_park",
    "bar",
    "hiking_area",
    "church",
    "gym",
    "store",
];

fn activity_strategy() -> impl Strategy<Value = Activity> {
    (
        "[A-Z][a-z]{2,8}",
        proptest::sample::subsequence(TAGS.to_vec(), 0..3),
        0.0f64..=5.0,
        0u8..=4,
        0u32..10_000,
    )
        .prop_map(|(name, tags, rating, price, reviews)| {
            Activity::new(name)
                .with_types(tags)
                .with_rating(rating)
                .with_price_level(price)
                .with_review_count(reviews)
        })
}

fn day_strategy() -> impl Strategy<Value = Day> {
    (
        proptest::collection::vec((activity_strategy(), 1u32..5, 8u32..20), 0..6),
        1u32..28,
    )
        .prop_map(|(visits, date)| {
            let activities = visits
                .into_iter()
                .map(|(activity, hours, start)| {
                    ActivityInstance::new(activity)
                        .with_times(format!("{start:02}:00"), format!("{:02}:00", start + hours))
                        .with_duration(VisitDuration::Text(format!("{hours} hours")))
                })
                .collect();
            Day::new(format!("2024-06-{date:02}"), activities)
        })
}

fn itinerary_strategy() -> impl Strategy<Value = Itinerary> {
    proptest::collection::vec(day_strategy(), 0..5).prop_map(Itinerary::new)
}

fn profile_strategy() -> impl Strategy<Value = UserProfile> {
    (
        0u8..=5,
        prop_oneof![Just(None), Just(Some("family")), Just(Some("budget"))],
        any::<bool>(),
    )
        .prop_map(|(budget, style, mobility)| {
            let profile = UserProfile::new()
                .with_budget(budget)
                .with_mobility_needs(mobility);
            match style {
                Some(style) => profile.with_travel_style(style),
                None => profile,
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn health_stays_within_bounds(
        itinerary in itinerary_strategy(),
        profile in profile_strategy(),
    ) {
        let health = assess_health(&itinerary, &profile);
        prop_assert!((0.0..=100.0).contains(&health.overall_score));
        prop_assert!(health.total_score <= health.max_score);
        for category in [
            &health.breakdown.pacing,
            &health.breakdown.budget,
            &health.breakdown.cohesion,
            &health.breakdown.diversity,
            &health.breakdown.rating_quality,
        ] {
            prop_assert!(category.score <= category.max_score);
        }
    }

    #[test]
    fn optimiser_never_lowers_the_score(
        itinerary in itinerary_strategy(),
        profile in profile_strategy(),
        pool in proptest::collection::vec(activity_strategy(), 0..8),
    ) {
        let optimizer = AutoOptimizer::default();
        let result = optimizer.optimize(&itinerary, &profile, &pool);
        prop_assert!(result.health_score.overall_score >= result.original_score);
        prop_assert_eq!(result.optimizations_applied, result.changes.len());
        prop_assert!(result.optimizations_applied <= optimizer.config().max_iterations);
        prop_assert_eq!(&optimizer.optimize(&itinerary, &profile, &pool), &result);
    }

    #[test]
    fn tips_are_deterministic(
        itinerary in itinerary_strategy(),
        profile in profile_strategy(),
    ) {
        prop_assert_eq!(
            proactive_tips(&itinerary, &profile, None),
            proactive_tips(&itinerary, &profile, None)
        );
    }
}
