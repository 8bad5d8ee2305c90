//! Behavioural coverage for the heuristic fallback ranker.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tripweaver_core::{Activity, FallbackRanker, Ranker, RecommendationScore, UserProfile};

#[fixture]
fn candidates() -> RefCell<Vec<Activity>> {
    RefCell::new(Vec::new())
}

#[fixture]
fn ranked() -> RefCell<Vec<RecommendationScore>> {
    RefCell::new(Vec::new())
}

#[given("a well reviewed bistro and a little known cafe with the same rating")]
fn bistro_and_cafe(#[from(candidates)] candidates: &RefCell<Vec<Activity>>) {
    *candidates.borrow_mut() = vec![
        Activity::new("Cafe").with_types(["cafe"]).with_rating(4.4),
        Activity::new("Bistro")
            .with_types(["restaurant"])
            .with_rating(4.4)
            .with_review_count(640),
    ];
}

#[given("two identical parks named {first} and {second}")]
fn identical_parks(
    #[from(candidates)] candidates: &RefCell<Vec<Activity>>,
    first: String,
    second: String,
) {
    let park = |name: &str| {
        Activity::new(name.trim_matches('"'))
            .with_types(["park"])
            .with_rating(4.1)
    };
    *candidates.borrow_mut() = vec![park(&first), park(&second)];
}

#[when("I rank them with the fallback ranker")]
fn rank(
    #[from(candidates)] candidates: &RefCell<Vec<Activity>>,
    #[from(ranked)] ranked: &RefCell<Vec<RecommendationScore>>,
) {
    let candidates = candidates.borrow();
    *ranked.borrow_mut() = FallbackRanker.rank(&UserProfile::default(), &candidates, 10);
}

#[then("the bistro is ranked first")]
fn bistro_first(#[from(ranked)] ranked: &RefCell<Vec<RecommendationScore>>) {
    let ranked = ranked.borrow();
    assert_eq!(
        ranked.first().map(|r| r.activity.name.as_str()),
        Some("Bistro")
    );
}

#[then("the ranking order is {first} then {second}")]
fn ranking_order(
    #[from(ranked)] ranked: &RefCell<Vec<RecommendationScore>>,
    first: String,
    second: String,
) {
    let names: Vec<String> = ranked
        .borrow()
        .iter()
        .map(|r| r.activity.name.clone())
        .collect();
    assert_eq!(
        names,
        [
            first.trim_matches('"').to_owned(),
            second.trim_matches('"').to_owned()
        ]
    );
}

#[scenario(path = "tests/features/fallback_ranking.feature", index = 0)]
fn popular_outranks_sparse(
    candidates: RefCell<Vec<Activity>>,
    ranked: RefCell<Vec<RecommendationScore>>,
) {
    let _ = (candidates, ranked);
}

#[scenario(path = "tests/features/fallback_ranking.feature", index = 1)]
fn ties_keep_order(candidates: RefCell<Vec<Activity>>, ranked: RefCell<Vec<RecommendationScore>>) {
    let _ = (candidates, ranked);
}
