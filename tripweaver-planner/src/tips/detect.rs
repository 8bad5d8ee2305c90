//! Rule detectors. Each appends its tips in itinerary order.

use tripweaver_core::{Activity, ActivityInstance, Itinerary, UserProfile};

use super::{
    BudgetOverrun, IndoorSuggestion, PopularActivity, Severity, TightConnection, Tip, TipAction,
    TipKind, UnsuitableActivity, WeatherForecast, WeatherReschedule,
};
use crate::plain_number;

const OUTDOOR_KEYWORDS: &[&str] = &["park", "hiking", "beach", "outdoor", "walking"];
const INDOOR_KEYWORDS: &[&str] = &["museum", "restaurant", "shopping", "indoor"];
const RAIN_THRESHOLD: f64 = 60.0;
const HOT_CELSIUS: f64 = 35.0;
const FREEZING_CELSIUS: f64 = 0.0;
const ATTRACTION_KEYWORDS: &[&str] = &["museum", "attraction", "landmark"];
const ADULT_KEYWORDS: &[&str] = &["bar", "nightclub", "casino"];
const STRENUOUS_KEYWORDS: &[&str] = &["hiking", "climbing", "stairs"];
const EXPENSIVE_TIER: u8 = 3;

fn mentions(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn leading_hour(time: Option<&str>) -> Option<i32> {
    time?.split(':').next()?.trim().parse().ok()
}

/// Estimated dollars spent at a price tier.
const fn estimated_cost(price_level: u8) -> u32 {
    match price_level {
        1 => 10,
        3 => 50,
        4 => 100,
        _ => 25,
    }
}

/// Dollars a traveller at `tier` expects to spend per day.
const fn daily_budget(tier: u8) -> u32 {
    match tier {
        1 => 50,
        2 => 100,
        4 => 500,
        _ => 200,
    }
}

/// Report whether `day_total` is more than 130% of `daily_budget`.
///
/// # Examples
/// ```
/// use tripweaver_planner::exceeds_daily_budget;
///
/// assert!(!exceeds_daily_budget(260, 200));
/// assert!(exceeds_daily_budget(261, 200));
/// ```
#[must_use]
pub fn exceeds_daily_budget(day_total: u32, daily_budget: u32) -> bool {
    u64::from(day_total) * 10 > u64::from(daily_budget) * 13
}

fn names<'a>(activities: impl Iterator<Item = &'a Activity>) -> Vec<String> {
    activities.map(|a| a.name.clone()).collect()
}

pub(super) fn weather(itinerary: &Itinerary, forecast: &WeatherForecast, tips: &mut Vec<Tip>) {
    for day in &itinerary.days {
        if day.date.is_empty() {
            continue;
        }
        let Some(outlook) = forecast.get(&day.date) else {
            continue;
        };
        let mut outdoor = Vec::new();
        let mut indoor = Vec::new();
        for instance in &day.activities {
            let text = instance.activity.category_text();
            if mentions(&text, OUTDOOR_KEYWORDS) {
                outdoor.push(&instance.activity);
            } else if mentions(&text, INDOOR_KEYWORDS) {
                indoor.push(&instance.activity);
            }
        }
        if outlook.precipitation_chance > RAIN_THRESHOLD && !outdoor.is_empty() {
            tips.push(Tip {
                kind: TipKind::Weather,
                message: format!(
                    "Rain expected on {} ({}% chance). Consider rescheduling outdoor activities.",
                    day.date,
                    plain_number(outlook.precipitation_chance)
                ),
                severity: Severity::High,
                action: TipAction::RescheduleOutdoor(WeatherReschedule {
                    day_date: day.date.clone(),
                    outdoor_activities: names(outdoor.into_iter()),
                    indoor_activities: names(indoor.into_iter()),
                }),
            });
        }
        let temperature = outlook.temperature;
        if temperature > HOT_CELSIUS || temperature < FREEZING_CELSIUS {
            let extreme = if temperature > HOT_CELSIUS { "hot" } else { "cold" };
            tips.push(Tip {
                kind: TipKind::Weather,
                message: format!(
                    "Extreme {extreme} weather expected on {} ({}°C). Plan indoor activities.",
                    day.date,
                    plain_number(temperature)
                ),
                severity: Severity::Medium,
                action: TipAction::SuggestIndoor(IndoorSuggestion {
                    day_date: day.date.clone(),
                    temperature,
                }),
            });
        }
    }
}

fn connection(current: &ActivityInstance, next: &ActivityInstance) -> Option<Tip> {
    let end = leading_hour(current.end_time.as_deref())?;
    let start = leading_hour(next.start_time.as_deref())?;
    let gap = start - end;
    (gap < 1).then(|| Tip {
        kind: TipKind::Connection,
        message: format!(
            "Tight connection between '{}' and '{}'. Consider booking transportation in advance.",
            current.activity.name, next.activity.name
        ),
        severity: Severity::Medium,
        action: TipAction::SuggestTransport(TightConnection {
            from_activity: current.activity.name.clone(),
            to_activity: next.activity.name.clone(),
            time_gap: gap,
        }),
    })
}

pub(super) fn connections(itinerary: &Itinerary, tips: &mut Vec<Tip>) {
    for day in &itinerary.days {
        tips.extend(
            day.activities
                .windows(2)
                .filter_map(|pair| match pair {
                    [current, next] => connection(current, next),
                    _ => None,
                }),
        );
    }
}

pub(super) fn budget(itinerary: &Itinerary, profile: &UserProfile, tips: &mut Vec<Tip>) {
    let allowance = daily_budget(profile.budget);
    for day in &itinerary.days {
        let day_total: u32 = day
            .activities
            .iter()
            .map(|a| estimated_cost(a.activity.price_level))
            .sum();
        if !exceeds_daily_budget(day_total, allowance) {
            continue;
        }
        let over_percent = (day_total.saturating_mul(100) / allowance).saturating_sub(100);
        tips.push(Tip {
            kind: TipKind::Budget,
            message: format!(
                "Budget alert: Day total (${day_total}) is {over_percent}% over your daily budget (${allowance})."
            ),
            severity: Severity::Medium,
            action: TipAction::SuggestAlternatives(BudgetOverrun {
                day_total,
                daily_budget: allowance,
                expensive_activities: names(
                    day.activities
                        .iter()
                        .map(|a| &a.activity)
                        .filter(|a| a.price_level >= EXPENSIVE_TIER),
                ),
            }),
        });
    }
}

fn popular(activity: &Activity) -> PopularActivity {
    PopularActivity {
        activity_name: activity.name.clone(),
        rating: activity.rating,
        review_count: activity.review_count,
    }
}

pub(super) fn popularity(itinerary: &Itinerary, tips: &mut Vec<Tip>) {
    for activity in itinerary.activities() {
        let text = activity.category_text();
        if text.contains("restaurant") && activity.rating >= 4.5 && activity.review_count > 1000 {
            tips.push(Tip {
                kind: TipKind::Popularity,
                message: format!(
                    "'{}' is highly rated ({}★, {} reviews). Consider making a reservation.",
                    activity.name,
                    plain_number(activity.rating),
                    activity.review_count
                ),
                severity: Severity::Low,
                action: TipAction::SuggestReservation(popular(activity)),
            });
        }
        if mentions(&text, ATTRACTION_KEYWORDS)
            && activity.rating >= 4.0
            && activity.review_count > 5000
        {
            tips.push(Tip {
                kind: TipKind::Popularity,
                message: format!(
                    "'{}' is very popular. Consider booking tickets in advance to avoid long lines.",
                    activity.name
                ),
                severity: Severity::Medium,
                action: TipAction::SuggestBooking(popular(activity)),
            });
        }
    }
}

pub(super) fn accessibility(itinerary: &Itinerary, profile: &UserProfile, tips: &mut Vec<Tip>) {
    if profile.travel_style() == Some("family") {
        for activity in itinerary.activities() {
            let text = activity.category_text();
            if mentions(&text, ADULT_KEYWORDS) {
                tips.push(Tip {
                    kind: TipKind::Accessibility,
                    message: format!(
                        "'{}' might not be suitable for children. Consider family-friendly alternatives.",
                        activity.name
                    ),
                    severity: Severity::Medium,
                    action: TipAction::SuggestFamilyAlternative(UnsuitableActivity {
                        activity_name: activity.name.clone(),
                        activity_type: text,
                    }),
                });
            }
        }
    }
    if profile.mobility_needs {
        for activity in itinerary.activities() {
            let text = activity.category_text();
            if mentions(&text, STRENUOUS_KEYWORDS) {
                tips.push(Tip {
                    kind: TipKind::Accessibility,
                    message: format!(
                        "'{}' might have accessibility challenges. Check for accessible alternatives.",
                        activity.name
                    ),
                    severity: Severity::High,
                    action: TipAction::SuggestAccessibleAlternative(UnsuitableActivity {
                        activity_name: activity.name.clone(),
                        activity_type: text,
                    }),
                });
            }
        }
    }
}
