//! Plain-language explanations and itinerary summaries.

use serde::{Deserialize, Serialize};
use tripweaver_core::{Activity, Pace, UserProfile};

const TYPE_PHRASES: [(&str, &str); 6] = [
    ("museum", "perfect for cultural exploration"),
    ("restaurant", "great for experiencing local cuisine"),
    ("park", "ideal for relaxation and nature"),
    ("shopping_mall", "excellent for shopping and entertainment"),
    ("amusement_park", "perfect for fun and excitement"),
    ("spa", "ideal for relaxation and wellness"),
];

/// Capitalise the first letter of each alphabetic run and lower-case the rest.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Format `n` with comma thousands separators.
#[must_use]
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn tier_label(tier: u8) -> Option<&'static str> {
    match tier {
        1 => Some("budget-friendly"),
        2 => Some("moderately priced"),
        3 => Some("premium"),
        4 => Some("luxury"),
        _ => None,
    }
}

fn interests_matching(activity: &Activity, profile: &UserProfile) -> Vec<String> {
    let mut matched: Vec<String> = Vec::new();
    for interest in &profile.interests {
        let needle = interest.to_lowercase();
        let hit = activity.types.iter().any(|tag| {
            let tag = tag.to_lowercase();
            tag.contains(&needle) || needle.contains(&tag)
        });
        if hit && !matched.contains(interest) {
            matched.push(interest.clone());
        }
    }
    matched
}

fn join_with_and(parts: &[String]) -> String {
    match parts.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
    }
}

/// Explain in one sentence why `activity` suits `profile`.
///
/// `relevance` is an optional model score; values above 0.6 add a sentence
/// fragment about model relevance.
///
/// # Examples
/// ```
/// use tripweaver_core::{Activity, UserProfile};
/// use tripweaver_scorer::explain_recommendation;
///
/// let park = Activity::new("Green Park").with_types(["park"]).with_rating(4.6);
/// let profile = UserProfile::new().with_interests(["park"]);
/// let text = explain_recommendation(&park, &profile, None);
/// assert!(text.starts_with("We recommended Green Park because you're interested in Park"));
/// ```
#[must_use]
pub fn explain_recommendation(
    activity: &Activity,
    profile: &UserProfile,
    relevance: Option<f64>,
) -> String {
    let mut reasons: Vec<String> = Vec::new();

    let matched = interests_matching(activity, profile);
    match matched.as_slice() {
        [] => {}
        [only] => reasons.push(format!("because you're interested in {}", title_case(only))),
        many => reasons.push(format!(
            "because you're interested in {}",
            join_with_and(many)
        )),
    }

    if activity.rating >= 4.5 {
        reasons.push(format!("it's highly rated with {:.1} stars", activity.rating));
    } else if activity.rating >= 4.0 {
        reasons.push(format!("it has a good rating of {:.1} stars", activity.rating));
    }

    if profile.budget > 0 && activity.price_level > 0 {
        if activity.price_level <= profile.budget {
            let label = tier_label(profile.budget).unwrap_or("budget");
            reasons.push(format!("it fits your {label} preferences"));
        } else {
            let label = tier_label(activity.price_level).unwrap_or("priced");
            reasons.push(format!("it's {label} but highly recommended"));
        }
    }

    match relevance {
        Some(score) if score > 0.8 => {
            reasons.push("our AI found it highly relevant to your preferences".to_owned());
        }
        Some(score) if score > 0.6 => {
            reasons.push("our AI determined it matches your interests well".to_owned());
        }
        _ => {}
    }

    if activity.review_count > 1000 {
        reasons.push(format!(
            "it's popular with {} reviews",
            group_thousands(u64::from(activity.review_count))
        ));
    }

    if let Some(address) = activity.formatted_address.as_deref() {
        let parts: Vec<&str> = address.split(',').collect();
        if let [.., locality, _] = parts.as_slice() {
            reasons.push(format!("it's located in {}", locality.trim()));
        }
    }

    let phrase = activity.types.iter().find_map(|tag| {
        TYPE_PHRASES
            .iter()
            .find(|(kind, _)| kind == tag)
            .map(|(_, phrase)| *phrase)
    });
    if let Some(phrase) = phrase {
        reasons.push(phrase.to_owned());
    }

    if reasons.is_empty() {
        reasons.push("it's a great local recommendation".to_owned());
    }

    let name = if activity.name.is_empty() {
        "This activity"
    } else {
        activity.name.as_str()
    };
    match reasons.split_last() {
        Some((last, [])) => format!("We recommended {name} {last}."),
        Some((last, [first])) => format!("We recommended {name} {first} and {last}."),
        Some((last, rest)) => format!("We recommended {name} {}, and {last}.", rest.join(", ")),
        None => format!("We recommended {name}."),
    }
}

/// How an itinerary was assembled, for display next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItinerarySummary {
    /// Preferences the itinerary was tuned for.
    pub optimized_for: Vec<String>,
    /// Inputs the recommendations drew on.
    pub based_on: Vec<String>,
    /// Number of scheduled activities.
    pub total_activities: usize,
}

/// Summarise what an itinerary for `destination` was optimised for.
#[must_use]
pub fn summarize_itinerary(
    profile: &UserProfile,
    destination: &str,
    total_activities: usize,
    data_points: Option<u64>,
) -> ItinerarySummary {
    let mut optimized_for = Vec::new();
    match profile.interests.len() {
        0 => {}
        1 | 2 => optimized_for.push(title_case(&profile.interests.join(", "))),
        n => optimized_for.push(format!("{n} key interests")),
    }
    optimized_for.push(
        match profile.pace {
            Pace::Relaxed => "Relaxed Pace",
            Pace::Moderate => "Balanced Experience",
            Pace::Fast => "Active Exploration",
        }
        .to_owned(),
    );
    optimized_for.push(
        match profile.budget {
            1 => "Budget-Friendly",
            2 => "Moderate Budget",
            3 => "Premium Experience",
            4 => "Luxury",
            _ => "Your Budget",
        }
        .to_owned(),
    );

    let data_line = match data_points {
        Some(points) if points > 0 => {
            format!("{}+ data points from {destination}", group_thousands(points))
        }
        _ => format!("thousands of data points from {destination}"),
    };
    ItinerarySummary {
        optimized_for,
        based_on: vec![
            "Your preferences and travel style".to_owned(),
            data_line,
            "real-time availability and ratings".to_owned(),
        ],
        total_activities,
    }
}
