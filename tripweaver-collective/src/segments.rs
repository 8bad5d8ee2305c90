//! Deterministic traveller segment rules.

use tripweaver_core::UserProfile;

/// Travellers interested in food.
pub const FOODIES: &str = "Foodies";
/// High-budget luxury travellers.
pub const LUXURY_TRAVELERS: &str = "Luxury Travelers";
/// Low-budget backpackers.
pub const BUDGET_BACKPACKERS: &str = "Budget Backpackers";
/// Culture-focused travellers.
pub const CULTURAL_EXPLORERS: &str = "Cultural Explorers";
/// Adventure-focused travellers.
pub const ADVENTURE_SEEKERS: &str = "Adventure Seekers";

const FOOD_INTERESTS: &[&str] = &["restaurant", "food", "culinary"];
// Segment rules treat an undeclared style as budget travel.
const DEFAULT_SEGMENT_STYLE: &str = "budget";

/// Segments `profile` belongs to, in rule order.
///
/// # Examples
/// ```
/// use tripweaver_collective::user_segments;
/// use tripweaver_core::UserProfile;
///
/// let profile = UserProfile::new()
///     .with_interests(["food"])
///     .with_travel_style("cultural");
/// assert_eq!(user_segments(&profile), ["Foodies", "Cultural Explorers"]);
/// ```
#[must_use]
pub fn user_segments(profile: &UserProfile) -> Vec<String> {
    let style = profile.travel_style().unwrap_or(DEFAULT_SEGMENT_STYLE);
    let budget = profile.budget_level();
    let mut segments = Vec::new();
    if profile
        .interests
        .iter()
        .any(|interest| FOOD_INTERESTS.contains(&interest.as_str()))
    {
        segments.push(FOODIES);
    }
    if budget == "high" && style == "luxury" {
        segments.push(LUXURY_TRAVELERS);
    }
    if budget == "low" && style == "budget" {
        segments.push(BUDGET_BACKPACKERS);
    }
    if style == "cultural" {
        segments.push(CULTURAL_EXPLORERS);
    }
    if style == "adventure" {
        segments.push(ADVENTURE_SEEKERS);
    }
    segments.into_iter().map(str::to_owned).collect()
}
