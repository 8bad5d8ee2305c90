//! Explanations grounded in collaborative aggregates.

use tripweaver_core::UserProfile;

use crate::segments::user_segments;
use crate::store::ActivityRating;

/// Returned when the destination has no rating row for the activity.
pub const UNKNOWN_ACTIVITY_EXPLANATION: &str = "This activity is popular in this location.";
/// Returned when a rating row exists but no rule fires.
pub const DEFAULT_COLLECTIVE_EXPLANATION: &str =
    "Recommended based on collective traveller insights";
/// Returned when the store cannot be read.
pub const UNAVAILABLE_EXPLANATION: &str = "Recommended based on traveller insights";

/// Explain a recommendation from its aggregate rating row.
///
/// # Examples
/// ```
/// use tripweaver_collective::collective_explanation;
/// use tripweaver_core::UserProfile;
///
/// assert_eq!(
///     collective_explanation(None, &UserProfile::default()),
///     "This activity is popular in this location."
/// );
/// ```
#[must_use]
pub fn collective_explanation(rating: Option<&ActivityRating>, profile: &UserProfile) -> String {
    let Some(rating) = rating else {
        return UNKNOWN_ACTIVITY_EXPLANATION.to_owned();
    };
    let mut parts = Vec::new();
    if rating.average_rating >= 4.5 {
        parts.push(format!(
            "Rated {:.1}/5 by travellers like you",
            rating.average_rating
        ));
    }
    if rating.rating_count >= 50 {
        parts.push(format!("Loved by {} travellers", rating.rating_count));
    }
    if profile.interests.contains(&rating.activity_category) {
        parts.push(format!(
            "Matches your interest in {}",
            rating.activity_category
        ));
    }
    let segments = user_segments(profile);
    if !segments.is_empty() {
        parts.push(format!("Popular with {}", segments.join(", ")));
    }
    if parts.is_empty() {
        DEFAULT_COLLECTIVE_EXPLANATION.to_owned()
    } else {
        parts.join(" • ")
    }
}
