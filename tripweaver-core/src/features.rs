//! Pure feature extraction for activities.
//!
//! [`FeatureVector::extract`] turns an [`Activity`] into the categorical,
//! numeric and text inputs consumed by the embedding pipeline. Extraction
//! never fails and depends on nothing but its argument.

use serde::{Deserialize, Serialize};

use crate::Activity;

/// Names of the numeric feature columns, in column order.
pub const NUMERIC_FEATURES: [&str; 12] = [
    "rating",
    "price_level",
    "user_ratings_total",
    "has_photos",
    "is_food",
    "is_cultural",
    "is_outdoor",
    "is_entertainment",
    "is_shopping",
    "is_highly_rated",
    "is_popular",
    "is_expensive",
];

/// Tags marking food and drink venues.
pub const FOOD_TYPES: &[&str] = &["restaurant", "cafe", "bar", "food"];
/// Tags marking cultural venues.
pub const CULTURAL_TYPES: &[&str] = &["museum", "art_gallery", "library", "church"];
/// Tags marking outdoor venues.
pub const OUTDOOR_TYPES: &[&str] = &["park", "natural_feature", "recreation_area"];
/// Tags marking entertainment venues.
pub const ENTERTAINMENT_TYPES: &[&str] = &["amusement_park", "movie_theater", "stadium"];
/// Tags marking shopping venues.
pub const SHOPPING_TYPES: &[&str] = &["shopping_mall", "store", "department_store"];

const HIGHLY_RATED_THRESHOLD: f64 = 4.0;
const POPULAR_REVIEW_THRESHOLD: u32 = 100;
const EXPENSIVE_PRICE_LEVEL: u8 = 3;

/// Derived features for one activity.
///
/// # Examples
/// ```
/// use tripweaver_core::{Activity, FeatureVector};
///
/// let cafe = Activity::new("Cafe").with_types(["cafe"]).with_rating(4.2);
/// let features = FeatureVector::extract(&cafe);
/// assert_eq!(features.primary_category, "cafe");
/// assert_eq!(features.numeric_value("is_food"), Some(1.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// First tag, or `"unknown"`.
    pub primary_category: String,
    /// Space-joined tags.
    pub text: String,
    /// Values for [`NUMERIC_FEATURES`], booleans as `0.0`/`1.0`.
    pub numeric: [f64; 12],
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

impl FeatureVector {
    /// Extract features from `activity`.
    #[must_use]
    pub fn extract(activity: &Activity) -> Self {
        let rating = if activity.rating.is_finite() {
            activity.rating
        } else {
            0.0
        };
        Self {
            primary_category: activity.primary_type().to_owned(),
            text: activity.types.join(" "),
            numeric: [
                rating,
                f64::from(activity.price_level),
                f64::from(activity.review_count),
                flag(activity.has_photo()),
                flag(activity.has_any_type(FOOD_TYPES)),
                flag(activity.has_any_type(CULTURAL_TYPES)),
                flag(activity.has_any_type(OUTDOOR_TYPES)),
                flag(activity.has_any_type(ENTERTAINMENT_TYPES)),
                flag(activity.has_any_type(SHOPPING_TYPES)),
                flag(rating >= HIGHLY_RATED_THRESHOLD),
                flag(activity.review_count >= POPULAR_REVIEW_THRESHOLD),
                flag(activity.price_level >= EXPENSIVE_PRICE_LEVEL),
            ],
        }
    }

    /// Position of a named numeric column.
    #[must_use]
    pub fn numeric_index(column: &str) -> Option<usize> {
        NUMERIC_FEATURES.iter().position(|name| *name == column)
    }

    /// Value of a named numeric column.
    #[must_use]
    pub fn numeric_value(&self, column: &str) -> Option<f64> {
        Self::numeric_index(column).and_then(|idx| self.numeric.get(idx).copied())
    }
}
