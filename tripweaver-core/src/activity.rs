//! Activity snapshots fetched from a places provider.
//!
//! An [`Activity`] is immutable once fetched: ranking, scoring and itinerary
//! transforms read it but never change it. Every field has an explicit
//! default so partially populated provider records still deserialise.

use serde::{Deserialize, Serialize};

/// A candidate activity such as a museum, restaurant or park.
///
/// Category tags are ordered; the first tag is treated as the primary
/// category.
///
/// # Examples
/// ```
/// use tripweaver_core::Activity;
///
/// let museum = Activity::new("City Museum")
///     .with_types(["museum", "tourist_attraction"])
///     .with_rating(4.7)
///     .with_price_level(3);
///
/// assert_eq!(museum.primary_type(), "museum");
/// assert!(museum.has_type("tourist_attraction"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    /// Provider identifier, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Ordered category tags, e.g. `["museum", "point_of_interest"]`.
    pub types: Vec<String>,
    /// Average rating in `0.0..=5.0`.
    pub rating: f64,
    /// Price level in `0..=4`.
    pub price_level: u8,
    /// Number of reviews behind the rating.
    #[serde(rename = "user_ratings_total")]
    pub review_count: u32,
    /// Provider photo handle; only its presence matters to the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_reference: Option<String>,
    /// Postal address as a single line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
}

impl Activity {
    /// Construct an activity with a name and default fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the provider identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Replace the category tags.
    #[must_use]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Set the average rating.
    #[must_use]
    pub const fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Set the price level.
    #[must_use]
    pub const fn with_price_level(mut self, price_level: u8) -> Self {
        self.price_level = price_level;
        self
    }

    /// Set the review count.
    #[must_use]
    pub const fn with_review_count(mut self, review_count: u32) -> Self {
        self.review_count = review_count;
        self
    }

    /// Attach a photo reference.
    #[must_use]
    pub fn with_photo(mut self, reference: impl Into<String>) -> Self {
        self.photo_reference = Some(reference.into());
        self
    }

    /// Attach a formatted address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.formatted_address = Some(address.into());
        self
    }

    /// Return the first category tag or `"unknown"`.
    #[must_use]
    pub fn primary_type(&self) -> &str {
        self.types.first().map_or("unknown", String::as_str)
    }

    /// Report whether the activity carries exactly this tag.
    #[must_use]
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }

    /// Report whether any tag is one of `tags`.
    #[must_use]
    pub fn has_any_type(&self, tags: &[&str]) -> bool {
        self.types.iter().any(|t| tags.contains(&t.as_str()))
    }

    /// Report whether a photo is available.
    #[must_use]
    pub const fn has_photo(&self) -> bool {
        self.photo_reference.is_some()
    }

    /// Lower-cased, space-joined category tags.
    ///
    /// Rule detectors match keywords as substrings of this text, so
    /// `"hiking_area"` matches `"hiking"`.
    #[must_use]
    pub fn category_text(&self) -> String {
        self.types.join(" ").to_lowercase()
    }
}
