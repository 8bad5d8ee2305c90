//! Traveller profiles supplied with each request.
//!
//! Profiles are read-only inside the engine. The merged stated and inferred
//! preferences arrive from an upstream feedback module; storing and evolving
//! them is not this crate's concern.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest accepted budget tier.
pub const MIN_BUDGET_TIER: u8 = 1;
/// Highest accepted budget tier.
pub const MAX_BUDGET_TIER: u8 = 4;

const DEFAULT_BUDGET_TIER: u8 = 2;
const DEFAULT_GROUP_SIZE: u32 = 2;
const DEFAULT_BUDGET_LEVEL: &str = "medium";

/// Preferred sightseeing tempo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    /// Few activities with long breaks.
    Relaxed,
    /// Balanced days.
    #[default]
    Moderate,
    /// Packed days; also accepted as `"active"`.
    #[serde(alias = "active")]
    Fast,
}

impl Pace {
    /// Return the pace as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::Moderate => "moderate",
            Self::Fast => "fast",
        }
    }
}

impl std::fmt::Display for Pace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A traveller's preferences and constraints.
///
/// # Examples
/// ```
/// use tripweaver_core::{Pace, UserProfile};
///
/// let profile = UserProfile::new()
///     .with_interests(["culture", "food"])
///     .with_budget(2)
///     .with_pace(Pace::Moderate);
/// assert!(profile.validate().is_ok());
/// assert_eq!(profile.group_size(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Free-form interest keywords, e.g. `"food"` or `"culture"`.
    pub interests: Vec<String>,
    /// Budget tier in `1..=4`.
    pub budget: u8,
    /// Preferred pace.
    pub pace: Pace,
    /// Party size, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_size: Option<u32>,
    /// Travel style label such as `"family"`, `"luxury"` or `"cultural"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_style: Option<String>,
    /// The traveller needs step-free access.
    pub mobility_needs: bool,
    /// Coarse budget label (`low`, `medium`, `high`) used for anonymised
    /// matching; `medium` when absent, whatever the tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_level: Option<String>,
    /// Coarse age bracket used only for anonymised matching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    /// Coarse trip length bucket used only for anonymised matching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_duration: Option<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            interests: Vec::new(),
            budget: DEFAULT_BUDGET_TIER,
            pace: Pace::default(),
            group_size: None,
            travel_style: None,
            mobility_needs: false,
            budget_level: None,
            age_group: None,
            trip_duration: None,
        }
    }
}

/// Errors returned by [`UserProfile::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// The budget tier was outside `1..=4`.
    #[error("budget tier {0} is outside {MIN_BUDGET_TIER}..={MAX_BUDGET_TIER}")]
    BudgetOutOfRange(u8),
    /// A group of zero travellers was requested.
    #[error("group size must be at least one")]
    EmptyGroup,
}

impl UserProfile {
    /// Construct a profile with default preferences.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the interest keywords.
    #[must_use]
    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    /// Set the budget tier.
    #[must_use]
    pub const fn with_budget(mut self, budget: u8) -> Self {
        self.budget = budget;
        self
    }

    /// Set the pace.
    #[must_use]
    pub const fn with_pace(mut self, pace: Pace) -> Self {
        self.pace = pace;
        self
    }

    /// Set the party size.
    #[must_use]
    pub const fn with_group_size(mut self, group_size: u32) -> Self {
        self.group_size = Some(group_size);
        self
    }

    /// Set the travel style label.
    #[must_use]
    pub fn with_travel_style(mut self, style: impl Into<String>) -> Self {
        self.travel_style = Some(style.into());
        self
    }

    /// Set the coarse budget label.
    #[must_use]
    pub fn with_budget_level(mut self, level: impl Into<String>) -> Self {
        self.budget_level = Some(level.into());
        self
    }

    /// Flag mobility needs.
    #[must_use]
    pub const fn with_mobility_needs(mut self, needs: bool) -> Self {
        self.mobility_needs = needs;
        self
    }

    /// Check the tier and party size.
    ///
    /// # Errors
    /// Returns [`ProfileError`] when the budget tier is out of range or the
    /// group size is zero.
    pub const fn validate(&self) -> Result<(), ProfileError> {
        if self.budget < MIN_BUDGET_TIER || self.budget > MAX_BUDGET_TIER {
            return Err(ProfileError::BudgetOutOfRange(self.budget));
        }
        if matches!(self.group_size, Some(0)) {
            return Err(ProfileError::EmptyGroup);
        }
        Ok(())
    }

    /// Party size, defaulting to two travellers.
    #[must_use]
    pub fn group_size(&self) -> u32 {
        self.group_size.unwrap_or(DEFAULT_GROUP_SIZE)
    }

    /// Travel style, if declared.
    #[must_use]
    pub fn travel_style(&self) -> Option<&str> {
        self.travel_style.as_deref()
    }

    /// Coarse budget label, defaulting to `medium`.
    ///
    /// The numeric tier is never consulted.
    #[must_use]
    pub fn budget_level(&self) -> &str {
        self.budget_level.as_deref().unwrap_or(DEFAULT_BUDGET_LEVEL)
    }

    /// Report whether any interest equals one of `keywords`, ignoring case.
    #[must_use]
    pub fn has_interest_in(&self, keywords: &[&str]) -> bool {
        self.interests
            .iter()
            .any(|interest| keywords.iter().any(|k| interest.eq_ignore_ascii_case(k)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_match_documented_values() {
        let profile = UserProfile::default();
        assert_eq!(profile.budget, 2);
        assert_eq!(profile.pace, Pace::Moderate);
        assert_eq!(profile.group_size(), 2);
        assert!(!profile.mobility_needs);
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    fn rejects_out_of_range_budget(#[case] budget: u8) {
        let err = UserProfile::new()
            .with_budget(budget)
            .validate()
            .expect_err("budget outside 1..=4");
        assert_eq!(err, ProfileError::BudgetOutOfRange(budget));
    }

    #[rstest]
    fn rejects_empty_group() {
        let err = UserProfile::new()
            .with_group_size(0)
            .validate()
            .expect_err("zero travellers");
        assert_eq!(err, ProfileError::EmptyGroup);
    }

    #[rstest]
    #[case("\"fast\"", Pace::Fast)]
    #[case("\"active\"", Pace::Fast)]
    #[case("\"relaxed\"", Pace::Relaxed)]
    fn pace_accepts_aliases(#[case] raw: &str, #[case] expected: Pace) {
        let pace: Pace = serde_json::from_str(raw).expect("known pace");
        assert_eq!(pace, expected);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(4)]
    fn undeclared_budget_level_ignores_tier(#[case] tier: u8) {
        assert_eq!(UserProfile::new().with_budget(tier).budget_level(), "medium");
    }

    #[rstest]
    fn declared_budget_level_wins() {
        let profile = UserProfile::new().with_budget(1).with_budget_level("high");
        assert_eq!(profile.budget_level(), "high");
    }
}
