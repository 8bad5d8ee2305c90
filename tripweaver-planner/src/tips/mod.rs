//! Proactive itinerary tips and their application.
//!
//! Detectors scan an itinerary, and optionally a per-day forecast, for
//! weather, connection, budget, popularity and accessibility problems. Each
//! [`Tip`] carries a typed [`TipAction`] that [`apply_tip`] turns into
//! annotations on a copy of the itinerary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tripweaver_core::{Itinerary, UserProfile};

mod apply;
mod detect;

pub use apply::apply_tip;
pub use detect::exceeds_daily_budget;

/// Forecasts keyed by day date.
pub type WeatherForecast = BTreeMap<String, DayForecast>;

/// Weather expected on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayForecast {
    /// Free-text condition such as `"rain"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Chance of precipitation in percent.
    pub precipitation_chance: f64,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
}

impl Default for DayForecast {
    fn default() -> Self {
        Self {
            condition: None,
            precipitation_chance: 0.0,
            temperature: 20.0,
        }
    }
}

/// What a tip is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipKind {
    /// Rain or extreme temperatures.
    Weather,
    /// Too little time between visits.
    Connection,
    /// Spending above the daily budget.
    Budget,
    /// Crowds and reservations.
    Popularity,
    /// Family or mobility concerns.
    Accessibility,
    /// Anything else.
    #[default]
    General,
}

/// How urgently a tip should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Nice to know.
    #[default]
    Low,
    /// Worth acting on.
    Medium,
    /// Likely to spoil the day.
    High,
}

/// Outdoor and indoor visits on a rainy day.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherReschedule {
    /// Date of the affected day.
    pub day_date: String,
    /// Outdoor activity names.
    pub outdoor_activities: Vec<String>,
    /// Indoor activity names.
    pub indoor_activities: Vec<String>,
}

/// A day with extreme temperatures.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndoorSuggestion {
    /// Date of the affected day.
    pub day_date: String,
    /// Forecast temperature in degrees Celsius.
    pub temperature: f64,
}

/// Two consecutive visits with little time between them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TightConnection {
    /// Earlier visit.
    pub from_activity: String,
    /// Later visit.
    pub to_activity: String,
    /// Whole hours between the end of one and the start of the next.
    pub time_gap: i32,
}

/// A day whose estimated spend is over budget.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetOverrun {
    /// Estimated spend in dollars.
    pub day_total: u32,
    /// Daily budget in dollars.
    pub daily_budget: u32,
    /// Names of visits priced at tier 3 or above.
    pub expensive_activities: Vec<String>,
}

/// A highly rated, heavily reviewed visit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PopularActivity {
    /// Activity name.
    pub activity_name: String,
    /// Average rating.
    pub rating: f64,
    /// Review count.
    pub review_count: u32,
}

/// A visit that may not suit the party.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsuitableActivity {
    /// Activity name.
    pub activity_name: String,
    /// Lower-cased category text that triggered the tip.
    pub activity_type: String,
}

/// Change a tip proposes, serialised as `action_type` plus `action_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action_type", content = "action_data", rename_all = "snake_case")]
pub enum TipAction {
    /// Move outdoor visits away from a rainy day.
    RescheduleOutdoor(WeatherReschedule),
    /// Favour indoor visits on a very hot or cold day.
    SuggestIndoor(IndoorSuggestion),
    /// Arrange transport for a tight connection.
    SuggestTransport(TightConnection),
    /// Swap expensive visits for cheaper ones.
    SuggestAlternatives(BudgetOverrun),
    /// Reserve a table.
    SuggestReservation(PopularActivity),
    /// Book tickets ahead.
    SuggestBooking(PopularActivity),
    /// Find a child-friendly alternative.
    SuggestFamilyAlternative(UnsuitableActivity),
    /// Find an accessible alternative.
    SuggestAccessibleAlternative(UnsuitableActivity),
    /// No structured action; the message is kept as an itinerary tip.
    #[serde(other)]
    General,
}

/// A proactive suggestion about an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTip")]
pub struct Tip {
    /// Topic of the tip.
    #[serde(rename = "type")]
    pub kind: TipKind,
    /// Human-readable advice.
    pub message: String,
    /// Urgency.
    pub severity: Severity,
    /// Proposed change.
    #[serde(flatten)]
    pub action: TipAction,
}

/// Lenient wire form: missing fields take defaults and an unreadable action
/// degrades to [`TipAction::General`].
#[derive(Deserialize)]
struct RawTip {
    #[serde(default, rename = "type")]
    kind: TipKind,
    #[serde(default)]
    message: String,
    #[serde(default)]
    severity: Severity,
    #[serde(default)]
    action_type: Option<String>,
    #[serde(default)]
    action_data: Option<Value>,
}

impl From<RawTip> for Tip {
    fn from(raw: RawTip) -> Self {
        let action = raw
            .action_type
            .map_or(TipAction::General, |action_type| {
                let mut wire = serde_json::Map::new();
                wire.insert("action_type".to_owned(), Value::String(action_type));
                if let Some(data) = raw.action_data {
                    wire.insert("action_data".to_owned(), data);
                }
                serde_json::from_value(Value::Object(wire)).unwrap_or(TipAction::General)
            });
        Self {
            kind: raw.kind,
            message: raw.message,
            severity: raw.severity,
            action,
        }
    }
}

/// Run every detector over `itinerary`.
///
/// Weather tips are produced only when `forecast` is given. Tips are ordered
/// by detector (weather, connection, budget, popularity, accessibility) and
/// then by position in the itinerary.
///
/// # Examples
/// ```
/// use tripweaver_core::{Itinerary, UserProfile};
/// use tripweaver_planner::proactive_tips;
///
/// assert!(proactive_tips(&Itinerary::default(), &UserProfile::default(), None).is_empty());
/// ```
#[must_use]
pub fn proactive_tips(
    itinerary: &Itinerary,
    profile: &UserProfile,
    forecast: Option<&WeatherForecast>,
) -> Vec<Tip> {
    let mut tips = Vec::new();
    if let Some(forecast) = forecast {
        detect::weather(itinerary, forecast, &mut tips);
    }
    detect::connections(itinerary, &mut tips);
    detect::budget(itinerary, profile, &mut tips);
    detect::popularity(itinerary, &mut tips);
    detect::accessibility(itinerary, profile, &mut tips);
    log::debug!(target: "tripweaver::tips", count = tips.len(); "tips generated");
    tips
}
