//! Day-by-day itineraries and the annotations tip application writes.
//!
//! Every transform in the engine takes an itinerary by reference and returns
//! a fresh value built with [`Clone`]; the caller's itinerary is never
//! modified, so before/after comparisons need no locking.

use serde::{Deserialize, Serialize};

use crate::Activity;

/// Hours assumed when a visit duration is missing or unreadable.
pub const DEFAULT_VISIT_HOURS: f64 = 2.0;

/// How long a scheduled visit lasts.
///
/// Upstream planners send either a bare number of hours or a phrase such as
/// `"3 hours"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisitDuration {
    /// A number of hours.
    Hours(f64),
    /// A free-text phrase whose first word is the hour count.
    Text(String),
}

impl VisitDuration {
    /// Resolve the duration in hours.
    ///
    /// Text is read from its first whitespace-separated word as a whole
    /// number; anything unreadable counts as [`DEFAULT_VISIT_HOURS`].
    ///
    /// # Examples
    /// ```
    /// use tripweaver_core::VisitDuration;
    ///
    /// assert_eq!(VisitDuration::Text("3 hours".into()).hours(), 3.0);
    /// assert_eq!(VisitDuration::Text("a while".into()).hours(), 2.0);
    /// assert_eq!(VisitDuration::Hours(1.5).hours(), 1.5);
    /// ```
    #[must_use]
    pub fn hours(&self) -> f64 {
        match self {
            Self::Hours(h) if h.is_finite() => *h,
            Self::Hours(_) => DEFAULT_VISIT_HOURS,
            Self::Text(text) => text
                .split_whitespace()
                .next()
                .and_then(|word| word.parse::<u32>().ok())
                .map_or(DEFAULT_VISIT_HOURS, f64::from),
        }
    }
}

/// A scheduled visit to an activity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityInstance {
    /// The activity snapshot being visited.
    #[serde(flatten)]
    pub activity: Activity,
    /// Start time as `HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// End time as `HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Planned visit length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<VisitDuration>,
    /// Advice to reserve ahead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_note: Option<String>,
    /// Advice to book tickets ahead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_note: Option<String>,
    /// Family suitability warning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_note: Option<String>,
    /// Accessibility warning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility_note: Option<String>,
}

impl ActivityInstance {
    /// Schedule `activity` without times.
    #[must_use]
    pub fn new(activity: Activity) -> Self {
        Self {
            activity,
            ..Self::default()
        }
    }

    /// Set start and end times.
    #[must_use]
    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self.end_time = Some(end.into());
        self
    }

    /// Set the planned duration.
    #[must_use]
    pub fn with_duration(mut self, duration: VisitDuration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Planned duration in hours, defaulting to two.
    #[must_use]
    pub fn duration_hours(&self) -> f64 {
        self.duration
            .as_ref()
            .map_or(DEFAULT_VISIT_HOURS, VisitDuration::hours)
    }

    /// Replace the visited activity while keeping this slot's schedule.
    ///
    /// Notes attached to the previous activity are dropped.
    #[must_use]
    pub fn replaced_with(&self, activity: Activity) -> Self {
        Self {
            activity,
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            duration: self.duration.clone(),
            ..Self::default()
        }
    }
}

/// One day of an itinerary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Day {
    /// Calendar date, usually `YYYY-MM-DD`.
    pub date: String,
    /// Visits in schedule order.
    pub activities: Vec<ActivityInstance>,
    /// Weather advice for the day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_note: Option<String>,
    /// Schedule changes proposed for the day.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggested_changes: Vec<String>,
}

impl Day {
    /// Create a day with the given visits.
    #[must_use]
    pub fn new(date: impl Into<String>, activities: Vec<ActivityInstance>) -> Self {
        Self {
            date: date.into(),
            activities,
            ..Self::default()
        }
    }

    /// Label used in human-readable messages.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.date.is_empty() {
            "unknown"
        } else {
            &self.date
        }
    }
}

/// An ordered sequence of days plus itinerary-level advice.
///
/// # Examples
/// ```
/// use tripweaver_core::{Activity, ActivityInstance, Day, Itinerary};
///
/// let day = Day::new("2024-06-01", vec![ActivityInstance::new(Activity::new("Park"))]);
/// let itinerary = Itinerary::new(vec![day]);
/// assert_eq!(itinerary.activity_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Itinerary {
    /// Days in travel order.
    pub days: Vec<Day>,
    /// Transport advice between visits.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transportation_notes: Vec<String>,
    /// Spending advice.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub budget_notes: Vec<String>,
    /// General advice that does not fit another slot.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ai_tips: Vec<String>,
}

impl Itinerary {
    /// Create an itinerary from days.
    #[must_use]
    pub fn new(days: Vec<Day>) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    /// Iterate over every scheduled visit in order.
    pub fn instances(&self) -> impl Iterator<Item = &ActivityInstance> {
        self.days.iter().flat_map(|day| day.activities.iter())
    }

    /// Iterate over every scheduled activity in order.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.instances().map(|instance| &instance.activity)
    }

    /// Number of scheduled visits.
    #[must_use]
    pub fn activity_count(&self) -> usize {
        self.days.iter().map(|day| day.activities.len()).sum()
    }

    /// Report whether no visits are scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activity_count() == 0
    }

    /// Find the first visit whose activity has `name`.
    ///
    /// Itineraries may schedule two activities with the same name; only the
    /// first is returned.
    pub fn first_named_mut(&mut self, name: &str) -> Option<&mut ActivityInstance> {
        self.days
            .iter_mut()
            .flat_map(|day| day.activities.iter_mut())
            .find(|instance| instance.activity.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(VisitDuration::Text("4 hours".into()), 4.0)]
    #[case(VisitDuration::Text("2.5 hours".into()), 2.0)]
    #[case(VisitDuration::Text(String::new()), 2.0)]
    #[case(VisitDuration::Hours(f64::NAN), 2.0)]
    fn parses_leading_hour_count(#[case] duration: VisitDuration, #[case] expected: f64) {
        assert!((duration.hours() - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    fn instance_flattens_activity_fields() {
        let raw = r#"{"name":"Louvre","types":["museum"],"rating":4.8,
            "start_time":"09:00","end_time":"12:00","duration":"3 hours"}"#;
        let instance: ActivityInstance = serde_json::from_str(raw).expect("instance parses");
        assert_eq!(instance.activity.name, "Louvre");
        assert_eq!(instance.start_time.as_deref(), Some("09:00"));
        assert!((instance.duration_hours() - 3.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn replacement_keeps_schedule() {
        let mut original = ActivityInstance::new(Activity::new("Old"))
            .with_times("10:00", "12:00")
            .with_duration(VisitDuration::Hours(2.0));
        original.booking_note = Some("book".into());
        let replaced = original.replaced_with(Activity::new("New"));
        assert_eq!(replaced.activity.name, "New");
        assert_eq!(replaced.start_time, original.start_time);
        assert_eq!(replaced.duration, original.duration);
        assert!(replaced.booking_note.is_none());
    }

    #[rstest]
    fn first_named_mut_picks_earliest_match() {
        let days = vec![
            Day::new("d1", vec![ActivityInstance::new(Activity::new("Cafe"))]),
            Day::new("d2", vec![ActivityInstance::new(Activity::new("Cafe"))]),
        ];
        let mut itinerary = Itinerary::new(days);
        if let Some(instance) = itinerary.first_named_mut("Cafe") {
            instance.reservation_note = Some("reserve".into());
        }
        assert!(itinerary.days[0].activities[0].reservation_note.is_some());
        assert!(itinerary.days[1].activities[0].reservation_note.is_none());
    }
}
