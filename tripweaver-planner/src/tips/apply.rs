//! Turning a tip into itinerary annotations.

use tripweaver_core::{ActivityInstance, Itinerary, UserProfile};

use super::{PopularActivity, Tip, TipAction};
use crate::plain_number;

const RAIN_NOTE: &str =
    "Weather alert: Consider rescheduling outdoor activities due to expected rain.";
const TRANSPORT_SUGGESTION: &str =
    "Consider booking transportation in advance for this tight connection.";
const BUDGET_SUGGESTION: &str =
    "Consider cheaper alternatives for expensive activities to stay within budget.";
const FAMILY_NOTE: &str =
    "This activity might not be suitable for children. Consider family-friendly alternatives.";
const ACCESSIBILITY_NOTE: &str =
    "This activity might have accessibility challenges. Check for accessible alternatives.";

fn annotate(
    itinerary: &mut Itinerary,
    name: &str,
    write: impl FnOnce(&mut ActivityInstance),
) {
    match itinerary.first_named_mut(name) {
        Some(instance) => write(instance),
        None => log::debug!(target: "tripweaver::tips", activity = name; "tip target not in itinerary"),
    }
}

fn popularity_summary(popular: &PopularActivity) -> String {
    format!(
        "{}★, {} reviews",
        plain_number(popular.rating),
        popular.review_count
    )
}

/// Apply `tip` to a copy of `itinerary` and return the copy.
///
/// Weather tips annotate the matching day, connection and budget tips append
/// itinerary-level notes, and activity tips annotate the first visit whose
/// name matches. Itineraries that schedule two activities with the same name
/// only ever have the first annotated. Other actions keep the tip's message
/// as an itinerary-level tip.
///
/// # Examples
/// ```
/// use tripweaver_core::{Itinerary, UserProfile};
/// use tripweaver_planner::{Severity, Tip, TipAction, TipKind, apply_tip};
///
/// let tip = Tip {
///     kind: TipKind::General,
///     message: "Carry cash".into(),
///     severity: Severity::Low,
///     action: TipAction::General,
/// };
/// let original = Itinerary::default();
/// let updated = apply_tip(&original, &tip, &UserProfile::default());
/// assert_eq!(updated.ai_tips, ["Carry cash"]);
/// assert!(original.ai_tips.is_empty());
/// ```
#[must_use]
pub fn apply_tip(itinerary: &Itinerary, tip: &Tip, _profile: &UserProfile) -> Itinerary {
    let mut updated = itinerary.clone();
    match &tip.action {
        TipAction::RescheduleOutdoor(reschedule) => {
            if let Some(day) = updated
                .days
                .iter_mut()
                .find(|day| day.date == reschedule.day_date)
            {
                day.weather_note = Some(RAIN_NOTE.to_owned());
                day.suggested_changes = reschedule
                    .outdoor_activities
                    .iter()
                    .map(|name| format!("Move '{name}' to a drier day"))
                    .chain(
                        reschedule
                            .indoor_activities
                            .iter()
                            .map(|name| format!("Keep '{name}' as an indoor option")),
                    )
                    .collect();
            }
        }
        TipAction::SuggestTransport(connection) => {
            updated.transportation_notes.push(format!(
                "'{}' to '{}' ({}h gap): {TRANSPORT_SUGGESTION}",
                connection.from_activity, connection.to_activity, connection.time_gap
            ));
        }
        TipAction::SuggestAlternatives(overrun) => {
            let mut note = format!(
                "Day total ${} against a daily budget of ${}",
                overrun.day_total, overrun.daily_budget
            );
            if !overrun.expensive_activities.is_empty() {
                note.push_str(" (expensive: ");
                note.push_str(&overrun.expensive_activities.join(", "));
                note.push(')');
            }
            note.push_str(": ");
            note.push_str(BUDGET_SUGGESTION);
            updated.budget_notes.push(note);
        }
        TipAction::SuggestReservation(popular) => {
            let note = format!(
                "Highly rated ({}) - Consider making a reservation.",
                popularity_summary(popular)
            );
            annotate(&mut updated, &popular.activity_name, |instance| {
                instance.reservation_note = Some(note);
            });
        }
        TipAction::SuggestBooking(popular) => {
            let note = format!(
                "Very popular ({}) - Book tickets in advance to avoid lines.",
                popularity_summary(popular)
            );
            annotate(&mut updated, &popular.activity_name, |instance| {
                instance.booking_note = Some(note);
            });
        }
        TipAction::SuggestFamilyAlternative(flagged) => {
            annotate(&mut updated, &flagged.activity_name, |instance| {
                instance.family_note = Some(FAMILY_NOTE.to_owned());
            });
        }
        TipAction::SuggestAccessibleAlternative(flagged) => {
            annotate(&mut updated, &flagged.activity_name, |instance| {
                instance.accessibility_note = Some(ACCESSIBILITY_NOTE.to_owned());
            });
        }
        TipAction::SuggestIndoor(_) | TipAction::General => {
            updated.ai_tips.push(tip.message.clone());
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tripweaver_core::Activity;
    use tripweaver_core::test_support::single_day;

    use crate::tips::{
        BudgetOverrun, Severity, TipKind, UnsuitableActivity, WeatherReschedule,
    };

    #[fixture]
    fn rainy_trip() -> Itinerary {
        Itinerary::new(vec![single_day(
            "2024-06-01",
            vec![
                Activity::new("Park").with_types(["park"]),
                Activity::new("Museum").with_types(["museum"]),
                Activity::new("Park").with_types(["park"]),
            ],
        )])
    }

    fn tip(action: TipAction) -> Tip {
        Tip {
            kind: TipKind::General,
            message: "note".into(),
            severity: Severity::Medium,
            action,
        }
    }

    #[rstest]
    fn weather_tip_annotates_day(rainy_trip: Itinerary) {
        let action = TipAction::RescheduleOutdoor(WeatherReschedule {
            day_date: "2024-06-01".into(),
            outdoor_activities: vec!["Park".into()],
            indoor_activities: vec!["Museum".into()],
        });
        let updated = apply_tip(&rainy_trip, &tip(action), &UserProfile::default());
        let day = &updated.days[0];
        assert_eq!(day.weather_note.as_deref(), Some(RAIN_NOTE));
        assert_eq!(
            day.suggested_changes,
            [
                "Move 'Park' to a drier day",
                "Keep 'Museum' as an indoor option"
            ]
        );
        assert!(rainy_trip.days[0].weather_note.is_none());
    }

    #[rstest]
    fn duplicate_names_only_annotate_the_first(rainy_trip: Itinerary) {
        let action = TipAction::SuggestFamilyAlternative(UnsuitableActivity {
            activity_name: "Park".into(),
            activity_type: "park".into(),
        });
        let updated = apply_tip(&rainy_trip, &tip(action), &UserProfile::default());
        let notes: Vec<_> = updated
            .instances()
            .map(|i| i.family_note.is_some())
            .collect();
        assert_eq!(notes, [true, false, false]);
    }

    #[rstest]
    fn budget_tip_appends_note(rainy_trip: Itinerary) {
        let action = TipAction::SuggestAlternatives(BudgetOverrun {
            day_total: 270,
            daily_budget: 200,
            expensive_activities: vec!["Caviar Bar".into()],
        });
        let updated = apply_tip(&rainy_trip, &tip(action), &UserProfile::default());
        assert_eq!(
            updated.budget_notes,
            [format!(
                "Day total $270 against a daily budget of $200 (expensive: Caviar Bar): {BUDGET_SUGGESTION}"
            )]
        );
    }

    #[rstest]
    fn unknown_target_leaves_activities_untouched(rainy_trip: Itinerary) {
        let action = TipAction::SuggestBooking(PopularActivity {
            activity_name: "Elsewhere".into(),
            rating: 4.8,
            review_count: 9000,
        });
        let updated = apply_tip(&rainy_trip, &tip(action), &UserProfile::default());
        assert_eq!(updated, rainy_trip);
    }
}
