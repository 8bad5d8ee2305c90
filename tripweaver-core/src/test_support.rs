//! Shared fixtures for unit and behaviour tests across the workspace.

use crate::{Activity, ActivityInstance, Day, Itinerary, Pace, UserProfile, VisitDuration};

/// Museum, restaurant and park used by ranking scenarios.
#[must_use]
pub fn museum_restaurant_park() -> Vec<Activity> {
    vec![
        Activity::new("Museum")
            .with_id("museum")
            .with_types(["museum"])
            .with_rating(4.7)
            .with_price_level(3),
        Activity::new("Restaurant")
            .with_id("restaurant")
            .with_types(["restaurant"])
            .with_rating(4.5)
            .with_price_level(2),
        Activity::new("Park")
            .with_id("park")
            .with_types(["park"])
            .with_rating(4.3)
            .with_price_level(0),
    ]
}

/// Profile interested in culture and food on a moderate budget.
#[must_use]
pub fn culture_food_profile() -> UserProfile {
    UserProfile::new()
        .with_interests(["culture", "food"])
        .with_budget(2)
        .with_pace(Pace::Moderate)
}

/// Schedule `activities` on one day, two hours apart from 09:00.
#[must_use]
pub fn single_day(date: &str, activities: Vec<Activity>) -> Day {
    let instances = activities
        .into_iter()
        .zip(0u32..)
        .map(|(activity, slot)| {
            let start = 9 + slot * 2;
            ActivityInstance::new(activity)
                .with_times(format!("{start:02}:00"), format!("{:02}:00", start + 2))
                .with_duration(VisitDuration::Text("2 hours".into()))
        })
        .collect();
    Day::new(date, instances)
}

/// A varied, highly rated five-day itinerary priced for a tier-2 budget.
///
/// It scores in the Excellent band for [`culture_food_profile`].
#[must_use]
pub fn excellent_itinerary() -> Itinerary {
    let days = (1..=5)
        .map(|n| {
            let activities = if n % 2 == 1 {
                vec![
                    Activity::new(format!("Gallery {n}"))
                        .with_types(["art_gallery", "museum"])
                        .with_rating(4.9)
                        .with_price_level(2),
                    Activity::new(format!("Bistro {n}"))
                        .with_types(["restaurant", "food"])
                        .with_rating(4.8)
                        .with_price_level(2),
                    Activity::new(format!("Garden {n}"))
                        .with_types(["park", "garden"])
                        .with_rating(4.7)
                        .with_price_level(2),
                ]
            } else {
                vec![
                    Activity::new(format!("Cathedral {n}"))
                        .with_types(["church", "landmark"])
                        .with_rating(4.8)
                        .with_price_level(2),
                    Activity::new(format!("Market Hall {n}"))
                        .with_types(["store", "market"])
                        .with_rating(4.6)
                        .with_price_level(2),
                    Activity::new(format!("Riverside Cafe {n}"))
                        .with_types(["cafe", "bakery"])
                        .with_rating(4.7)
                        .with_price_level(2),
                ]
            };
            single_day(&format!("2024-06-{n:02}"), activities)
        })
        .collect();
    Itinerary::new(days)
}
