//! Prompt construction for the recommendation request
//!
//! The prompt restates every preference field verbatim, spells out the JSON
//! schema the answer has to follow, and lists the ranking requirements.

use crate::models::Preferences;
use crate::models::route::TRANSPORT_MODES;

const RESPONSE_SCHEMA: &str = r#"{
    "cities": [
        {
            "name": "City, Country",
            "activities": ["activity1", "activity2", ...],
            "budget": "luxury/moderate/budget-friendly",
            "bestSeasons": ["spring", "summer", "fall", "winter"],
            "description": "Brief description of the city",
            "continent": "Continent name",
            "country": "Country name",
            "coordinates": {"lat": latitude, "lng": longitude}
        }
    ],
    "travelTimes": {
        "City1, Country1": {
            "City2, Country2": {"airplane": hours, "train": hours}
        }
    }
}"#;

/// Build the recommendation prompt for a set of preferences.
///
/// No field is validated; empty values are interpolated as empty text.
#[must_use]
pub fn build_prompt(preferences: &Preferences) -> String {
    let starting_city = &preferences.starting_city;
    format!(
        "I'm planning a vacation with the following preferences:
- Starting from: {starting_city}
- Activities: {activities}
- Budget: {budget}
- Preferred regions: {regions}
- Travel dates: {start_date} to {end_date}

Please recommend 5-8 major cities that would be perfect for this vacation.
For each city, provide the following information in JSON format:
{RESPONSE_SCHEMA}

Please ensure the response is in valid JSON format and includes both the cities array and travelTimes object.
Make sure the cities are well-distributed geographically and offer the activities requested.
Each city should offer at least 2 of the requested activities.
Do NOT include {starting_city} in the recommended cities.
For each city, determine if it's luxury, moderate, or budget-friendly based on average costs.
Include approximate travel times between cities using both airplane and train (if available).
Use null for a travel mode that is not available between two cities.
",
        activities = preferences.activities.join(", "),
        budget = preferences.budget,
        regions = preferences.regions.join(", "),
        start_date = preferences.start_date,
        end_date = preferences.end_date,
    )
}

/// Prompt asking the model to normalise a free-form city name to "City, Country".
#[must_use]
pub fn city_correction_prompt(starting_city: &str) -> String {
    format!(
        "Please correct this city name to its proper format (city, country):
{starting_city}
Return ONLY the corrected city name in the format \"City, Country\" with proper capitalization.
"
    )
}

/// Prompt asking for the most popular mode, hours per mode and popularity
/// shares between every pair of `cities`.
#[must_use]
pub fn travel_times_prompt(cities: &[String]) -> String {
    format!(
        r#"For each pair of cities in the following list, determine the most popular transportation mode and travel time between them.
Format the response as a JSON object where each city pair is represented as:
{{
    "from_city": {{
        "to_city": {{
            "primaryMode": "mode_name",
            "airplane": hours or null,
            "train": hours or null,
            "bus": hours or null,
            "car": hours or null,
            "ferry": hours or null,
            "popularity": {{
                "airplane": percentage or null,
                "train": percentage or null,
                "bus": percentage or null,
                "car": percentage or null,
                "ferry": percentage or null
            }}
        }}
    }}
}}

Available transportation modes: {modes}

Cities: {cities}

For each route:
1. Determine which transportation mode is most popular between these cities
2. Set that as the primaryMode
3. Provide the travel time for that mode
4. Also include other available modes with their times
5. For each mode, provide a rough percentage of travelers who use that mode (null if not applicable)
6. If a route is not possible with a particular mode, use null for both the time and popularity
7. For international routes, consider both airplane and train options if applicable
8. For domestic routes, consider all relevant transportation options
"#,
        modes = TRANSPORT_MODES.join(", "),
        cities = cities.join(", "),
    )
}
