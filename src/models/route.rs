//! Multi-mode travel times between city pairs
//!
//! Produced by the travel-time endpoint: for every route the model names a
//! primary mode, hours per mode and the share of travellers per mode.
//! [`process_travel_times`] turns whatever the model wrote into that shape.

use serde::Deserialize;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::envelope::extract_json;
use crate::models::recommendation::{OrderedMap, coerce_number};

/// Modes the model is asked about, in the order used for default popularity
pub const TRANSPORT_MODES: [&str; 5] = ["airplane", "train", "bus", "car", "ferry"];

const PRIMARY_MODE_KEY: &str = "primaryMode";
const POPULARITY_KEY: &str = "popularity";
const DEFAULT_PRIMARY_MODE: &str = "airplane";

/// Normalised travel information for one origin/destination pair
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTimes {
    pub primary_mode: String,
    /// Hours per mode in document order; `None` when the mode is not possible
    pub times: OrderedMap<Option<f64>>,
    /// Percentage of travellers per mode
    pub popularity: OrderedMap<Option<f64>>,
}

/// Origin -> destination -> route, in document order
pub type RouteTable = OrderedMap<OrderedMap<RouteTimes>>;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRoute {
    Modes(OrderedMap<Value>),
    Other(Value),
}

impl RouteTimes {
    fn from_modes(modes: &OrderedMap<Value>) -> Self {
        let primary_mode = match modes.get(PRIMARY_MODE_KEY) {
            Some(Value::String(mode)) => mode.clone(),
            _ => modes
                .keys()
                .find(|key| *key != PRIMARY_MODE_KEY && *key != POPULARITY_KEY)
                .unwrap_or(DEFAULT_PRIMARY_MODE)
                .to_string(),
        };

        let times: OrderedMap<Option<f64>> = modes
            .iter()
            .filter(|(key, _)| *key != PRIMARY_MODE_KEY && *key != POPULARITY_KEY)
            .map(|(mode, hours)| (mode, coerce_number(hours)))
            .collect();

        let popularity: OrderedMap<Option<f64>> = match modes.get(POPULARITY_KEY) {
            Some(Value::Object(shares)) => shares
                .iter()
                .map(|(mode, share)| (mode.as_str(), coerce_number(share)))
                .collect(),
            _ => default_popularity(&primary_mode, &times),
        };

        Self {
            primary_mode,
            times,
            popularity,
        }
    }
}

/// 100 for the primary mode, 0 for other available modes, `None` otherwise
fn default_popularity(
    primary_mode: &str,
    times: &OrderedMap<Option<f64>>,
) -> OrderedMap<Option<f64>> {
    TRANSPORT_MODES
        .iter()
        .map(|&mode| {
            let share = match times.get(mode) {
                Some(Some(_)) if mode == primary_mode => Some(100.0),
                Some(Some(_)) => Some(0.0),
                _ => None,
            };
            (mode, share)
        })
        .collect()
}

impl Serialize for RouteTimes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.times.len() + 2))?;
        map.serialize_entry(PRIMARY_MODE_KEY, &self.primary_mode)?;
        for (mode, hours) in self.times.iter() {
            map.serialize_entry(mode, hours)?;
        }
        map.serialize_entry(POPULARITY_KEY, &self.popularity)?;
        map.end()
    }
}

/// Normalise the model's travel-time answer.
///
/// Text that is not a JSON object of objects yields an empty table. Route
/// entries that are not objects are skipped.
#[must_use]
pub fn process_travel_times(text: &str) -> RouteTable {
    let raw: OrderedMap<OrderedMap<RawRoute>> = match serde_json::from_str(extract_json(text)) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Error decoding travel times JSON: {}", e);
            return RouteTable::new();
        }
    };

    raw.into_iter()
        .map(|(from, routes)| {
            let routes: OrderedMap<RouteTimes> = routes
                .into_iter()
                .filter_map(|(to, route)| match route {
                    RawRoute::Modes(modes) => Some((to, RouteTimes::from_modes(&modes))),
                    RawRoute::Other(value) => {
                        debug!("Skipping route {} -> {}: {}", from, to, value);
                        None
                    }
                })
                .collect();
            (from, routes)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn route<'a>(table: &'a RouteTable, from: &str, to: &str) -> &'a RouteTimes {
        table.get(from).and_then(|routes| routes.get(to)).unwrap()
    }

    #[test]
    fn test_complete_route_is_kept() {
        let table = process_travel_times(
            r#"{"Paris, France": {"London, UK": {
                "primaryMode": "train", "airplane": 1.25, "train": 2.5, "bus": null,
                "popularity": {"airplane": 30, "train": 65, "bus": null}}}}"#,
        );

        let paris_london = route(&table, "Paris, France", "London, UK");
        assert_eq!(paris_london.primary_mode, "train");
        assert_eq!(paris_london.times.get("train"), Some(&Some(2.5)));
        assert_eq!(paris_london.times.get("bus"), Some(&None));
        assert_eq!(paris_london.popularity.get("train"), Some(&Some(65.0)));
        assert_eq!(paris_london.popularity.get("bus"), Some(&None));
    }

    #[test]
    fn test_primary_mode_defaults_to_first_listed_mode() {
        let table =
            process_travel_times(r#"{"A": {"B": {"popularity": {}, "train": 4, "airplane": 1}}}"#);
        assert_eq!(route(&table, "A", "B").primary_mode, "train");
    }

    #[test]
    fn test_primary_mode_defaults_to_airplane_without_modes() {
        let table = process_travel_times(r#"{"A": {"B": {}}}"#);
        let a_b = route(&table, "A", "B");
        assert_eq!(a_b.primary_mode, "airplane");
        assert!(a_b.times.is_empty());
    }

    #[rstest]
    #[case(json!(3), Some(3.0))]
    #[case(json!("2.5"), Some(2.5))]
    #[case(json!(null), None)]
    #[case(json!("about 4 hours"), None)]
    #[case(json!({"hours": 3}), None)]
    fn test_mode_times_are_coerced(#[case] hours: Value, #[case] expected: Option<f64>) {
        let text = json!({"A": {"B": {"primaryMode": "car", "car": hours}}}).to_string();
        let table = process_travel_times(&text);
        assert_eq!(route(&table, "A", "B").times.get("car"), Some(&expected));
    }

    #[test]
    fn test_missing_popularity_gets_defaults() {
        let table =
            process_travel_times(r#"{"A": {"B": {"airplane": 2, "train": 6, "ferry": null}}}"#);
        let popularity = &route(&table, "A", "B").popularity;

        let modes: Vec<&str> = popularity.keys().collect();
        assert_eq!(modes, TRANSPORT_MODES.to_vec());
        assert_eq!(popularity.get("airplane"), Some(&Some(100.0)));
        assert_eq!(popularity.get("train"), Some(&Some(0.0)));
        assert_eq!(popularity.get("bus"), Some(&None));
        assert_eq!(popularity.get("ferry"), Some(&None));
    }

    #[test]
    fn test_non_object_routes_are_skipped() {
        let table = process_travel_times(r#"{"A": {"B": "far away", "C": {"train": 1}}}"#);
        let destinations: Vec<&str> = table.get("A").unwrap().keys().collect();
        assert_eq!(destinations, vec!["C"]);
    }

    #[rstest]
    #[case("I could not work out travel times.")]
    #[case(r#"["A", "B"]"#)]
    #[case(r#"{"A": "B"}"#)]
    fn test_unusable_answer_is_empty(#[case] text: &str) {
        assert!(process_travel_times(text).is_empty());
    }

    #[test]
    fn test_fenced_answer_is_read() {
        let table = process_travel_times("```json\n{\"A\": {\"B\": {\"bus\": 9}}}\n```");
        assert_eq!(route(&table, "A", "B").primary_mode, "bus");
    }

    #[test]
    fn test_serialized_shape() {
        let table = process_travel_times(r#"{"A": {"B": {"train": "3"}}}"#);
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value["A"]["B"]["primaryMode"], "train");
        assert_eq!(value["A"]["B"]["train"], 3.0);
        assert_eq!(value["A"]["B"]["popularity"]["train"], 100.0);
        assert!(value["A"]["B"]["popularity"]["airplane"].is_null());
    }
}
