//! Data models for Wanderplan
//!
//! - Preferences: trip constraints collected from the user
//! - Recommendation: the decoded model answer (cities and travel times)
//! - Route: multi-mode travel times from the travel-time endpoint

pub mod preferences;
pub mod recommendation;
pub mod route;

pub use preferences::{Budget, Preferences};
pub use recommendation::{
    City, Coordinates, OrderedMap, RecommendationResult, TravelTime, TravelTimes,
};
pub use route::{RouteTable, RouteTimes, process_travel_times};
