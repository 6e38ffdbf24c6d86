//! Projection of a recommendation result onto a view
//!
//! The renderer never looks up global state: it writes into an injected
//! [`RecommendationView`] that exposes two regions (city cards and the
//! travel-time table), a tab switch and an error surface. Every render fully
//! replaces what the previous one left behind.

pub mod html;
pub mod page;
pub mod terminal;

use tracing::{debug, error};

use crate::models::{City, RecommendationResult, TravelTime, TravelTimes};
use crate::{Result, WanderplanError};

pub use html::HtmlDocument;
pub use page::Page;
pub use terminal::TerminalReport;

/// Identifier of the view that shows rendered recommendations
pub const RECOMMENDATIONS_TAB: &str = "recommendations";

/// Output regions a view has to provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    CityCards,
    TravelTimes,
}

/// Output sink for rendered recommendations
pub trait RecommendationView {
    /// Switch the visible tab/section
    fn show_tab(&mut self, tab: &str);

    fn has_region(&self, region: Region) -> bool;

    /// Remove everything previously rendered into `region`
    fn clear(&mut self, region: Region) -> Result<()>;

    fn append_card(&mut self, card: CityCard) -> Result<()>;

    fn append_travel_time(&mut self, row: TravelTimeRow) -> Result<()>;

    /// Make `message` visible on the error surface
    fn show_error(&mut self, message: &str);
}

/// One rendered city summary
#[derive(Debug, Clone, PartialEq)]
pub struct CityCard {
    pub name: String,
    pub description: String,
    pub budget: String,
    /// Best seasons joined with ", "
    pub best_seasons: String,
    pub activities: Vec<String>,
}

impl From<&City> for CityCard {
    fn from(city: &City) -> Self {
        Self {
            name: city.name.clone(),
            description: city.description.clone(),
            budget: city.budget.clone(),
            best_seasons: city.best_seasons.join(", "),
            activities: city.activities.clone(),
        }
    }
}

/// One row of the travel-time table, already formatted for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelTimeRow {
    pub from: String,
    pub to: String,
    pub airplane: String,
    pub train: String,
}

impl TravelTimeRow {
    #[must_use]
    pub fn new(from: &str, to: &str, time: &TravelTime) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            airplane: time.airplane_label(),
            train: time.train_label(),
        }
    }
}

/// Counts of what a successful render produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    pub cards: usize,
    pub rows: usize,
}

/// Flatten the nested travel-time mapping into table rows, origin by origin,
/// following document order.
#[must_use]
pub fn travel_time_rows(travel_times: &TravelTimes) -> Vec<TravelTimeRow> {
    travel_times
        .iter()
        .flat_map(|(from, destinations)| {
            destinations
                .iter()
                .map(move |(to, time)| TravelTimeRow::new(from, to, time))
        })
        .collect()
}

/// Render `result` into `view`, replacing prior content.
///
/// Cards already appended stay in place if a later step fails.
pub fn render(
    result: &RecommendationResult,
    view: &mut dyn RecommendationView,
) -> Result<RenderSummary> {
    view.show_tab(RECOMMENDATIONS_TAB);

    if !view.has_region(Region::CityCards) || !view.has_region(Region::TravelTimes) {
        return Err(WanderplanError::render("Required containers not found"));
    }

    view.clear(Region::CityCards)?;
    view.clear(Region::TravelTimes)?;

    if result.cities.is_empty() {
        return Err(WanderplanError::render("No cities in recommendation result"));
    }

    for city in &result.cities {
        view.append_card(CityCard::from(city))?;
    }

    let rows = travel_time_rows(&result.travel_times);
    let summary = RenderSummary {
        cards: result.cities.len(),
        rows: rows.len(),
    };
    for row in rows {
        view.append_travel_time(row)?;
    }

    debug!("Rendered {} cards and {} travel-time rows", summary.cards, summary.rows);
    Ok(summary)
}

/// Render and report any failure on the view's error surface.
pub fn display_recommendations(
    result: &RecommendationResult,
    view: &mut dyn RecommendationView,
) -> Result<RenderSummary> {
    render(result, view).inspect_err(|err| {
        error!("Error displaying recommendations: {}", err);
        view.show_error(&err.user_message());
    })
}
