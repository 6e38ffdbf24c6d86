//! In-memory page holding the rendered regions

use crate::render::{CityCard, RecommendationView, Region, TravelTimeRow};
use crate::{Result, WanderplanError};

/// The default view: two regions, an active tab and an error surface.
///
/// A region that was never provided stays `None`, and writing to it fails the
/// same way a missing page element would.
#[derive(Debug, Clone)]
pub struct Page {
    active_tab: Option<String>,
    city_cards: Option<Vec<CityCard>>,
    travel_times: Option<Vec<TravelTimeRow>>,
    error: Option<String>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active_tab: None,
            city_cards: Some(Vec::new()),
            travel_times: Some(Vec::new()),
            error: None,
        }
    }

    /// Page lacking one of its output regions
    #[must_use]
    pub fn without_region(region: Region) -> Self {
        let mut page = Self::new();
        match region {
            Region::CityCards => page.city_cards = None,
            Region::TravelTimes => page.travel_times = None,
        }
        page
    }

    #[must_use]
    pub fn active_tab(&self) -> Option<&str> {
        self.active_tab.as_deref()
    }

    #[must_use]
    pub fn cards(&self) -> &[CityCard] {
        self.city_cards.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn travel_times(&self) -> &[TravelTimeRow] {
        self.travel_times.as_deref().unwrap_or_default()
    }

    /// Message on the error surface, if it is visible
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

fn missing(region: Region) -> WanderplanError {
    WanderplanError::render(format!("Region {region:?} not found"))
}

impl RecommendationView for Page {
    fn show_tab(&mut self, tab: &str) {
        self.active_tab = Some(tab.to_string());
    }

    fn has_region(&self, region: Region) -> bool {
        match region {
            Region::CityCards => self.city_cards.is_some(),
            Region::TravelTimes => self.travel_times.is_some(),
        }
    }

    fn clear(&mut self, region: Region) -> Result<()> {
        match region {
            Region::CityCards => self
                .city_cards
                .as_mut()
                .ok_or_else(|| missing(region))?
                .clear(),
            Region::TravelTimes => self
                .travel_times
                .as_mut()
                .ok_or_else(|| missing(region))?
                .clear(),
        }
        Ok(())
    }

    fn append_card(&mut self, card: CityCard) -> Result<()> {
        self.city_cards
            .as_mut()
            .ok_or_else(|| missing(Region::CityCards))?
            .push(card);
        Ok(())
    }

    fn append_travel_time(&mut self, row: TravelTimeRow) -> Result<()> {
        self.travel_times
            .as_mut()
            .ok_or_else(|| missing(Region::TravelTimes))?
            .push(row);
        Ok(())
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_region_rejects_writes() {
        let mut page = Page::without_region(Region::CityCards);
        assert!(!page.has_region(Region::CityCards));
        assert!(page.has_region(Region::TravelTimes));
        assert!(page.clear(Region::CityCards).is_err());
        assert!(page.clear(Region::TravelTimes).is_ok());
        assert!(page.cards().is_empty());
    }

    #[test]
    fn test_error_surface() {
        let mut page = Page::new();
        assert!(page.error().is_none());
        page.show_error("Error: boom");
        assert_eq!(page.error(), Some("Error: boom"));
        page.clear_error();
        assert!(page.error().is_none());
    }
}
