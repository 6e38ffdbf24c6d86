//! Plain-text rendering of a [`Page`] for the terminal

use std::fmt::{self, Display};

use crate::render::{CityCard, Page, TravelTimeRow};

pub struct TerminalReport<'a>(pub &'a Page);

impl Display for CityCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🏙️  {}", self.name)?;
        writeln!(f, "   {}", self.description)?;
        writeln!(f, "   💰 Budget: {}", self.budget)?;
        writeln!(f, "   📅 Best Seasons: {}", self.best_seasons)?;
        writeln!(f, "   🎯 Activities:")?;
        for activity in &self.activities {
            writeln!(f, "      • {activity}")?;
        }
        Ok(())
    }
}

fn column_width<'r>(header: &str, cells: impl Iterator<Item = &'r str>) -> usize {
    cells
        .map(|cell| cell.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or_default()
}

fn write_table(f: &mut fmt::Formatter<'_>, rows: &[TravelTimeRow]) -> fmt::Result {
    let from = column_width("From", rows.iter().map(|row| row.from.as_str()));
    let to = column_width("To", rows.iter().map(|row| row.to.as_str()));
    let airplane = column_width("Airplane", rows.iter().map(|row| row.airplane.as_str()));

    writeln!(f, "✈️  Travel Times Between Cities")?;
    writeln!(f, "   {:from$}  {:to$}  {:airplane$}  Train", "From", "To", "Airplane")?;
    for row in rows {
        writeln!(
            f,
            "   {:from$}  {:to$}  {:airplane$}  {}",
            row.from, row.to, row.airplane, row.train
        )?;
    }
    Ok(())
}

impl Display for TerminalReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = self.0;

        if let Some(error) = page.error() {
            writeln!(f, "❌ {error}")?;
        }

        for card in page.cards() {
            writeln!(f, "{card}")?;
        }

        if !page.travel_times().is_empty() {
            write_table(f, page.travel_times())?;
        }
        Ok(())
    }
}
