//! Standalone HTML rendering of a [`Page`]

use std::fmt::{self, Display, Write};

use crate::render::{CityCard, Page, RECOMMENDATIONS_TAB, TravelTimeRow};

/// Full HTML document for a page: error element, card grid and travel-time table
pub struct HtmlDocument<'a> {
    page: &'a Page,
    title: &'a str,
}

impl<'a> HtmlDocument<'a> {
    #[must_use]
    pub fn new(page: &'a Page) -> Self {
        Self {
            page,
            title: "Vacation Recommendations",
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn write_card(out: &mut impl Write, card: &CityCard) -> fmt::Result {
    writeln!(out, r#"<div class="col-md-4 mb-4">"#)?;
    writeln!(out, r#"  <div class="card">"#)?;
    writeln!(out, r#"    <div class="card-body">"#)?;
    writeln!(out, r#"      <h5 class="card-title">{}</h5>"#, escape(&card.name))?;
    writeln!(out, r#"      <p class="card-text">{}</p>"#, escape(&card.description))?;
    writeln!(out, "      <p><strong>Budget:</strong> {}</p>", escape(&card.budget))?;
    writeln!(
        out,
        "      <p><strong>Best Seasons:</strong> {}</p>",
        escape(&card.best_seasons)
    )?;
    writeln!(out, "      <p><strong>Activities:</strong></p>")?;
    writeln!(out, "      <ul>")?;
    for activity in &card.activities {
        writeln!(out, "        <li>{}</li>", escape(activity))?;
    }
    writeln!(out, "      </ul>")?;
    writeln!(out, "    </div>")?;
    writeln!(out, "  </div>")?;
    writeln!(out, "</div>")
}

fn write_table(out: &mut impl Write, rows: &[TravelTimeRow]) -> fmt::Result {
    writeln!(out, "<h3>Travel Times Between Cities</h3>")?;
    writeln!(out, r#"<table class="table table-striped">"#)?;
    writeln!(
        out,
        "  <thead><tr><th>From</th><th>To</th><th>Airplane</th><th>Train</th></tr></thead>"
    )?;
    writeln!(out, "  <tbody>")?;
    for row in rows {
        writeln!(
            out,
            "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&row.from),
            escape(&row.to),
            escape(&row.airplane),
            escape(&row.train)
        )?;
    }
    writeln!(out, "  </tbody>")?;
    writeln!(out, "</table>")
}

impl Display for HtmlDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = self.page;
        let active = page.active_tab() == Some(RECOMMENDATIONS_TAB);

        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, r#"<html lang="en">"#)?;
        writeln!(f, "<head>")?;
        writeln!(f, r#"<meta charset="utf-8">"#)?;
        writeln!(f, "<title>{}</title>", escape(self.title))?;
        writeln!(f, "</head>")?;
        writeln!(f, "<body>")?;

        let display = if page.error().is_some() { "block" } else { "none" };
        writeln!(
            f,
            r#"<div id="errorMessage" class="alert alert-danger" style="display: {display}">{}</div>"#,
            escape(page.error().unwrap_or_default())
        )?;

        writeln!(
            f,
            r#"<section id="{RECOMMENDATIONS_TAB}" class="tab-pane{}">"#,
            if active { " active" } else { "" }
        )?;
        writeln!(f, r#"<div id="cityCards" class="row">"#)?;
        for card in page.cards() {
            write_card(f, card)?;
        }
        writeln!(f, "</div>")?;
        writeln!(f, r#"<div id="travelTimes">"#)?;
        if !page.travel_times().is_empty() {
            write_table(f, page.travel_times())?;
        }
        writeln!(f, "</div>")?;
        writeln!(f, "</section>")?;

        writeln!(f, "</body>")?;
        writeln!(f, "</html>")
    }
}
