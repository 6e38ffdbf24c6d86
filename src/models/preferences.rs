//! Trip preferences collected from the user

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::WanderplanError;

/// Budget tier requested by the user and assigned to each recommended city
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Budget {
    #[serde(alias = "high")]
    Luxury,
    #[default]
    #[serde(alias = "medium")]
    Moderate,
    #[serde(alias = "low")]
    #[value(name = "budget-friendly")]
    BudgetFriendly,
}

impl Budget {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Budget::Luxury => "luxury",
            Budget::Moderate => "moderate",
            Budget::BudgetFriendly => "budget-friendly",
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Budget {
    type Err = WanderplanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "luxury" | "high" => Ok(Budget::Luxury),
            "moderate" | "medium" => Ok(Budget::Moderate),
            "budget-friendly" | "budget" | "low" => Ok(Budget::BudgetFriendly),
            other => Err(WanderplanError::validation(format!(
                "Unknown budget '{other}'. Must be one of: luxury, moderate, budget-friendly"
            ))),
        }
    }
}

/// Trip constraints, read fresh for every request.
///
/// Fields are taken as entered; empty values are allowed and end up as empty
/// text in the prompt. Dates are kept in whatever textual form the input
/// produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub starting_city: String,
    pub activities: Vec<String>,
    pub budget: Budget,
    pub regions: Vec<String>,
    pub start_date: String,
    pub end_date: String,
}

impl Preferences {
    #[must_use]
    pub fn new(starting_city: impl Into<String>) -> Self {
        Self {
            starting_city: starting_city.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_activities<I, S>(mut self, activities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.activities = activities.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    #[must_use]
    pub fn with_dates(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_date = start.into();
        self.end_date = end.into();
        self
    }
}
