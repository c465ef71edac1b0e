//! Concrete demand and candidate records.

use serde::{Deserialize, Serialize};

use crate::solver::SelectionResult;
use crate::traits::{Demand, Site};

/// A census block group (or any other area) reduced to a weighted point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandPoint {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub population: f64,
}

impl DemandPoint {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64, population: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
            population,
        }
    }
}

impl Demand for DemandPoint {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn location(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }

    fn population(&self) -> f64 {
        self.population
    }
}

/// A candidate distribution site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSite {
    pub id: String,
    /// Display name, carried through to results untouched.
    pub name: String,
    /// Site type tag used for request-side filtering.
    pub category: String,
    pub lat: f64,
    pub lon: f64,
}

impl CandidateSite {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        lat: f64,
        lon: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            lat,
            lon,
        }
    }
}

impl Site for CandidateSite {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn location(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

/// Selection over [`DemandPoint`]s and [`CandidateSite`]s.
pub type SiteSelection = SelectionResult<String, String>;
