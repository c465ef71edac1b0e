//! Request-level entry point: resolve ids against the catalog, filter sites by
//! category, solve, and shape the result for serialization.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::{DEFAULT_CAPACITY, SolveCache};
use crate::catalog::{CachedCatalog, Catalog};
use crate::error::OptimizeError;
use crate::model::{CandidateSite, DemandPoint, SiteSelection};
use crate::solver::SolveOptions;

pub const DEFAULT_RADIUS_MILES: f64 = 2.0;
pub const DEFAULT_K: usize = 5;
pub const DEFAULT_SITE_TYPES: &[&str] = &[
    "school",
    "place_of_worship",
    "community_centre",
    "fire_station",
    "library",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    /// Demand ids making up the affected area. Unknown ids are ignored.
    #[serde(rename = "affected_geoids")]
    pub affected_ids: Vec<String>,
    #[serde(default = "default_radius")]
    pub radius_miles: f64,
    #[serde(default = "default_k")]
    pub k: usize,
    /// Allowed candidate categories.
    #[serde(default = "default_site_types")]
    pub site_types: Vec<String>,
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS_MILES
}

fn default_k() -> usize {
    DEFAULT_K
}

fn default_site_types() -> Vec<String> {
    DEFAULT_SITE_TYPES.iter().map(|s| s.to_string()).collect()
}

impl OptimizationRequest {
    pub fn new(affected_ids: Vec<String>) -> Self {
        Self {
            affected_ids,
            radius_miles: DEFAULT_RADIUS_MILES,
            k: DEFAULT_K,
            site_types: default_site_types(),
        }
    }

    pub fn radius(mut self, radius_miles: f64) -> Self {
        self.radius_miles = radius_miles;
        self
    }

    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn site_types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.site_types = types.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedSiteView {
    pub site_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<&CandidateSite> for SelectedSiteView {
    fn from(site: &CandidateSite) -> Self {
        Self {
            site_id: site.id.clone(),
            name: site.name.clone(),
            category: site.category.clone(),
            lat: site.lat,
            lon: site.lon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub total_population: f64,
    pub covered_population: f64,
    pub coverage_percent: f64,
    pub selected_sites: Vec<SelectedSiteView>,
}

impl OptimizationResult {
    /// Pair a selection with the site slice it was solved over.
    fn from_selection(selection: &SiteSelection, sites: &[CandidateSite]) -> Self {
        Self {
            total_population: selection.total_population,
            covered_population: selection.covered_population,
            coverage_percent: selection.coverage_percent,
            selected_sites: selection
                .selected
                .iter()
                .map(|selected| SelectedSiteView::from(&sites[selected.index]))
                .collect(),
        }
    }
}

/// Serves [`OptimizationRequest`]s from a cached catalog.
pub struct Optimizer<C> {
    catalog: CachedCatalog<C>,
    results: SolveCache,
}

impl<C: Catalog> Optimizer<C> {
    pub fn new(catalog: C, options: SolveOptions) -> Self {
        Self::with_cache_capacity(catalog, options, DEFAULT_CAPACITY)
    }

    /// Keep at most `capacity` cached selections.
    pub fn with_cache_capacity(catalog: C, options: SolveOptions, capacity: usize) -> Self {
        Self {
            catalog: CachedCatalog::new(catalog),
            results: SolveCache::with_capacity(options, capacity),
        }
    }

    pub fn catalog(&self) -> &CachedCatalog<C> {
        &self.catalog
    }

    pub fn results(&self) -> &SolveCache {
        &self.results
    }

    #[tracing::instrument(skip_all, fields(affected = request.affected_ids.len(), radius_miles = request.radius_miles, k = request.k))]
    pub fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationResult, OptimizeError> {
        let snapshot = self
            .catalog
            .snapshot()
            .inspect_err(|err| warn!(%err, "catalog unavailable"))?;

        let affected: HashSet<&str> = request.affected_ids.iter().map(String::as_str).collect();
        let demand: Vec<DemandPoint> = snapshot
            .demand
            .iter()
            .filter(|point| affected.contains(point.id.as_str()))
            .cloned()
            .collect();

        let allowed: HashSet<&str> = request.site_types.iter().map(String::as_str).collect();
        let sites: Vec<CandidateSite> = snapshot
            .sites
            .iter()
            .filter(|site| allowed.contains(site.category.as_str()))
            .cloned()
            .collect();

        let selection = self
            .results
            .get_or_solve(&demand, &sites, request.radius_miles, request.k)?;

        info!(
            demand = demand.len(),
            sites = sites.len(),
            selected = selection.selected.len(),
            coverage_percent = selection.coverage_percent,
            "optimization complete"
        );
        Ok(OptimizationResult::from_selection(&selection, &sites))
    }

    /// Drop the catalog snapshot and every cached selection.
    pub fn clear_cache(&self) {
        let dropped = self.catalog.invalidate();
        self.results.clear();
        info!(catalog = ?dropped, "cleared optimizer caches");
    }
}
