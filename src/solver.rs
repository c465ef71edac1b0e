//! Greedy maximum-coverage solver.
//!
//! Picks up to `k` sites, each round taking the site that adds the most not
//! yet covered population within the service radius. This is the classical
//! `1 - 1/e` approximation, not an exact solver.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::error::SolveError;
use crate::grid::DemandGrid;
use crate::haversine::within_radius;
use crate::traits::{Demand, Site};

/// How coverage sets are built. Both strategies produce identical sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverageIndex {
    /// Bucket demand points into lat/lon cells sized to the radius.
    #[default]
    Grid,
    /// Test every (site, demand) pair.
    BruteForce,
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Strategy for building per-site coverage sets.
    pub index: CoverageIndex,
    /// Spread coverage construction and gain evaluation across the rayon pool.
    pub parallel: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            index: CoverageIndex::Grid,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedSite<SiteId> {
    pub site_id: SiteId,
    /// Position of the site in the input slice.
    pub index: usize,
    /// Population newly covered when this site was picked.
    pub marginal_gain: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult<SiteId, DemandId> {
    /// Sites in selection (priority) order.
    pub selected: Vec<SelectedSite<SiteId>>,
    /// Covered demand ids, in demand input order.
    pub covered: Vec<DemandId>,
    pub total_population: f64,
    pub covered_population: f64,
    /// `covered / total * 100`, or 0 when the total is 0.
    pub coverage_percent: f64,
}

impl<SiteId, DemandId> SelectionResult<SiteId, DemandId> {
    pub fn selected_ids(&self) -> impl Iterator<Item = &SiteId> {
        self.selected.iter().map(|site| &site.site_id)
    }
}

/// Reject malformed input before any coverage is computed.
pub fn validate<D, S>(demand: &[D], sites: &[S], radius_miles: f64) -> Result<(), SolveError>
where
    D: Demand,
    S: Site,
{
    if !radius_miles.is_finite() || radius_miles < 0.0 {
        return Err(SolveError::InvalidRadius(radius_miles));
    }

    let mut seen = HashSet::with_capacity(demand.len());
    let mut total_population = 0.0;
    for point in demand {
        let id = || format!("{:?}", point.id());
        let (lat, lon) = point.location();
        if let Some(field) = non_finite_coordinate(lat, lon) {
            return Err(SolveError::NonFiniteDemand { id: id(), field });
        }
        let population = point.population();
        if !population.is_finite() {
            return Err(SolveError::NonFiniteDemand {
                id: id(),
                field: "population",
            });
        }
        if population < 0.0 {
            return Err(SolveError::NegativePopulation { id: id(), population });
        }
        if !seen.insert(point.id()) {
            return Err(SolveError::DuplicateDemandId(id()));
        }
        total_population += population;
    }
    if !total_population.is_finite() {
        return Err(SolveError::PopulationOverflow);
    }

    let mut seen = HashSet::with_capacity(sites.len());
    for site in sites {
        let (lat, lon) = site.location();
        if let Some(field) = non_finite_coordinate(lat, lon) {
            return Err(SolveError::NonFiniteSite {
                id: format!("{:?}", site.id()),
                field,
            });
        }
        if !seen.insert(site.id()) {
            return Err(SolveError::DuplicateSiteId(format!("{:?}", site.id())));
        }
    }

    Ok(())
}

fn non_finite_coordinate(lat: f64, lon: f64) -> Option<&'static str> {
    if !lat.is_finite() {
        Some("latitude")
    } else if !lon.is_finite() {
        Some("longitude")
    } else {
        None
    }
}

/// Select up to `k` sites maximizing population covered within `radius_miles`.
///
/// Ties on marginal gain go to the site appearing first in `sites`. Selection
/// stops early once no remaining site adds positive population.
#[tracing::instrument(skip_all, fields(demand = demand.len(), sites = sites.len(), radius_miles = radius_miles, k = k))]
pub fn solve<D, S>(
    demand: &[D],
    sites: &[S],
    radius_miles: f64,
    k: usize,
    options: &SolveOptions,
) -> Result<SelectionResult<S::Id, D::Id>, SolveError>
where
    D: Demand,
    S: Site,
{
    validate(demand, sites, radius_miles)?;
    Ok(solve_validated(demand, sites, radius_miles, k, options))
}

/// [`solve`] without the validation pass. Callers must have run [`validate`].
pub(crate) fn solve_validated<D, S>(
    demand: &[D],
    sites: &[S],
    radius_miles: f64,
    k: usize,
    options: &SolveOptions,
) -> SelectionResult<S::Id, D::Id>
where
    D: Demand,
    S: Site,
{
    let populations: Vec<f64> = demand.iter().map(Demand::population).collect();
    let total_population: f64 = populations.iter().sum();

    if demand.is_empty() || sites.is_empty() || k == 0 {
        debug!(total_population, "nothing to select");
        return SelectionResult {
            selected: Vec::new(),
            covered: Vec::new(),
            total_population,
            covered_population: 0.0,
            coverage_percent: 0.0,
        };
    }

    let demand_locations: Vec<(f64, f64)> = demand.iter().map(Demand::location).collect();
    let site_locations: Vec<(f64, f64)> = sites.iter().map(Site::location).collect();
    let mut coverage = coverage_sets(&demand_locations, &site_locations, radius_miles, options);

    let mut covered = vec![false; demand.len()];
    let mut selected = Vec::with_capacity(k.min(sites.len()));

    for round in 0..k {
        let gains: Vec<f64> = if options.parallel {
            coverage
                .par_iter()
                .map(|set| marginal_gain(set, &covered, &populations))
                .collect()
        } else {
            coverage
                .iter()
                .map(|set| marginal_gain(set, &covered, &populations))
                .collect()
        };

        let Some((best, gain)) = best_candidate(&gains) else {
            debug!(round, "no remaining site adds coverage");
            break;
        };

        for &index in &coverage[best] {
            covered[index] = true;
        }
        coverage[best].clear();

        trace!(round, site = ?sites[best].id(), gain, "selected site");
        selected.push(SelectedSite {
            site_id: sites[best].id().clone(),
            index: best,
            marginal_gain: gain,
        });
    }

    let covered_population: f64 = covered
        .iter()
        .zip(&populations)
        .filter(|(is_covered, _)| **is_covered)
        .map(|(_, population)| population)
        .sum();
    let covered_ids = demand
        .iter()
        .zip(&covered)
        .filter(|(_, is_covered)| **is_covered)
        .map(|(point, _)| point.id().clone())
        .collect();

    let coverage_percent = if total_population > 0.0 {
        covered_population / total_population * 100.0
    } else {
        0.0
    };

    info!(
        selected = selected.len(),
        covered_population, total_population, coverage_percent, "coverage solve finished"
    );

    SelectionResult {
        selected,
        covered: covered_ids,
        total_population,
        covered_population,
        coverage_percent,
    }
}

/// Per-site demand indices within `radius_miles`, ascending.
pub fn coverage_sets(
    demand: &[(f64, f64)],
    sites: &[(f64, f64)],
    radius_miles: f64,
    options: &SolveOptions,
) -> Vec<Vec<usize>> {
    let sets: Vec<Vec<usize>> = match options.index {
        CoverageIndex::Grid => {
            let grid = DemandGrid::build(demand.to_vec(), radius_miles);
            if options.parallel {
                sites.par_iter().map(|&site| grid.within(site)).collect()
            } else {
                sites.iter().map(|&site| grid.within(site)).collect()
            }
        }
        CoverageIndex::BruteForce => {
            let scan = |site: (f64, f64)| -> Vec<usize> {
                demand
                    .iter()
                    .enumerate()
                    .filter(|(_, point)| within_radius(site, **point, radius_miles))
                    .map(|(index, _)| index)
                    .collect()
            };
            if options.parallel {
                sites.par_iter().map(|&site| scan(site)).collect()
            } else {
                sites.iter().map(|&site| scan(site)).collect()
            }
        }
    };

    debug!(
        sites = sites.len(),
        demand = demand.len(),
        pairs = sets.iter().map(Vec::len).sum::<usize>(),
        "built coverage sets"
    );
    sets
}

/// Population of `set` not yet covered.
fn marginal_gain(set: &[usize], covered: &[bool], populations: &[f64]) -> f64 {
    set.iter()
        .filter(|&&index| !covered[index])
        .map(|&index| populations[index])
        .sum()
}

/// First index holding the strictly largest positive gain.
fn best_candidate(gains: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<usize> = None;
    let mut best_gain = 0.0;
    for (index, &gain) in gains.iter().enumerate() {
        if gain > best_gain {
            best_gain = gain;
            best = Some(index);
        }
    }
    best.map(|index| (index, best_gain))
}
