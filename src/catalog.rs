//! Demand and candidate tables.
//!
//! A [`Catalog`] owns the full tables that requests filter down from. Rows are
//! validated once when they enter the crate; [`CachedCatalog`] then holds a
//! fingerprinted snapshot until it is explicitly invalidated.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::CatalogError;
use crate::fingerprint::{Fingerprint, fingerprint_tables};
use crate::model::{CandidateSite, DemandPoint};

/// Source of the full demand and candidate tables.
pub trait Catalog {
    fn demand_points(&self) -> Result<Vec<DemandPoint>, CatalogError>;
    fn candidate_sites(&self) -> Result<Vec<CandidateSite>, CatalogError>;
}

/// In-memory tables.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub demand: Vec<DemandPoint>,
    pub sites: Vec<CandidateSite>,
}

impl StaticCatalog {
    pub fn new(demand: Vec<DemandPoint>, sites: Vec<CandidateSite>) -> Self {
        Self { demand, sites }
    }
}

impl Catalog for StaticCatalog {
    fn demand_points(&self) -> Result<Vec<DemandPoint>, CatalogError> {
        Ok(self.demand.clone())
    }

    fn candidate_sites(&self) -> Result<Vec<CandidateSite>, CatalogError> {
        Ok(self.sites.clone())
    }
}

#[derive(Debug, Clone)]
pub struct HttpCatalogConfig {
    pub base_url: String,
    pub demand_path: String,
    pub sites_path: String,
    pub timeout_secs: u64,
}

impl Default for HttpCatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            demand_path: "/api/block-groups".to_string(),
            sites_path: "/api/candidates".to_string(),
            timeout_secs: 10,
        }
    }
}

impl HttpCatalogConfig {
    /// Defaults overridden by `COVERAGE_CATALOG_URL` and
    /// `COVERAGE_CATALOG_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup("COVERAGE_CATALOG_URL") {
            config.base_url = url;
        }
        if let Some(secs) = lookup("COVERAGE_CATALOG_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.timeout_secs = secs;
        }
        config
    }
}

/// JSON-over-HTTP tables, e.g. the block-group and candidate endpoints of a
/// data service.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    config: HttpCatalogConfig,
    client: reqwest::blocking::Client,
}

impl HttpCatalog {
    pub fn new(config: HttpCatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpCatalogConfig {
        &self.config
    }

    fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, CatalogError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        debug!(%url, "fetching catalog table");

        let rows = self
            .client
            .get(&url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<Vec<T>>())
            .map_err(|err| {
                warn!(%url, %err, "catalog fetch failed");
                if err.is_connect() || err.is_timeout() {
                    CatalogError::Unavailable(format!("{url}: {err}"))
                } else {
                    CatalogError::Http(err)
                }
            })?;
        Ok(rows)
    }
}

impl Catalog for HttpCatalog {
    fn demand_points(&self) -> Result<Vec<DemandPoint>, CatalogError> {
        let points = self
            .fetch::<DemandRow>(&self.config.demand_path)?
            .into_iter()
            .map(DemandPoint::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        reject_duplicate_ids("demand", points.iter().map(|point| point.id.as_str()))?;
        Ok(points)
    }

    fn candidate_sites(&self) -> Result<Vec<CandidateSite>, CatalogError> {
        let sites = self
            .fetch::<SiteRow>(&self.config.sites_path)?
            .into_iter()
            .map(CandidateSite::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        reject_duplicate_ids("sites", sites.iter().map(|site| site.id.as_str()))?;
        Ok(sites)
    }
}

fn reject_duplicate_ids<'a>(
    table: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::InvalidRow {
                table,
                id: id.to_string(),
                reason: "duplicate id".to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct DemandRow {
    geoid: String,
    lat: f64,
    lon: f64,
    population: f64,
}

impl TryFrom<DemandRow> for DemandPoint {
    type Error = CatalogError;

    fn try_from(row: DemandRow) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| CatalogError::InvalidRow {
            table: "demand",
            id: row.geoid.clone(),
            reason: reason.to_string(),
        };
        if !row.lat.is_finite() || !row.lon.is_finite() {
            return Err(invalid("non-finite coordinates"));
        }
        if !row.population.is_finite() || row.population < 0.0 {
            return Err(invalid("population must be finite and non-negative"));
        }
        Ok(DemandPoint::new(row.geoid, row.lat, row.lon, row.population))
    }
}

#[derive(Debug, Deserialize)]
struct SiteRow {
    site_id: String,
    name: String,
    #[serde(rename = "type")]
    category: String,
    lat: f64,
    lon: f64,
}

impl TryFrom<SiteRow> for CandidateSite {
    type Error = CatalogError;

    fn try_from(row: SiteRow) -> Result<Self, Self::Error> {
        if !row.lat.is_finite() || !row.lon.is_finite() {
            return Err(CatalogError::InvalidRow {
                table: "sites",
                id: row.site_id,
                reason: "non-finite coordinates".to_string(),
            });
        }
        Ok(CandidateSite::new(row.site_id, row.name, row.category, row.lat, row.lon))
    }
}

/// Tables loaded at one point in time, with their content fingerprint.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub demand: Vec<DemandPoint>,
    pub sites: Vec<CandidateSite>,
    pub fingerprint: Fingerprint,
}

/// Lazily loaded, explicitly invalidated snapshot of a [`Catalog`].
pub struct CachedCatalog<C> {
    source: C,
    snapshot: RwLock<Option<Arc<CatalogSnapshot>>>,
    load: Mutex<()>,
}

impl<C: Catalog> CachedCatalog<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            snapshot: RwLock::new(None),
            load: Mutex::new(()),
        }
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    /// Current snapshot, loading from the source if none is held.
    pub fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        if let Some(snapshot) = self.snapshot.read().clone() {
            return Ok(snapshot);
        }

        let _loading = self.load.lock();
        if let Some(snapshot) = self.snapshot.read().clone() {
            return Ok(snapshot);
        }

        let demand = self.source.demand_points()?;
        let sites = self.source.candidate_sites()?;
        let fingerprint = fingerprint_tables(&demand, &sites);
        info!(
            demand = demand.len(),
            sites = sites.len(),
            %fingerprint,
            "loaded catalog snapshot"
        );

        let snapshot = Arc::new(CatalogSnapshot {
            demand,
            sites,
            fingerprint,
        });
        *self.snapshot.write() = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Fingerprint of the held snapshot, without loading.
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.snapshot.read().as_ref().map(|snapshot| snapshot.fingerprint)
    }

    /// Drop the held snapshot; the next [`Self::snapshot`] reloads. Returns the
    /// fingerprint of what was dropped.
    pub fn invalidate(&self) -> Option<Fingerprint> {
        let dropped = self.snapshot.write().take();
        dropped.map(|snapshot| snapshot.fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCatalog {
        loads: AtomicUsize,
        population: f64,
    }

    impl Catalog for CountingCatalog {
        fn demand_points(&self) -> Result<Vec<DemandPoint>, CatalogError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(vec![DemandPoint::new("d1", 38.6, -90.2, self.population)])
        }

        fn candidate_sites(&self) -> Result<Vec<CandidateSite>, CatalogError> {
            Ok(vec![CandidateSite::new("c1", "Library", "library", 38.6, -90.2)])
        }
    }

    struct DownCatalog;

    impl Catalog for DownCatalog {
        fn demand_points(&self) -> Result<Vec<DemandPoint>, CatalogError> {
            Err(CatalogError::Unavailable("http://127.0.0.1:9: connection refused".to_string()))
        }

        fn candidate_sites(&self) -> Result<Vec<CandidateSite>, CatalogError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_snapshot_loaded_once() {
        let cached = CachedCatalog::new(CountingCatalog {
            loads: AtomicUsize::new(0),
            population: 10.0,
        });
        let first = cached.snapshot().unwrap();
        let second = cached.snapshot().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cached.source().loads.load(Ordering::SeqCst), 1);
        assert_eq!(cached.fingerprint(), Some(first.fingerprint));
    }

    #[test]
    fn test_invalidate_reloads() {
        let cached = CachedCatalog::new(CountingCatalog {
            loads: AtomicUsize::new(0),
            population: 10.0,
        });
        let first = cached.snapshot().unwrap();

        assert_eq!(cached.invalidate(), Some(first.fingerprint));
        assert_eq!(cached.fingerprint(), None);
        assert_eq!(cached.invalidate(), None);

        let second = cached.snapshot().unwrap();
        assert_eq!(cached.source().loads.load(Ordering::SeqCst), 2);
        assert_eq!(first.fingerprint, second.fingerprint);
    }

    #[test]
    fn test_load_failure_is_not_cached() {
        let cached = CachedCatalog::new(DownCatalog);
        assert!(matches!(cached.snapshot(), Err(CatalogError::Unavailable(_))));
        assert_eq!(cached.fingerprint(), None);
    }

    #[test]
    fn test_demand_row_validation() {
        let row = DemandRow {
            geoid: "295101012001".to_string(),
            lat: f64::NAN,
            lon: -90.2,
            population: 10.0,
        };
        assert!(matches!(
            DemandPoint::try_from(row),
            Err(CatalogError::InvalidRow { table: "demand", .. })
        ));

        let row = DemandRow {
            geoid: "295101012001".to_string(),
            lat: 38.6,
            lon: -90.2,
            population: -3.0,
        };
        assert!(DemandPoint::try_from(row).is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = reject_duplicate_ids("sites", ["c1", "c2", "c1"].into_iter()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidRow { table: "sites", ref id, .. } if id == "c1"
        ));
        assert!(reject_duplicate_ids("demand", ["d1", "d2"].into_iter()).is_ok());
    }

    #[test]
    fn test_config_from_lookup() {
        let config = HttpCatalogConfig::from_lookup(|key| match key {
            "COVERAGE_CATALOG_URL" => Some("http://data.internal:9000".to_string()),
            "COVERAGE_CATALOG_TIMEOUT_SECS" => Some("30".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://data.internal:9000");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.demand_path, "/api/block-groups");

        let config = HttpCatalogConfig::from_lookup(|key| match key {
            "COVERAGE_CATALOG_TIMEOUT_SECS" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config.timeout_secs, 10);
    }
}
