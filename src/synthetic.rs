//! Synthetic candidate sites for planning exercises.
//!
//! Sites are either jittered around known anchor locations or drawn uniformly
//! from a bounding box. A seeded `ChaCha8Rng` makes every run reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::GeneratorError;
use crate::model::CandidateSite;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// St. Louis metro.
    pub const ST_LOUIS: Self = Self {
        min_lat: 38.40,
        max_lat: 38.90,
        min_lon: -90.74,
        max_lon: -90.12,
    };

    fn is_valid(&self) -> bool {
        [self.min_lat, self.max_lat, self.min_lon, self.max_lon]
            .iter()
            .all(|v| v.is_finite())
            && self.min_lat <= self.max_lat
            && self.min_lon <= self.max_lon
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub id: String,
    pub category: String,
    pub lat: f64,
    pub lon: f64,
}

impl Anchor {
    pub fn new(id: &str, category: &str, lat: f64, lon: f64) -> Self {
        Self {
            id: id.to_string(),
            category: category.to_string(),
            lat,
            lon,
        }
    }

    /// Six anchors spread across St. Louis neighborhoods.
    pub fn st_louis() -> Vec<Self> {
        vec![
            Self::new("church_1", "place_of_worship", 38.6359, -90.2211), // Central West End
            Self::new("church_2", "place_of_worship", 38.6277, -90.1994), // Downtown
            Self::new("school_1", "school", 38.6460, -90.2547),           // Delmar Loop
            Self::new("school_2", "school", 38.6089, -90.2368),           // Tower Grove
            Self::new("community_1", "community_centre", 38.6701, -90.2846), // Clayton edge
            Self::new("community_2", "community_centre", 38.5964, -90.2253), // South City
        ]
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Number of generated sites, not counting anchors.
    pub n: usize,
    /// Max jitter in degrees (~0.01 deg is ~0.69 miles).
    pub jitter_deg: f64,
    pub bbox: BoundingBox,
    /// Share of sites drawn uniformly from `bbox`.
    pub uniform_ratio: f64,
    /// Append the anchors themselves after generated sites.
    pub include_anchors: bool,
    pub seed: u64,
    pub anchors: Vec<Anchor>,
    /// Category given to uniformly drawn sites.
    pub uniform_category: String,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            n: 500,
            jitter_deg: 0.035,
            bbox: BoundingBox::ST_LOUIS,
            uniform_ratio: 0.30,
            include_anchors: true,
            seed: 42,
            anchors: Anchor::st_louis(),
            uniform_category: "community_centre".to_string(),
        }
    }
}

pub fn generate_candidates(config: &SyntheticConfig) -> Result<Vec<CandidateSite>, GeneratorError> {
    if !config.bbox.is_valid() {
        return Err(GeneratorError::InvalidBoundingBox);
    }
    if !config.jitter_deg.is_finite() || config.jitter_deg < 0.0 {
        return Err(GeneratorError::InvalidJitter(config.jitter_deg));
    }
    if !(0.0..=1.0).contains(&config.uniform_ratio) {
        return Err(GeneratorError::InvalidUniformRatio(config.uniform_ratio));
    }
    if config.anchors.is_empty() && config.uniform_ratio < 1.0 && config.n > 0 {
        return Err(GeneratorError::NoAnchors);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let bbox = config.bbox;
    let jitter = config.jitter_deg;
    let mut sites = Vec::with_capacity(config.n + config.anchors.len());

    for i in 1..=config.n {
        let site = if rng.gen_range(0.0..1.0) < config.uniform_ratio {
            let lat = rng.gen_range(bbox.min_lat..=bbox.max_lat);
            let lon = rng.gen_range(bbox.min_lon..=bbox.max_lon);
            let id = format!("site_rand_{i}");
            CandidateSite::new(id.clone(), id, config.uniform_category.clone(), lat, lon)
        } else {
            let anchor = &config.anchors[rng.gen_range(0..config.anchors.len())];
            let lat = anchor.lat + rng.gen_range(-jitter..=jitter);
            let lon = anchor.lon + rng.gen_range(-jitter..=jitter);
            let id = format!("site_jitter_{i}");
            CandidateSite::new(id.clone(), id, anchor.category.clone(), lat, lon)
        };
        sites.push(site);
    }

    if config.include_anchors {
        sites.extend(config.anchors.iter().map(|anchor| {
            CandidateSite::new(
                anchor.id.clone(),
                anchor.id.clone(),
                anchor.category.clone(),
                anchor.lat,
                anchor.lon,
            )
        }));
    }

    Ok(sites)
}
