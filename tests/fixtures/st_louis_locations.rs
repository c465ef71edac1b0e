//! St. Louis block groups and candidate sites.
//!
//! Coordinates are approximate neighborhood centroids and landmark locations.
//! Populations are in the range of real census block groups.

#![allow(dead_code)]

use coverage_planner::model::{CandidateSite, DemandPoint};

/// (geoid, lat, lon, population)
pub const BLOCK_GROUPS: &[(&str, f64, f64, f64)] = &[
    // Downtown / Downtown West
    ("295101241001", 38.6300, -90.1930, 1450.0),
    ("295101241002", 38.6325, -90.2040, 980.0),
    // Central West End
    ("295101192001", 38.6420, -90.2560, 1720.0),
    ("295101192002", 38.6380, -90.2490, 1310.0),
    // Tower Grove South
    ("295101164001", 38.5950, -90.2480, 1580.0),
    ("295101164002", 38.5910, -90.2560, 1220.0),
    // Soulard
    ("295101172001", 38.6060, -90.2080, 890.0),
    // The Hill
    ("295101104001", 38.6150, -90.2770, 1050.0),
    // Dutchtown
    ("295101139001", 38.5710, -90.2410, 1890.0),
    ("295101139002", 38.5660, -90.2350, 1640.0),
    // North City (O'Fallon Park)
    ("295101066001", 38.6720, -90.2030, 760.0),
    ("295101066002", 38.6780, -90.2110, 640.0),
    // Baden
    ("295101011001", 38.7110, -90.2320, 930.0),
    // Vacant lot tract
    ("295101267001", 38.6240, -90.1880, 0.0),
];

/// (site_id, name, type, lat, lon)
pub const SITES: &[(&str, &str, &str, f64, f64)] = &[
    ("lib_central", "St. Louis Central Library", "library", 38.6304, -90.1965),
    ("lib_cwe", "Schlafly Branch Library", "library", 38.6427, -90.2542),
    ("sch_roosevelt", "Roosevelt High School", "school", 38.5963, -90.2410),
    ("sch_cleveland", "Cleveland NJROTC Academy", "school", 38.5700, -90.2380),
    ("pow_cathedral", "Cathedral Basilica", "place_of_worship", 38.6425, -90.2550),
    ("pow_stjohn", "St. John Nepomuk", "place_of_worship", 38.6065, -90.2075),
    ("cc_wohl", "Wohl Recreation Center", "community_centre", 38.6730, -90.2300),
    ("fs_engine9", "Engine House No. 9", "fire_station", 38.7100, -90.2300),
    ("hosp_slu", "SLU Hospital", "hospital", 38.6240, -90.2370),
];

pub fn block_groups() -> Vec<DemandPoint> {
    BLOCK_GROUPS
        .iter()
        .map(|&(geoid, lat, lon, population)| DemandPoint::new(geoid, lat, lon, population))
        .collect()
}

pub fn sites() -> Vec<CandidateSite> {
    SITES
        .iter()
        .map(|&(id, name, category, lat, lon)| CandidateSite::new(id, name, category, lat, lon))
        .collect()
}

pub fn total_population() -> f64 {
    BLOCK_GROUPS.iter().map(|bg| bg.3).sum()
}
