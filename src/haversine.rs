//! Great-circle distance between geographic points.
//!
//! Coverage is decided purely on straight-line distance, so this is the only
//! distance model the solver needs.

/// Earth mean radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.7613;

/// Length of one degree of arc along a great circle, in miles.
pub const MILES_PER_DEGREE: f64 = EARTH_RADIUS_MILES * std::f64::consts::PI / 180.0;

/// Haversine distance between two `(lat, lon)` points in miles.
///
/// Coordinates are not range-checked; out-of-range degrees are still fed
/// through the formula.
pub fn haversine_miles(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = from;
    let (lat2, lon2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just outside [0, 1] for out-of-range or antipodal input.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_MILES * c
}

/// True when `to` lies within `radius_miles` of `from` (inclusive).
pub fn within_radius(from: (f64, f64), to: (f64, f64), radius_miles: f64) -> bool {
    haversine_miles(from, to) <= radius_miles
}
