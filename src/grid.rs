//! Lat/lon grid bucketing of demand points.
//!
//! Queries return exactly the points a full haversine scan would return. The
//! grid only narrows which points get the exact distance test; whenever a
//! conservative cell window cannot be derived the query falls back to scanning
//! every point.

use std::collections::HashMap;

use crate::haversine::{EARTH_RADIUS_MILES, MILES_PER_DEGREE, within_radius};

/// Smallest cell edge in degrees. Keeps tiny radii from exploding the map.
const MIN_CELL_DEGREES: f64 = 0.01;

/// Relative widening applied to every window bound.
const WINDOW_SLACK: f64 = 1e-9;

type Cell = (i64, i64);

/// Demand locations bucketed by grid cell for a fixed service radius.
#[derive(Debug, Clone)]
pub struct DemandGrid {
    radius_miles: f64,
    step_degrees: f64,
    locations: Vec<(f64, f64)>,
    cells: HashMap<Cell, Vec<usize>>,
    /// False when some location is outside valid lat/lon ranges.
    bounded: bool,
}

impl DemandGrid {
    pub fn build(locations: Vec<(f64, f64)>, radius_miles: f64) -> Self {
        let step_degrees = (radius_miles / MILES_PER_DEGREE).max(MIN_CELL_DEGREES);
        let bounded = locations.iter().all(|&(lat, lon)| in_range(lat, lon));

        let mut cells: HashMap<Cell, Vec<usize>> = HashMap::new();
        if bounded {
            for (index, &(lat, lon)) in locations.iter().enumerate() {
                cells
                    .entry(cell_of(lat, lon, step_degrees))
                    .or_default()
                    .push(index);
            }
        }

        Self {
            radius_miles,
            step_degrees,
            locations,
            cells,
            bounded,
        }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn radius_miles(&self) -> f64 {
        self.radius_miles
    }

    /// Indices (ascending) of locations within the radius of `origin`.
    pub fn within(&self, origin: (f64, f64)) -> Vec<usize> {
        if !self.bounded {
            return self.scan(origin);
        }
        let Some(window) = self.window(origin) else {
            return self.scan(origin);
        };

        let (lat_lo, lat_hi, lon_lo, lon_hi) = window;
        let (row_lo, col_lo) = cell_of(lat_lo, lon_lo, self.step_degrees);
        let (row_hi, col_hi) = cell_of(lat_hi, lon_hi, self.step_degrees);

        let cell_count = (row_hi - row_lo + 1).saturating_mul(col_hi - col_lo + 1);
        if cell_count >= self.cells.len() as i64 {
            return self.scan(origin);
        }

        let mut hits = Vec::new();
        for row in row_lo..=row_hi {
            for col in col_lo..=col_hi {
                let Some(bucket) = self.cells.get(&(row, col)) else {
                    continue;
                };
                hits.extend(
                    bucket
                        .iter()
                        .copied()
                        .filter(|&i| within_radius(origin, self.locations[i], self.radius_miles)),
                );
            }
        }
        hits.sort_unstable();
        hits
    }

    /// Full scan; the reference behavior the grid must reproduce.
    pub fn scan(&self, origin: (f64, f64)) -> Vec<usize> {
        self.locations
            .iter()
            .enumerate()
            .filter(|(_, location)| within_radius(origin, **location, self.radius_miles))
            .map(|(index, _)| index)
            .collect()
    }

    /// Bounding window `(lat_lo, lat_hi, lon_lo, lon_hi)` guaranteed to
    /// contain every point within the radius, or `None` near the poles, across
    /// the antimeridian, or for radii too large to bound.
    fn window(&self, origin: (f64, f64)) -> Option<(f64, f64, f64, f64)> {
        let (lat, lon) = origin;
        if !in_range(lat, lon) {
            return None;
        }

        // Great-circle distance is never shorter than the meridian arc.
        let dlat = widen(self.radius_miles / MILES_PER_DEGREE);
        let lat_lo = lat - dlat;
        let lat_hi = lat + dlat;
        if lat_lo <= -90.0 || lat_hi >= 90.0 {
            return None;
        }

        // hav(d) = hav(dlat) + cos(lat1) cos(lat2) hav(dlon), so
        // hav(dlon) <= hav(radius) / (cos(lat1) * min cos(lat2)).
        let theta = self.radius_miles / EARTH_RADIUS_MILES;
        let hav_radius = (theta / 2.0).sin().powi(2);
        let far_lat = lat_lo.abs().max(lat_hi.abs());
        let cos_product = lat.to_radians().cos() * far_lat.to_radians().cos();
        if cos_product <= 0.0 {
            return None;
        }
        let s = (hav_radius / cos_product).sqrt();
        if !(s < 1.0) {
            return None;
        }
        let dlon = widen((2.0 * s.asin()).to_degrees());
        let lon_lo = lon - dlon;
        let lon_hi = lon + dlon;
        if lon_lo < -180.0 || lon_hi > 180.0 {
            return None;
        }

        Some((lat_lo, lat_hi, lon_lo, lon_hi))
    }
}

fn in_range(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

fn widen(degrees: f64) -> f64 {
    degrees * (1.0 + WINDOW_SLACK) + WINDOW_SLACK
}

fn cell_of(lat: f64, lon: f64, step: f64) -> Cell {
    ((lat / step).floor() as i64, (lon / step).floor() as i64)
}
