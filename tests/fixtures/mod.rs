//! Test fixtures for coverage-planner.
//!
//! Provides St. Louis demand points and candidate sites with realistic
//! coordinates and block-group scale populations.

pub mod st_louis_locations;

pub use st_louis_locations::*;
