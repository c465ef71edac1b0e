//! coverage-planner
//!
//! Greedy maximum-coverage siting: choose up to `k` facilities so that the
//! most population lies within a service radius of a chosen site.

pub mod traits;
pub mod model;
pub mod error;
pub mod haversine;
pub mod grid;
pub mod solver;
pub mod fingerprint;
pub mod cache;
pub mod catalog;
pub mod optimizer;
pub mod synthetic;
