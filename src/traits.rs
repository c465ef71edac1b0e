//! Core domain traits for the coverage planner.
//!
//! The solver only needs positions, populations and identifiers. Apps can
//! implement these for their own row types instead of converting into
//! [`crate::model`] structs.

use std::fmt::Debug;
use std::hash::Hash;

/// Unique identifier for planner entities.
pub trait Id: Clone + Eq + Hash + Debug {}

impl<T> Id for T where T: Clone + Eq + Hash + Debug {}

/// A population-weighted location that needs to be served.
pub trait Demand {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Location coordinates (lat, lon) in decimal degrees.
    fn location(&self) -> (f64, f64);

    /// Population weight. Must be finite and non-negative.
    fn population(&self) -> f64;
}

/// A location eligible to host a facility.
pub trait Site {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Location coordinates (lat, lon) in decimal degrees.
    fn location(&self) -> (f64, f64);
}
