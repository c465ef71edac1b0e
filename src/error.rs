//! Error types for coverage-planner.

use thiserror::Error;

/// Input rejected before any coverage is computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("service radius must be finite and non-negative, got {0}")]
    InvalidRadius(f64),

    #[error("demand point {id} has non-finite {field}")]
    NonFiniteDemand { id: String, field: &'static str },

    #[error("demand point {id} has negative population {population}")]
    NegativePopulation { id: String, population: f64 },

    #[error("total demand population overflows")]
    PopulationOverflow,

    #[error("candidate site {id} has non-finite {field}")]
    NonFiniteSite { id: String, field: &'static str },

    #[error("duplicate demand point id {0}")]
    DuplicateDemandId(String),

    #[error("duplicate candidate site id {0}")]
    DuplicateSiteId(String),
}

/// Failure to load demand or candidate tables.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid {table} row {id}: {reason}")]
    InvalidRow {
        table: &'static str,
        id: String,
        reason: String,
    },

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by [`crate::optimizer::Optimizer`].
#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("invalid optimization input: {0}")]
    Invalid(#[from] SolveError),
}

/// Rejected synthetic candidate configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("bounding box is empty or non-finite")]
    InvalidBoundingBox,

    #[error("jitter must be finite and non-negative, got {0}")]
    InvalidJitter(f64),

    #[error("uniform ratio must be within [0, 1], got {0}")]
    InvalidUniformRatio(f64),

    #[error("jittered candidates requested but no anchor sites configured")]
    NoAnchors,
}
