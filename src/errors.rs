use thiserror::Error;

use crate::convention::Convention;

/// Failures while constructing an overlap structure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Resource exhaustion while building {structure} with {requested} intervals")]
    ResourceExhausted {
        structure: &'static str,
        requested: usize,
    },

    #[error("Invalid interval: start ({start}) must be < stop ({stop})")]
    InvalidInterval { start: u32, stop: u32 },
}

/// Failures translating a query into a structure's native convention.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("No safe {target} translation for a structure that is natively {native} without a flag")]
    NoInverse {
        target: Convention,
        native: Convention,
    },

    #[error("Query stop {stop} cannot be widened by one unit")]
    BoundOverflow { stop: u32 },
}

/// Failures raised by the startup probe of an adapter.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Unknown implementation: {0}")]
    Unknown(String),

    #[error("{name}: probe build failed: {source}")]
    ProbeBuild {
        name: &'static str,
        #[source]
        source: BuildError,
    },

    #[error("{name}: probe query [{start}, {stop}] returned {found} hits, expected {expected}")]
    ProbeQuery {
        name: &'static str,
        start: u32,
        stop: u32,
        found: usize,
        expected: usize,
    },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Failures of the differential comparator.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("{name}: build failed: {source}")]
    Build {
        name: &'static str,
        #[source]
        source: BuildError,
    },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(
        "Mismatch for query [{start}, {stop}] ({convention}): only in {reference}: {only_reference:?}; only in {candidate}: {only_candidate:?}"
    )]
    Mismatch {
        start: u32,
        stop: u32,
        convention: Convention,
        reference: &'static str,
        candidate: &'static str,
        only_reference: Vec<String>,
        only_candidate: Vec<String>,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Problems with harness configuration that cannot be clamped away.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("max_coord must be >= 2 and < u32::MAX, got {0}")]
    CoordinateUniverse(u32),

    #[error("avg_len must be > 0")]
    ZeroAverageLength,

    #[error("At least one interval-set size is required")]
    NoSizes,

    #[error("At least one query width is required")]
    NoWidths,

    #[error("n_queries must be > 0")]
    NoQueries,

    #[error("At least one seed is required")]
    NoSeeds,

    #[error("At least one convention is required")]
    NoConventions,

    #[error("Can't parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
