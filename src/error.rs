//! Solver error taxonomy.

use thiserror::Error;

/// Fatal precondition violations, rejected before iteration starts.
///
/// Recoverable conditions are deliberately absent: an operator that
/// finds no qualifying mutation, or an A* search with an unreachable
/// target, leaves the route unchanged and the run proceeds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("fleet is empty")]
    EmptyFleet,

    #[error("snowfall forecast has no stages")]
    EmptyForecast,

    #[error("per-stage time budget must be positive and finite, got {0}")]
    InvalidTimeBudget(f64),

    #[error("topology has no base location")]
    MissingBase,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
