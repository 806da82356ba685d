//! Multi-period snow clearing route optimization.
//!
//! Plans clearing routes for a fleet of machines over a road network
//! subject to staged snowfall, minimizing a cumulative hazard score:
//!
//! - **[`topology`]**: the road network — coordinate-deduplicated
//!   locations and directed segments with an undirected danger
//!   contract.
//! - **[`fleet`]**: machines with staged routes and greedy
//!   initial-route construction.
//! - **[`hazard`]**: the stage-wise snow accrual simulator; the
//!   objective function.
//! - **[`routing`]**: time-budget repair utilities and the graph
//!   searches shared by the operators.
//! - **[`operators`]**: four route-mutation neighborhoods.
//! - **[`annealing`]**: the adaptive simulated-annealing controller.
//!
//! # Architecture
//!
//! The controller holds the authoritative fleet state. Each iteration
//! one adaptively-selected operator mutates one machine's route in
//! place; the hazard simulator re-scores the fleet against the
//! forecast, a Metropolis test keeps or rolls back the mutation, and
//! the temperature cools geometrically. Acquiring the road graph from a
//! map source, rendering, and charting are external collaborators that
//! interact only through [`Topology`] and the controller's entry point.
//!
//! # Example
//!
//! ```
//! use snowroute::{AnnealingConfig, AnnealingRunner, ClearingProblem, Machine, Topology};
//!
//! let records = [
//!     ((0.0, 0.0), (1.0, 0.0), 50, 2),
//!     ((1.0, 0.0), (1.0, 1.0), 30, 1),
//!     ((1.0, 1.0), (0.0, 0.0), 80, 2),
//! ];
//! let topology = Topology::from_records(records, (0.0, 0.0), false);
//! let problem = ClearingProblem::new(topology, vec![Machine::new(30.0)], vec![5, 3], 0.5)?;
//! let config = AnnealingConfig::default().with_max_iterations(50).with_seed(7);
//!
//! let result = AnnealingRunner::run(&problem, &config)?;
//! assert_eq!(result.trace.sampled_danger.len(), result.trace.temperature.len());
//! # Ok::<(), snowroute::SolverError>(())
//! ```

pub mod annealing;
pub mod error;
pub mod fleet;
pub mod hazard;
pub mod operators;
pub mod routing;
pub mod topology;

pub use annealing::{
    AnnealingConfig, AnnealingResult, AnnealingRunner, ClearingProblem, DiagnosticsTrace,
    OperatorSelection,
};
pub use error::SolverError;
pub use fleet::{Machine, Route, Stage};
pub use hazard::simulate_danger;
pub use operators::{OperatorKind, OperatorOutcome, OperatorParams};
pub use topology::{
    EndpointPair, Location, LocationId, RoadRecord, RoadSegment, SegmentId, Topology,
};
