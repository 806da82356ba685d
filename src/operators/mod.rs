//! Neighborhood operators: the route mutations driven by the annealing
//! controller.
//!
//! Each operator picks one machine uniformly at random, mutates its
//! staged route in place, and reports whether anything changed. An
//! operator that finds no qualifying mutation leaves the route
//! untouched and the controller treats the iteration as an ordinary
//! non-improving step — infeasibility is never a fault.

mod bypass;
mod least_frequent;
mod reconstruct;
mod reroute;

use rand::Rng;

use crate::fleet::Machine;
use crate::topology::Topology;

/// Identifies one of the four neighborhood operators.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// Replace the shared vertex of two consecutive segments with a
    /// depth-bounded detour.
    Bypass,
    /// Rebuild the route from a random stage onward by priority-greedy
    /// reconstruction.
    Reconstruct,
    /// Re-route a machine toward the road least frequented by the rest
    /// of the fleet.
    LeastFrequent,
    /// Remove one segment and splice in an A* repair path.
    Reroute,
}

/// Per-iteration operator tuning chosen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorParams {
    /// Maximum detour depth for [`OperatorKind::Bypass`].
    pub search_depth: usize,
    /// Recent-location window for [`OperatorKind::Reconstruct`].
    pub lookback: usize,
}

/// Whether an operator mutated the solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorOutcome {
    Applied,
    Unchanged,
}

/// Applies `kind` to one randomly chosen machine of `machines`.
pub fn apply_operator<R: Rng>(
    kind: OperatorKind,
    machines: &mut [Machine],
    topology: &Topology,
    tmax: f64,
    params: OperatorParams,
    priority_aware: bool,
    rng: &mut R,
) -> OperatorOutcome {
    if machines.is_empty() {
        return OperatorOutcome::Unchanged;
    }
    match kind {
        OperatorKind::Bypass => bypass::apply(machines, topology, tmax, params.search_depth, rng),
        OperatorKind::Reconstruct => {
            reconstruct::apply(machines, topology, tmax, params.lookback, rng)
        }
        OperatorKind::LeastFrequent => {
            least_frequent::apply(machines, topology, tmax, priority_aware, rng)
        }
        OperatorKind::Reroute => reroute::apply(machines, topology, tmax, rng),
    }
}
