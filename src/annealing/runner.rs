//! Annealing execution loop.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::{AnnealingConfig, OperatorSelection};
use crate::error::SolverError;
use crate::fleet::Machine;
use crate::hazard::simulate_danger;
use crate::operators::{apply_operator, OperatorKind, OperatorParams};
use crate::topology::Topology;

/// A clearing problem instance: the road network, the fleet, the
/// snowfall forecast (one entry per stage), and the per-stage time
/// budget.
#[derive(Debug, Clone)]
pub struct ClearingProblem {
    pub topology: Topology,
    pub machines: Vec<Machine>,
    pub forecast: Vec<u32>,
    /// Maximum time per stage per machine.
    pub tmax: f64,
}

impl ClearingProblem {
    /// Checks the fatal preconditions up front: a non-empty fleet, at
    /// least one forecast stage, a positive time budget, and a
    /// designated base location.
    pub fn new(
        topology: Topology,
        machines: Vec<Machine>,
        forecast: Vec<u32>,
        tmax: f64,
    ) -> Result<Self, SolverError> {
        let problem = Self {
            topology,
            machines,
            forecast,
            tmax,
        };
        problem.validate()?;
        Ok(problem)
    }

    pub(crate) fn validate(&self) -> Result<(), SolverError> {
        if self.machines.is_empty() {
            return Err(SolverError::EmptyFleet);
        }
        if self.forecast.is_empty() {
            return Err(SolverError::EmptyForecast);
        }
        if !self.tmax.is_finite() || self.tmax <= 0.0 {
            return Err(SolverError::InvalidTimeBudget(self.tmax));
        }
        if self.topology.base().is_none() {
            return Err(SolverError::MissingBase);
        }
        Ok(())
    }
}

/// Diagnostics recorded every iteration: three equal-length sequences,
/// ready for any charting collaborator.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticsTrace {
    /// Danger of the candidate generated each iteration.
    pub sampled_danger: Vec<f64>,
    /// Danger of the currently accepted solution each iteration.
    pub accepted_danger: Vec<f64>,
    /// Temperature after cooling each iteration.
    pub temperature: Vec<f64>,
}

impl DiagnosticsTrace {
    fn push(&mut self, sampled: f64, accepted: f64, temperature: f64) {
        self.sampled_danger.push(sampled);
        self.accepted_danger.push(accepted);
        self.temperature.push(temperature);
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.sampled_danger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sampled_danger.is_empty()
    }
}

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealingResult {
    /// The best fleet state found.
    pub best_machines: Vec<Machine>,
    /// Danger of the best fleet state.
    pub best_danger: f64,
    /// Iterations actually executed.
    pub iterations: usize,
    /// Temperature when the run stopped.
    pub final_temperature: f64,
    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,
    /// Number of improving moves.
    pub improving_moves: usize,
    /// Per-iteration diagnostics.
    pub trace: DiagnosticsTrace,
}

/// Executes the annealing controller.
pub struct AnnealingRunner;

impl AnnealingRunner {
    /// Runs a single optimization to completion.
    ///
    /// Builds initial routes for the whole fleet, then iterates:
    /// snapshot, mutate via one operator, re-simulate, Metropolis
    /// accept or restore the snapshot, cool down, record diagnostics.
    /// Stops at the iteration budget, below the temperature floor, or
    /// on a zero-danger solution.
    pub fn run(
        problem: &ClearingProblem,
        config: &AnnealingConfig,
    ) -> Result<AnnealingResult, SolverError> {
        config.validate().map_err(SolverError::InvalidConfig)?;
        problem.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let topology = &problem.topology;
        let num_stages = problem.forecast.len();
        let mut machines = problem.machines.clone();
        for machine in &mut machines {
            machine.generate_initial_route(
                topology,
                problem.tmax,
                num_stages,
                config.priority_aware,
                &mut rng,
            );
        }

        let mut current_danger = simulate_danger(topology, &machines, &problem.forecast);
        let mut best = machines.clone();
        let mut best_danger = current_danger;
        let mut temperature = config.initial_temperature;

        let mut trace = DiagnosticsTrace::default();
        trace.push(best_danger, best_danger, temperature);

        let base_params = base_operator_params(topology);
        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;
        let mut iterations = 0usize;

        for iteration in 0..config.max_iterations {
            iterations = iteration + 1;
            let (kind, params) =
                select_operator(&config.operators, temperature, base_params, &mut rng);

            let snapshot = machines.clone();
            let outcome = apply_operator(
                kind,
                &mut machines,
                topology,
                problem.tmax,
                params,
                config.priority_aware,
                &mut rng,
            );
            let new_danger = simulate_danger(topology, &machines, &problem.forecast);
            let delta = new_danger - current_danger;

            let accept =
                delta < 0.0 || rng.random_range(0.0..1.0) < (-delta / temperature).exp();
            if accept {
                if delta < 0.0 {
                    improving_moves += 1;
                }
                accepted_moves += 1;
                current_danger = new_danger;
                if new_danger < best_danger {
                    best = machines.clone();
                    best_danger = new_danger;
                }
            } else {
                machines = snapshot;
            }

            debug!(
                "iteration {iteration}: {kind:?} ({outcome:?}) candidate {new_danger:.3}, \
                 current {current_danger:.3}, best {best_danger:.3}, temperature {temperature:.6}"
            );

            temperature *= config.cooling_rate;
            trace.push(new_danger, current_danger, temperature);

            if temperature < config.min_temperature {
                debug!("terminating: temperature below {:e}", config.min_temperature);
                break;
            }
            if best_danger == 0.0 {
                debug!("terminating: danger reached zero");
                break;
            }
        }

        Ok(AnnealingResult {
            best_machines: best,
            best_danger,
            iterations,
            final_temperature: temperature,
            accepted_moves,
            improving_moves,
            trace,
        })
    }
}

/// Base `search_depth`/`lookback`, widened on complex networks.
fn base_operator_params(topology: &Topology) -> OperatorParams {
    if topology.segment_count() > 200 {
        OperatorParams {
            search_depth: 12,
            lookback: 8,
        }
    } else {
        OperatorParams {
            search_depth: 6,
            lookback: 4,
        }
    }
}

const DISRUPTIVE: [OperatorKind; 3] = [
    OperatorKind::Bypass,
    OperatorKind::LeastFrequent,
    OperatorKind::Reroute,
];
const CONSERVATIVE: [OperatorKind; 2] = [OperatorKind::Bypass, OperatorKind::Reconstruct];
const ALL_OPERATORS: [OperatorKind; 4] = [
    OperatorKind::Bypass,
    OperatorKind::Reconstruct,
    OperatorKind::LeastFrequent,
    OperatorKind::Reroute,
];

fn select_operator<R: Rng>(
    selection: &OperatorSelection,
    temperature: f64,
    base: OperatorParams,
    rng: &mut R,
) -> (OperatorKind, OperatorParams) {
    match selection {
        OperatorSelection::Single(kind) => (*kind, base),
        OperatorSelection::Subset(kinds) => (kinds[rng.random_range(0..kinds.len())], base),
        OperatorSelection::Adaptive => adaptive_policy(temperature, base, rng),
    }
}

/// The temperature-banded policy, kept as literal threshold bands:
/// above 1 favor disruptive operators with widened search, between 0.01
/// and 1 randomize parameters and choice broadly, below 0.01 favor
/// conservative refinement with narrowed search.
fn adaptive_policy<R: Rng>(
    temperature: f64,
    base: OperatorParams,
    rng: &mut R,
) -> (OperatorKind, OperatorParams) {
    let depth = base.search_depth as f64;
    let lookback = base.lookback as f64;

    let widened = OperatorParams {
        search_depth: (depth * 1.5) as usize,
        lookback: base.lookback,
    };
    let narrowed = OperatorParams {
        search_depth: (depth * 0.5) as usize,
        lookback: (lookback * 1.5) as usize,
    };

    if temperature > 1.0 {
        if rng.random_range(0..100) < 65 {
            (DISRUPTIVE[rng.random_range(0..DISRUPTIVE.len())], widened)
        } else {
            (
                CONSERVATIVE[rng.random_range(0..CONSERVATIVE.len())],
                narrowed,
            )
        }
    } else if temperature > 0.01 {
        let params = OperatorParams {
            search_depth: rng
                .random_range((depth * 0.5) as usize..=(depth * 2.0) as usize),
            lookback: rng.random_range((lookback * 0.5) as usize..=(lookback * 2.0) as usize),
        };
        (ALL_OPERATORS[rng.random_range(0..ALL_OPERATORS.len())], params)
    } else if rng.random_range(0..100) < 65 {
        (
            CONSERVATIVE[rng.random_range(0..CONSERVATIVE.len())],
            narrowed,
        )
    } else {
        (DISRUPTIVE[rng.random_range(0..DISRUPTIVE.len())], widened)
    }
}
