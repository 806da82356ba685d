//! Controller configuration.

use crate::operators::OperatorKind;

/// How the controller picks a neighborhood operator each iteration.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorSelection {
    /// Temperature-banded adaptive policy over all four operators:
    /// disruptive moves with widened search while hot, broad
    /// randomization in the middle band, conservative refinement with
    /// narrowed parameters near the floor.
    Adaptive,
    /// Always the given operator.
    Single(OperatorKind),
    /// Uniform choice among the given operators.
    Subset(Vec<OperatorKind>),
}

/// Configuration for the annealing controller.
///
/// # Examples
///
/// ```
/// use snowroute::annealing::{AnnealingConfig, OperatorSelection};
/// use snowroute::operators::OperatorKind;
///
/// let config = AnnealingConfig::default()
///     .with_initial_temperature(50.0)
///     .with_cooling_rate(0.97)
///     .with_operators(OperatorSelection::Single(OperatorKind::Reroute))
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingConfig {
    /// Initial temperature. Higher values allow more exploration.
    pub initial_temperature: f64,

    /// Geometric cooling factor in (0, 1), applied every iteration.
    pub cooling_rate: f64,

    /// Maximum number of iterations.
    pub max_iterations: usize,

    /// Temperature floor; the run terminates once the temperature drops
    /// below it.
    pub min_temperature: f64,

    /// Operator selection policy.
    pub operators: OperatorSelection,

    /// Priority-aware initial routes and least-frequent scoring.
    pub priority_aware: bool,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            cooling_rate: 0.99,
            max_iterations: 1000,
            min_temperature: 1e-3,
            operators: OperatorSelection::Adaptive,
            priority_aware: false,
            seed: None,
        }
    }
}

impl AnnealingConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_operators(mut self, operators: OperatorSelection) -> Self {
        self.operators = operators;
        self
    }

    pub fn with_priority_aware(mut self, aware: bool) -> Self {
        self.priority_aware = aware;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_temperature <= 0.0 {
            return Err("initial_temperature must be positive".into());
        }
        if self.cooling_rate <= 0.0 || self.cooling_rate >= 1.0 {
            return Err(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            ));
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be positive".into());
        }
        if self.min_temperature <= 0.0 {
            return Err("min_temperature must be positive".into());
        }
        if let OperatorSelection::Subset(kinds) = &self.operators {
            if kinds.is_empty() {
                return Err("operator subset must not be empty".into());
            }
        }
        Ok(())
    }
}
